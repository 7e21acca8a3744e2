/*
    Femto86
    https://github.com/femto86/femto86

    Copyright 2024-2025 Femto86 Contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    ---------------------------------------------------------------------------

    config.rs

    Command line and TOML configuration. CLI arguments take precedence
    over the config file.

*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use serde::Deserialize;

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version)]
pub struct CmdLineArgs {
    /// Path to a TOML machine configuration file
    #[bpaf(long, argument("FILE"))]
    pub config: Option<PathBuf>,

    /// Path to the BIOS ROM image
    #[bpaf(long, argument("FILE"))]
    pub bios: Option<PathBuf>,

    /// Stop after this many instructions
    #[bpaf(long, argument("N"))]
    pub max_steps: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub machine: MachineSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct MachineSection {
    pub bios: Option<PathBuf>,
    pub max_steps: Option<u64>,
}

/// The merged launch configuration.
#[derive(Debug)]
pub struct LaunchConfig {
    pub bios: PathBuf,
    pub max_steps: Option<u64>,
}

pub fn resolve() -> Result<LaunchConfig> {
    let args = cmd_line_args().run();

    let file = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Couldn't read config file {}", path.display()))?;
            toml::from_str::<ConfigFile>(&text)
                .with_context(|| format!("Couldn't parse config file {}", path.display()))?
        }
        None => ConfigFile::default(),
    };

    let bios = args
        .bios
        .or(file.machine.bios)
        .context("No BIOS image specified; pass --bios or set machine.bios in the config file")?;

    Ok(LaunchConfig {
        bios,
        max_steps: args.max_steps.or(file.machine.max_steps),
    })
}
