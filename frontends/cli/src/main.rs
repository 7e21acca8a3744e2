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

    main.rs

    Command line frontend: build the machine, then step until it stops.

*/

mod config;

use anyhow::Result;
use femto86_core::machine::{Machine, RunExit};

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (set RUST_LOG=trace for instruction flow)

    let launch = config::resolve()?;

    log::info!("Building machine with BIOS image {}", launch.bios.display());
    let mut machine = Machine::new(&launch.bios)?;
    machine.reset();

    match machine.run(launch.max_steps)? {
        RunExit::Halted => {
            println!(
                "Halted after {} instructions.",
                machine.cpu().instruction_count()
            );
        }
        RunExit::StepLimit => {
            println!(
                "Step limit reached after {} instructions.",
                machine.cpu().instruction_count()
            );
            println!("{}", machine.cpu().dump_string());
        }
    }

    Ok(())
}
