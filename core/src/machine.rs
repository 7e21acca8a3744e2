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

    machine.rs

    Assembles the machine: default memory map, BIOS ROM loading, and the
    execution loop around the CPU.

*/

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::{
    bus::{Bus, IoDevice, MemoryArea},
    cpu::{Cpu, CpuState, StepResult},
};

/*
    SYSTEM MEMORY MAP
        FFFFF - [TOP OF ADDRESS SPACE]           __
        F6000 - Base System ROM area               | -- BIOS
        F0000 - Reserved                         __|
        C0000 - Expansion ROM area               __| -- ROM
        A0000 - Graphics aperture                __| -- GRAPHICS
        00000 - Conventional RAM                 __| -- RAM
*/
pub const RAM_BASE: u32 = 0x00000;
pub const RAM_END: u32 = 0x9FFFF;
pub const GRAPHICS_BASE: u32 = 0xA0000;
pub const GRAPHICS_END: u32 = 0xBFFFF;
pub const EXPANSION_ROM_BASE: u32 = 0xC0000;
pub const EXPANSION_ROM_END: u32 = 0xEFFFF;
pub const SYSTEM_ROM_BASE: u32 = 0xF6000;
pub const SYSTEM_ROM_END: u32 = 0xFFFFF;

/// The fixed address of the first fetch after reset.
pub const RESET_VECTOR: u32 = 0xFFFF0;

/// Why `run` stopped stepping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RunExit {
    Halted,
    StepLimit,
}

/// A built machine: the CPU bound to a bus carrying the default memory map
/// with a BIOS image in the system ROM window.
pub struct Machine {
    cpu: Cpu,
}

impl Machine {
    /// Build the default memory map and load `bios_path` right-aligned into
    /// the system ROM window, so that the image's reset stub lands at
    /// FFFF:0000. A missing or oversized image is a startup-fatal error.
    pub fn new(bios_path: &Path) -> Result<Machine> {
        let mut bus = Bus::new();

        bus.attach_area(MemoryArea::new(RAM_BASE, RAM_END, true, true));
        bus.attach_area(MemoryArea::new(GRAPHICS_BASE, GRAPHICS_END, true, true));
        bus.attach_area(MemoryArea::new(EXPANSION_ROM_BASE, EXPANSION_ROM_END, true, false));
        bus.attach_area(MemoryArea::new(SYSTEM_ROM_BASE, SYSTEM_ROM_END, true, false));

        let rom_window = (SYSTEM_ROM_END - SYSTEM_ROM_BASE + 1) as usize;
        let image_len = std::fs::metadata(bios_path)
            .with_context(|| format!("Couldn't read BIOS image {}", bios_path.display()))?
            .len() as usize;

        let offset = rom_window
            .checked_sub(image_len)
            .ok_or_else(|| {
                anyhow!(
                    "BIOS image is {} bytes; the system ROM window holds {}",
                    image_len,
                    rom_window
                )
            })?;

        let rom_index = bus.areas().len() - 1;
        bus.area_mut(rom_index)
            .load_image(bios_path, offset)
            .with_context(|| format!("Couldn't load BIOS image {}", bios_path.display()))?;

        log::info!(
            "Loaded {} byte BIOS image at {:05X}",
            image_len,
            SYSTEM_ROM_BASE + offset as u32
        );

        Ok(Machine { cpu: Cpu::new(bus) })
    }

    /// Build a machine around an already-populated bus. Peripheral areas and
    /// port handlers must be attached before the first step.
    pub fn from_bus(bus: Bus) -> Machine {
        Machine { cpu: Cpu::new(bus) }
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Attach a peripheral's port handlers. Duplicate registration of a
    /// port is startup-fatal.
    pub fn attach_io_device(&mut self, device: Box<dyn IoDevice>) -> Result<()> {
        self.cpu
            .bus_mut()
            .attach_io_device(device)
            .map_err(|e| anyhow!("{}", e))
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Step until the CPU halts, a fatal CPU error occurs, or `max_steps`
    /// instructions have retired. On a fatal error the register state is
    /// dumped to stderr before the error propagates.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<RunExit> {
        let mut steps: u64 = 0;
        loop {
            if let Some(limit) = max_steps {
                if steps >= limit {
                    return Ok(RunExit::StepLimit);
                }
            }

            match self.cpu.step() {
                Ok(StepResult::Normal) => {}
                Ok(StepResult::Halted) => {
                    log::info!(
                        "CPU halted after {} instructions",
                        self.cpu.instruction_count()
                    );
                    return Ok(RunExit::Halted);
                }
                Err(e) => {
                    log::error!("{}", e);
                    eprintln!("{}", self.cpu.dump_string());
                    return Err(e).context("Execution terminated");
                }
            }
            steps += 1;
        }
    }

    pub fn state(&self) -> CpuState {
        self.cpu.state()
    }
}
