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

    cpu::mod.rs

    Implements the 8086 CPU: the fetch/decode/execute pipeline driving the
    system bus.

*/

mod alu;
mod bcd;
mod bitwise;
mod display;
mod execute;
mod jump;
mod modrm;
mod muldiv;
mod registers;
mod stack;
mod string;

pub use modrm::{ModRm, RegEncoding, RegOperand, RmOperand};
pub use registers::{
    Flag,
    GeneralRegister,
    Register16,
    Register8,
    Registers,
    Segment,
    CPU_FLAG_AUX_CARRY,
    CPU_FLAG_CARRY,
    CPU_FLAG_DIRECTION,
    CPU_FLAG_INT_ENABLE,
    CPU_FLAG_OVERFLOW,
    CPU_FLAG_PARITY,
    CPU_FLAG_SIGN,
    CPU_FLAG_TRAP,
    CPU_FLAG_ZERO,
    FLAGS_POP_MASK,
    FLAGS_SAHF_MASK,
    PARITY_TABLE,
    REGISTER16_LUT,
    REGISTER8_LUT,
    SEGMENT_REGISTER_LUT,
};

use core::fmt::Display;
use std::error::Error;

use crate::bus::Bus;

/// Convert a segment:offset pair to a 20-bit physical address. The 8086
/// wraps above the top of the address space; there is no A20 gate.
#[inline(always)]
pub fn calc_linear_address(segment: u16, offset: u16) -> u32 {
    (((segment as u32) << 4) + offset as u32) & 0xFFFFF
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CpuAddress {
    Flat(u32),
    Segmented(u16, u16),
}

#[derive(Debug)]
pub enum CpuError {
    /// An encoding with no defined 8086 semantics was fetched.
    InvalidOpcode(u8, CpuAddress),
    /// A defined instruction that requires interrupt delivery, which this
    /// core does not implement.
    UnsupportedOpcode(u8, CpuAddress),
    /// Division by zero or quotient overflow. Raises interrupt 0 on real
    /// hardware; terminal here until interrupt delivery exists.
    DivideError(CpuAddress),
}

impl Error for CpuError {}
impl Display for CpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            CpuError::InvalidOpcode(opcode, address) => {
                write!(f, "Invalid opcode {:02X} @ {}", opcode, address)
            }
            CpuError::UnsupportedOpcode(opcode, address) => {
                write!(f, "Opcode {:02X} @ {} requires interrupt delivery", opcode, address)
            }
            CpuError::DivideError(address) => {
                write!(f, "Divide error @ {}", address)
            }
        }
    }
}

/// The externally observable execution states.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CpuState {
    #[default]
    Reset,
    Running,
    /// HLT executed. Terminal until an interrupt source exists to resume.
    Halted,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepResult {
    Normal,
    Halted,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RepPrefix {
    Rep,
    Repne,
}

pub struct Cpu {
    regs: Registers,
    bus: Bus,
    state: CpuState,

    segment_override: Option<Segment>,
    rep_prefix: Option<RepPrefix>,

    instruction_address: CpuAddress,
    instruction_count: u64,
}

impl Cpu {
    pub fn new(bus: Bus) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            bus,
            state: CpuState::Reset,
            segment_override: None,
            rep_prefix: None,
            instruction_address: CpuAddress::Segmented(0xFFFF, 0x0000),
            instruction_count: 0,
        };
        cpu.reset();
        cpu
    }

    /// Reset to the power-on state: execution resumes at FFFF:0000, so the
    /// first fetch reads physical FFFF0. The hardware leaves FLAGS and the
    /// general registers undefined; we zero them to stay deterministic.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.regs.cs = 0xFFFF;
        self.regs.ip = 0x0000;

        self.state = CpuState::Reset;
        self.segment_override = None;
        self.rep_prefix = None;
        self.instruction_count = 0;
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn get_register8(&self, reg: Register8) -> u8 {
        self.regs.get_register8(reg)
    }

    pub fn set_register8(&mut self, reg: Register8, value: u8) {
        self.regs.set_register8(reg, value);
    }

    pub fn get_register16(&self, reg: Register16) -> u16 {
        self.regs.get_register16(reg)
    }

    pub fn set_register16(&mut self, reg: Register16, value: u16) {
        self.regs.set_register16(reg, value);
    }

    pub fn get_flag(&self, flag: Flag) -> bool {
        self.regs.get_flag(flag)
    }

    pub fn set_flag_state(&mut self, flag: Flag, state: bool) {
        self.regs.set_flag_state(flag, state);
    }

    pub fn get_flags(&self) -> u16 {
        self.regs.flags
    }

    pub fn set_flags(&mut self, flags: u16) {
        self.regs.flags = flags;
    }

    /// Physical address of the next instruction byte.
    pub fn flat_ip(&self) -> u32 {
        calc_linear_address(self.regs.cs, self.regs.ip)
    }

    /// Execute exactly one instruction. A repeated string instruction
    /// retires fully within a single step.
    pub fn step(&mut self) -> Result<StepResult, CpuError> {
        if self.state == CpuState::Halted {
            return Ok(StepResult::Halted);
        }
        self.state = CpuState::Running;
        self.instruction_address = CpuAddress::Segmented(self.regs.cs, self.regs.ip);

        // Consume any prefix bytes ahead of the opcode proper.
        let opcode = loop {
            let byte = self.fetch_u8();
            match byte {
                0x26 => self.segment_override = Some(Segment::ES),
                0x2E => self.segment_override = Some(Segment::CS),
                0x36 => self.segment_override = Some(Segment::SS),
                0x3E => self.segment_override = Some(Segment::DS),
                // LOCK (and its F1 alias): bus arbitration is meaningless
                // with a single bus master.
                0xF0 | 0xF1 => {}
                0xF2 => self.rep_prefix = Some(RepPrefix::Repne),
                0xF3 => self.rep_prefix = Some(RepPrefix::Rep),
                _ => break byte,
            }
        };

        log::trace!("{} opcode {:02X}", self.instruction_address, opcode);

        if self.rep_prefix.is_some() && !matches!(opcode, 0xA4..=0xA7 | 0xAA..=0xAF) {
            // Hardware ignores a repeat prefix on a non-string instruction
            log::warn!(
                "REP prefix on non-string opcode {:02X} at {}",
                opcode,
                self.instruction_address
            );
        }

        let result = self.execute(opcode);

        // Prefixes hold for exactly one instruction.
        self.segment_override = None;
        self.rep_prefix = None;
        self.instruction_count += 1;

        if let Ok(StepResult::Halted) = result {
            self.state = CpuState::Halted;
        }
        result
    }

    /// Fetch the byte at CS:IP and advance IP with 16-bit wrap.
    pub(crate) fn fetch_u8(&mut self) -> u8 {
        let byte = self.bus.read_u8(calc_linear_address(self.regs.cs, self.regs.ip));
        self.regs.ip = self.regs.ip.wrapping_add(1);
        byte
    }

    /// Fetch a little-endian word at CS:IP; the low byte comes first.
    pub(crate) fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch_u8();
        let hi = self.fetch_u8();
        (lo as u16) | ((hi as u16) << 8)
    }

    /// Resolve the segment for a data access: the instruction's override
    /// prefix if present, the addressing mode's default otherwise.
    pub(crate) fn segment_base(&self, default: Segment) -> Segment {
        self.segment_override.unwrap_or(default)
    }

    pub(crate) fn mem_read_u8(&self, segment: Segment, offset: u16) -> u8 {
        self.bus
            .read_u8(calc_linear_address(self.regs.segment_value(segment), offset))
    }

    pub(crate) fn mem_write_u8(&mut self, segment: Segment, offset: u16, byte: u8) {
        self.bus
            .write_u8(calc_linear_address(self.regs.segment_value(segment), offset), byte);
    }

    /// Word accesses wrap within the segment; each byte recomputes the
    /// physical address from the 16-bit offset.
    pub(crate) fn mem_read_u16(&self, segment: Segment, offset: u16) -> u16 {
        let lo = self.mem_read_u8(segment, offset);
        let hi = self.mem_read_u8(segment, offset.wrapping_add(1));
        (lo as u16) | ((hi as u16) << 8)
    }

    pub(crate) fn mem_write_u16(&mut self, segment: Segment, offset: u16, word: u16) {
        self.mem_write_u8(segment, offset, (word & 0xFF) as u8);
        self.mem_write_u8(segment, offset.wrapping_add(1), (word >> 8) as u8);
    }

    pub(crate) fn invalid_opcode(&self, opcode: u8) -> CpuError {
        CpuError::InvalidOpcode(opcode, self.instruction_address)
    }

    pub(crate) fn divide_error(&self) -> CpuError {
        CpuError::DivideError(self.instruction_address)
    }
}
