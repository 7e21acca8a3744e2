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

    cpu::modrm.rs

    Routines to handle loading and parsing of modrm bytes.

*/

use crate::cpu::{
    Cpu,
    Register16,
    Register8,
    Segment,
    REGISTER16_LUT,
    REGISTER8_LUT,
    SEGMENT_REGISTER_LUT,
};

pub const MODRM_MOD_MASK: u8 = 0b11_000_000;
pub const MODRM_REG_MASK: u8 = 0b00_111_000;
pub const MODRM_RM_MASK: u8 = 0b00_000_111;

/// How the 3-bit reg field of a modrm byte is to be interpreted; the opcode
/// decides, the byte itself cannot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RegEncoding {
    Reg8,
    Reg16,
    Segment,
    /// The reg field is a 3-bit sub-opcode, not a register.
    Group,
}

/// The r/m half of a decoded modrm byte. Memory operands carry the computed
/// effective address and the segment the access will go through, with the
/// BP default and any override prefix already applied.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RmOperand {
    Memory { ea: u16, segment: Segment },
    Reg8(Register8),
    Reg16(Register16),
}

/// The reg half of a decoded modrm byte.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RegOperand {
    Reg8(Register8),
    Reg16(Register16),
    Segment(Register16),
    Group(u8),
}

#[derive(Copy, Clone, Debug)]
pub struct ModRm {
    pub rm: RmOperand,
    pub reg: RegOperand,
}

impl ModRm {
    pub fn reg8(&self) -> Register8 {
        match self.reg {
            RegOperand::Reg8(reg) => reg,
            _ => unreachable!("reg field decoded with the wrong encoding"),
        }
    }

    pub fn reg16(&self) -> Register16 {
        match self.reg {
            RegOperand::Reg16(reg) => reg,
            _ => unreachable!("reg field decoded with the wrong encoding"),
        }
    }

    pub fn segment_reg(&self) -> Register16 {
        match self.reg {
            RegOperand::Segment(reg) => reg,
            _ => unreachable!("reg field decoded with the wrong encoding"),
        }
    }

    pub fn group(&self) -> u8 {
        match self.reg {
            RegOperand::Group(index) => index,
            _ => unreachable!("reg field decoded with the wrong encoding"),
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self.rm, RmOperand::Memory { .. })
    }

    /// The 16-bit effective address of a memory operand (LEA, LES, LDS).
    pub fn effective_address(&self) -> Option<u16> {
        match self.rm {
            RmOperand::Memory { ea, .. } => Some(ea),
            _ => None,
        }
    }
}

impl Cpu {
    /// Fetch and decode a modrm byte, consuming any displacement bytes.
    /// `wide` selects the register file used by register-direct (mod=11)
    /// operands.
    ///
    /// All effective address arithmetic wraps modulo 2^16; the 8-bit
    /// displacement of mod=01 is sign-extended before the add.
    pub(crate) fn fetch_modrm(&mut self, encoding: RegEncoding, wide: bool) -> ModRm {
        let byte = self.fetch_u8();

        let b_mod = (byte & MODRM_MOD_MASK) >> 6;
        let b_reg = (byte & MODRM_REG_MASK) >> 3;
        let b_rm = byte & MODRM_RM_MASK;

        let reg = match encoding {
            RegEncoding::Reg8 => RegOperand::Reg8(REGISTER8_LUT[b_reg as usize]),
            RegEncoding::Reg16 => RegOperand::Reg16(REGISTER16_LUT[b_reg as usize]),
            // The high bit of the sr field is ignored by the silicon.
            RegEncoding::Segment => RegOperand::Segment(SEGMENT_REGISTER_LUT[(b_reg & 0x03) as usize]),
            RegEncoding::Group => RegOperand::Group(b_reg),
        };

        if b_mod == 0b11 {
            let rm = if wide {
                RmOperand::Reg16(REGISTER16_LUT[b_rm as usize])
            }
            else {
                RmOperand::Reg8(REGISTER8_LUT[b_rm as usize])
            };
            return ModRm { rm, reg };
        }

        // Base register(s) of the addressing mode, and the default segment.
        // BP-based modes default to SS; everything else to DS. rm=110 at
        // mod=00 is the direct disp16 mode instead of [BP].
        let (base, default_segment) = match b_rm {
            0b000 => (self.regs.b.x().wrapping_add(self.regs.si), Segment::DS),
            0b001 => (self.regs.b.x().wrapping_add(self.regs.di), Segment::DS),
            0b010 => (self.regs.bp.wrapping_add(self.regs.si), Segment::SS),
            0b011 => (self.regs.bp.wrapping_add(self.regs.di), Segment::SS),
            0b100 => (self.regs.si, Segment::DS),
            0b101 => (self.regs.di, Segment::DS),
            0b110 => {
                if b_mod == 0b00 {
                    (self.fetch_u16(), Segment::DS)
                }
                else {
                    (self.regs.bp, Segment::SS)
                }
            }
            _ => (self.regs.b.x(), Segment::DS),
        };

        let disp = match b_mod {
            0b01 => self.fetch_u8() as i8 as u16,
            0b10 => self.fetch_u16(),
            _ => 0,
        };

        ModRm {
            rm: RmOperand::Memory {
                ea: base.wrapping_add(disp),
                segment: self.segment_base(default_segment),
            },
            reg,
        }
    }

    pub(crate) fn read_rm8(&self, rm: RmOperand) -> u8 {
        match rm {
            RmOperand::Memory { ea, segment } => self.mem_read_u8(segment, ea),
            RmOperand::Reg8(reg) => self.regs.get_register8(reg),
            RmOperand::Reg16(_) => unreachable!("word operand in a byte context"),
        }
    }

    pub(crate) fn write_rm8(&mut self, rm: RmOperand, value: u8) {
        match rm {
            RmOperand::Memory { ea, segment } => self.mem_write_u8(segment, ea, value),
            RmOperand::Reg8(reg) => self.regs.set_register8(reg, value),
            RmOperand::Reg16(_) => unreachable!("word operand in a byte context"),
        }
    }

    pub(crate) fn read_rm16(&self, rm: RmOperand) -> u16 {
        match rm {
            RmOperand::Memory { ea, segment } => self.mem_read_u16(segment, ea),
            RmOperand::Reg16(reg) => self.regs.get_register16(reg),
            RmOperand::Reg8(_) => unreachable!("byte operand in a word context"),
        }
    }

    pub(crate) fn write_rm16(&mut self, rm: RmOperand, value: u16) {
        match rm {
            RmOperand::Memory { ea, segment } => self.mem_write_u16(segment, ea, value),
            RmOperand::Reg16(reg) => self.regs.set_register16(reg, value),
            RmOperand::Reg8(_) => unreachable!("byte operand in a word context"),
        }
    }
}
