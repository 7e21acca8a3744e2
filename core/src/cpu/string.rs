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

    cpu::string.rs

    Implements string operations.

*/

use crate::cpu::{alu::AluOp, Cpu, Flag, RepPrefix, Segment};

impl Cpu {
    /// Execute a string opcode, honoring any REP/REPE/REPNE prefix. A
    /// repeated operation runs to completion within the instruction; with
    /// no interrupt delivery there is nothing to suspend for.
    pub(crate) fn string_instruction(&mut self, opcode: u8) {
        match self.rep_prefix {
            None => self.string_op(opcode),
            Some(prefix) => {
                // CX counts iterations; zero means no operation at all.
                while self.regs.c.x() != 0 {
                    self.string_op(opcode);
                    self.regs.c.set_x(self.regs.c.x().wrapping_sub(1));

                    // Only the comparing forms consult ZF between iterations.
                    if matches!(opcode, 0xA6 | 0xA7 | 0xAE | 0xAF) {
                        let zero = self.regs.get_flag(Flag::Zero);
                        match prefix {
                            RepPrefix::Rep if !zero => break,
                            RepPrefix::Repne if zero => break,
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    /// One iteration of a string primitive. The source segment (DS:SI)
    /// honors a segment override; the destination (ES:DI) never does.
    fn string_op(&mut self, opcode: u8) {
        let src_segment = self.segment_base(Segment::DS);

        match opcode {
            0xA4 => {
                // MOVSB - copy byte [seg:si] to [es:di]
                // No flags affected
                let data = self.mem_read_u8(src_segment, self.regs.si);
                self.mem_write_u8(Segment::ES, self.regs.di, data);
                self.advance_si(1);
                self.advance_di(1);
            }
            0xA5 => {
                // MOVSW
                let data = self.mem_read_u16(src_segment, self.regs.si);
                self.mem_write_u16(Segment::ES, self.regs.di, data);
                self.advance_si(2);
                self.advance_di(2);
            }
            0xA6 => {
                // CMPSB - compare byte [seg:si] with [es:di]
                let src = self.mem_read_u8(src_segment, self.regs.si);
                let dst = self.mem_read_u8(Segment::ES, self.regs.di);
                self.math_op8(AluOp::Cmp, src, dst);
                self.advance_si(1);
                self.advance_di(1);
            }
            0xA7 => {
                // CMPSW
                let src = self.mem_read_u16(src_segment, self.regs.si);
                let dst = self.mem_read_u16(Segment::ES, self.regs.di);
                self.math_op16(AluOp::Cmp, src, dst);
                self.advance_si(2);
                self.advance_di(2);
            }
            0xAA => {
                // STOSB - store AL to [es:di]
                // No flags affected
                self.mem_write_u8(Segment::ES, self.regs.di, self.regs.a.l());
                self.advance_di(1);
            }
            0xAB => {
                // STOSW
                self.mem_write_u16(Segment::ES, self.regs.di, self.regs.a.x());
                self.advance_di(2);
            }
            0xAC => {
                // LODSB - load AL from [seg:si]
                // No flags affected
                let data = self.mem_read_u8(src_segment, self.regs.si);
                self.regs.a.set_l(data);
                self.advance_si(1);
            }
            0xAD => {
                // LODSW
                let data = self.mem_read_u16(src_segment, self.regs.si);
                self.regs.a.set_x(data);
                self.advance_si(2);
            }
            0xAE => {
                // SCASB - compare AL with [es:di]
                let dst = self.mem_read_u8(Segment::ES, self.regs.di);
                let al = self.regs.a.l();
                self.math_op8(AluOp::Cmp, al, dst);
                self.advance_di(1);
            }
            0xAF => {
                // SCASW
                let dst = self.mem_read_u16(Segment::ES, self.regs.di);
                let ax = self.regs.a.x();
                self.math_op16(AluOp::Cmp, ax, dst);
                self.advance_di(2);
            }
            _ => unreachable!("not a string opcode: {:02X}", opcode),
        }
    }

    /// Step SI by the operand width in the direction selected by DF.
    fn advance_si(&mut self, width: u16) {
        match self.regs.get_flag(Flag::Direction) {
            false => self.regs.si = self.regs.si.wrapping_add(width),
            true => self.regs.si = self.regs.si.wrapping_sub(width),
        }
    }

    fn advance_di(&mut self, width: u16) {
        match self.regs.get_flag(Flag::Direction) {
            false => self.regs.di = self.regs.di.wrapping_add(width),
            true => self.regs.di = self.regs.di.wrapping_sub(width),
        }
    }
}
