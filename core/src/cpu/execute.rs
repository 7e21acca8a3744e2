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

    cpu::execute.rs

    Opcode dispatch. One exhaustive match over the opcode byte; each arm
    fetches its remaining bytes, computes, writes back and updates FLAGS.

*/

use crate::cpu::{
    alu::{AluOp, ALU_GROUP_LUT},
    bitwise::BITWISE_GROUP_LUT,
    Cpu,
    CpuError,
    Flag,
    RegEncoding,
    RmOperand,
    Segment,
    StepResult,
    FLAGS_SAHF_MASK,
    REGISTER16_LUT,
    REGISTER8_LUT,
    SEGMENT_REGISTER_LUT,
};

// rustfmt chokes on large match statements.
#[rustfmt::skip]
impl Cpu {
    /// Execute one instruction. Prefix bytes have already been consumed;
    /// `opcode` is the instruction byte proper.
    pub(crate) fn execute(&mut self, opcode: u8) -> Result<StepResult, CpuError> {
        match opcode {
            0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => {
                // ALU r/m8, r8
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let op1 = self.read_rm8(modrm.rm);
                let op2 = self.regs.get_register8(modrm.reg8());
                let result = self.math_op8(op, op1, op2);
                if op != AluOp::Cmp {
                    self.write_rm8(modrm.rm, result);
                }
            }
            0x01 | 0x09 | 0x11 | 0x19 | 0x21 | 0x29 | 0x31 | 0x39 => {
                // ALU r/m16, r16
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let op1 = self.read_rm16(modrm.rm);
                let op2 = self.regs.get_register16(modrm.reg16());
                let result = self.math_op16(op, op1, op2);
                if op != AluOp::Cmp {
                    self.write_rm16(modrm.rm, result);
                }
            }
            0x02 | 0x0A | 0x12 | 0x1A | 0x22 | 0x2A | 0x32 | 0x3A => {
                // ALU r8, r/m8
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let op1 = self.regs.get_register8(modrm.reg8());
                let op2 = self.read_rm8(modrm.rm);
                let result = self.math_op8(op, op1, op2);
                if op != AluOp::Cmp {
                    self.regs.set_register8(modrm.reg8(), result);
                }
            }
            0x03 | 0x0B | 0x13 | 0x1B | 0x23 | 0x2B | 0x33 | 0x3B => {
                // ALU r16, r/m16
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let op1 = self.regs.get_register16(modrm.reg16());
                let op2 = self.read_rm16(modrm.rm);
                let result = self.math_op16(op, op1, op2);
                if op != AluOp::Cmp {
                    self.regs.set_register16(modrm.reg16(), result);
                }
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                // ALU al, imm8
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let op1 = self.regs.a.l();
                let op2 = self.fetch_u8();
                let result = self.math_op8(op, op1, op2);
                if op != AluOp::Cmp {
                    self.regs.a.set_l(result);
                }
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                // ALU ax, imm16
                let op = ALU_GROUP_LUT[((opcode >> 3) & 0x07) as usize];
                let op1 = self.regs.a.x();
                let op2 = self.fetch_u16();
                let result = self.math_op16(op, op1, op2);
                if op != AluOp::Cmp {
                    self.regs.a.set_x(result);
                }
            }
            0x06 | 0x0E | 0x16 | 0x1E => {
                // PUSH sr. Flags: none
                self.push_register16(SEGMENT_REGISTER_LUT[((opcode >> 3) & 0x03) as usize]);
            }
            0x07 | 0x0F | 0x17 | 0x1F => {
                // POP sr. 0F (POP CS) is valid on the 8086. Flags: none
                self.pop_register16(SEGMENT_REGISTER_LUT[((opcode >> 3) & 0x03) as usize]);
            }
            0x27 => {
                // DAA
                self.daa();
            }
            0x2F => {
                // DAS
                self.das();
            }
            0x37 => {
                // AAA
                self.aaa();
            }
            0x3F => {
                // AAS
                self.aas();
            }
            0x40..=0x47 => {
                // INC r16. Does not touch CF
                let reg = REGISTER16_LUT[(opcode & 0x07) as usize];
                let value = self.regs.get_register16(reg);
                let result = self.math_op16(AluOp::Inc, value, 0);
                self.regs.set_register16(reg, result);
            }
            0x48..=0x4F => {
                // DEC r16. Does not touch CF
                let reg = REGISTER16_LUT[(opcode & 0x07) as usize];
                let value = self.regs.get_register16(reg);
                let result = self.math_op16(AluOp::Dec, value, 0);
                self.regs.set_register16(reg, result);
            }
            0x50..=0x57 => {
                // PUSH r16. PUSH SP stores the already-decremented SP
                self.push_register16(REGISTER16_LUT[(opcode & 0x07) as usize]);
            }
            0x58..=0x5F => {
                // POP r16
                self.pop_register16(REGISTER16_LUT[(opcode & 0x07) as usize]);
            }
            0x60..=0x7F => {
                // Jcc rel8. The 8086 decodes 60-6F as aliases of 70-7F
                let disp = self.fetch_u8() as i8;
                let taken = self.condition_met(opcode & 0x0F);
                self.jump_relative8(taken, disp);
            }
            0x80 | 0x82 => {
                // GRP1 r/m8, imm8 (82 is an alias of 80)
                let modrm = self.fetch_modrm(RegEncoding::Group, false);
                let op = ALU_GROUP_LUT[modrm.group() as usize];
                let op1 = self.read_rm8(modrm.rm);
                let imm = self.fetch_u8();
                let result = self.math_op8(op, op1, imm);
                if op != AluOp::Cmp {
                    self.write_rm8(modrm.rm, result);
                }
            }
            0x81 => {
                // GRP1 r/m16, imm16
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let op = ALU_GROUP_LUT[modrm.group() as usize];
                let op1 = self.read_rm16(modrm.rm);
                let imm = self.fetch_u16();
                let result = self.math_op16(op, op1, imm);
                if op != AluOp::Cmp {
                    self.write_rm16(modrm.rm, result);
                }
            }
            0x83 => {
                // GRP1 r/m16, imm8 sign-extended
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let op = ALU_GROUP_LUT[modrm.group() as usize];
                let op1 = self.read_rm16(modrm.rm);
                let imm = self.fetch_u8() as i8 as u16;
                let result = self.math_op16(op, op1, imm);
                if op != AluOp::Cmp {
                    self.write_rm16(modrm.rm, result);
                }
            }
            0x84 => {
                // TEST r/m8, r8
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let op1 = self.read_rm8(modrm.rm);
                let op2 = self.regs.get_register8(modrm.reg8());
                self.math_op8(AluOp::Test, op1, op2);
            }
            0x85 => {
                // TEST r/m16, r16
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let op1 = self.read_rm16(modrm.rm);
                let op2 = self.regs.get_register16(modrm.reg16());
                self.math_op16(AluOp::Test, op1, op2);
            }
            0x86 => {
                // XCHG r8, r/m8. Flags: none
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let reg_value = self.regs.get_register8(modrm.reg8());
                let rm_value = self.read_rm8(modrm.rm);
                self.write_rm8(modrm.rm, reg_value);
                self.regs.set_register8(modrm.reg8(), rm_value);
            }
            0x87 => {
                // XCHG r16, r/m16. Flags: none
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let reg_value = self.regs.get_register16(modrm.reg16());
                let rm_value = self.read_rm16(modrm.rm);
                self.write_rm16(modrm.rm, reg_value);
                self.regs.set_register16(modrm.reg16(), rm_value);
            }
            0x88 => {
                // MOV r/m8, r8
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let value = self.regs.get_register8(modrm.reg8());
                self.write_rm8(modrm.rm, value);
            }
            0x89 => {
                // MOV r/m16, r16
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let value = self.regs.get_register16(modrm.reg16());
                self.write_rm16(modrm.rm, value);
            }
            0x8A => {
                // MOV r8, r/m8
                let modrm = self.fetch_modrm(RegEncoding::Reg8, false);
                let value = self.read_rm8(modrm.rm);
                self.regs.set_register8(modrm.reg8(), value);
            }
            0x8B => {
                // MOV r16, r/m16
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                let value = self.read_rm16(modrm.rm);
                self.regs.set_register16(modrm.reg16(), value);
            }
            0x8C => {
                // MOV r/m16, sr
                let modrm = self.fetch_modrm(RegEncoding::Segment, true);
                let value = self.regs.get_register16(modrm.segment_reg());
                self.write_rm16(modrm.rm, value);
            }
            0x8D => {
                // LEA r16, m. A register operand leaves no EA; the behavior
                // is undefined on hardware and rejected here
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                match modrm.effective_address() {
                    Some(ea) => self.regs.set_register16(modrm.reg16(), ea),
                    None => return Err(self.invalid_opcode(opcode)),
                }
            }
            0x8E => {
                // MOV sr, r/m16. The 8086 happily loads CS this way
                let modrm = self.fetch_modrm(RegEncoding::Segment, true);
                let value = self.read_rm16(modrm.rm);
                self.regs.set_register16(modrm.segment_reg(), value);
            }
            0x8F => {
                // POP r/m16. The reg field is ignored
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let value = self.pop_u16();
                self.write_rm16(modrm.rm, value);
            }
            0x90 => {
                // NOP (XCHG ax, ax)
            }
            0x91..=0x97 => {
                // XCHG ax, r16
                let reg = REGISTER16_LUT[(opcode & 0x07) as usize];
                let ax = self.regs.a.x();
                self.regs.a.set_x(self.regs.get_register16(reg));
                self.regs.set_register16(reg, ax);
            }
            0x98 => {
                // CBW - sign-extend AL into AH
                let extension = if self.regs.a.l() & 0x80 != 0 { 0xFF } else { 0x00 };
                self.regs.a.set_h(extension);
            }
            0x99 => {
                // CWD - sign-extend AX into DX
                let extension = if self.regs.a.x() & 0x8000 != 0 { 0xFFFF } else { 0x0000 };
                self.regs.d.set_x(extension);
            }
            0x9A => {
                // CALL far. Offset precedes segment in the instruction stream
                let new_ip = self.fetch_u16();
                let new_cs = self.fetch_u16();
                self.call_far(new_cs, new_ip);
            }
            0x9B => {
                // WAIT. No TEST pin to sample; acts as a NOP
            }
            0x9C => {
                // PUSHF
                self.push_flags();
            }
            0x9D => {
                // POPF
                self.pop_flags();
            }
            0x9E => {
                // SAHF - store AH into the low flag byte
                let ah = self.regs.a.h();
                self.regs.flags = (self.regs.flags & !FLAGS_SAHF_MASK) | (ah as u16 & FLAGS_SAHF_MASK);
            }
            0x9F => {
                // LAHF - load AH from the low flag byte
                let flags = (self.regs.flags & 0xFF) as u8;
                self.regs.a.set_h(flags);
            }
            0xA0 => {
                // MOV al, [offset16]
                let offset = self.fetch_u16();
                let segment = self.segment_base(Segment::DS);
                let value = self.mem_read_u8(segment, offset);
                self.regs.a.set_l(value);
            }
            0xA1 => {
                // MOV ax, [offset16]
                let offset = self.fetch_u16();
                let segment = self.segment_base(Segment::DS);
                let value = self.mem_read_u16(segment, offset);
                self.regs.a.set_x(value);
            }
            0xA2 => {
                // MOV [offset16], al
                let offset = self.fetch_u16();
                let segment = self.segment_base(Segment::DS);
                self.mem_write_u8(segment, offset, self.regs.a.l());
            }
            0xA3 => {
                // MOV [offset16], ax
                let offset = self.fetch_u16();
                let segment = self.segment_base(Segment::DS);
                self.mem_write_u16(segment, offset, self.regs.a.x());
            }
            0xA4..=0xA7 | 0xAA..=0xAF => {
                // MOVS/CMPS/STOS/LODS/SCAS, with any REP prefix
                self.string_instruction(opcode);
            }
            0xA8 => {
                // TEST al, imm8
                let op1 = self.regs.a.l();
                let imm = self.fetch_u8();
                self.math_op8(AluOp::Test, op1, imm);
            }
            0xA9 => {
                // TEST ax, imm16
                let op1 = self.regs.a.x();
                let imm = self.fetch_u16();
                self.math_op16(AluOp::Test, op1, imm);
            }
            0xB0..=0xB7 => {
                // MOV r8, imm8
                let value = self.fetch_u8();
                self.regs.set_register8(REGISTER8_LUT[(opcode & 0x07) as usize], value);
            }
            0xB8..=0xBF => {
                // MOV r16, imm16
                let value = self.fetch_u16();
                self.regs.set_register16(REGISTER16_LUT[(opcode & 0x07) as usize], value);
            }
            0xC0 | 0xC2 => {
                // RET imm16 (C0 is an 8086 alias of C2)
                let release = self.fetch_u16();
                self.ret_near(release);
            }
            0xC1 | 0xC3 => {
                // RET
                self.ret_near(0);
            }
            0xC4 => {
                // LES r16, m32
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                match modrm.rm {
                    RmOperand::Memory { ea, segment } => {
                        let offset = self.mem_read_u16(segment, ea);
                        let selector = self.mem_read_u16(segment, ea.wrapping_add(2));
                        self.regs.set_register16(modrm.reg16(), offset);
                        self.regs.es = selector;
                    }
                    _ => return Err(self.invalid_opcode(opcode)),
                }
            }
            0xC5 => {
                // LDS r16, m32
                let modrm = self.fetch_modrm(RegEncoding::Reg16, true);
                match modrm.rm {
                    RmOperand::Memory { ea, segment } => {
                        let offset = self.mem_read_u16(segment, ea);
                        let selector = self.mem_read_u16(segment, ea.wrapping_add(2));
                        self.regs.set_register16(modrm.reg16(), offset);
                        self.regs.ds = selector;
                    }
                    _ => return Err(self.invalid_opcode(opcode)),
                }
            }
            0xC6 => {
                // MOV r/m8, imm8. The reg field is ignored
                let modrm = self.fetch_modrm(RegEncoding::Group, false);
                let value = self.fetch_u8();
                self.write_rm8(modrm.rm, value);
            }
            0xC7 => {
                // MOV r/m16, imm16
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let value = self.fetch_u16();
                self.write_rm16(modrm.rm, value);
            }
            0xC8 | 0xCA => {
                // RETF imm16 (C8 is an 8086 alias of CA)
                let release = self.fetch_u16();
                self.ret_far(release);
            }
            0xC9 | 0xCB => {
                // RETF
                self.ret_far(0);
            }
            0xCC..=0xCF => {
                // INT3 / INT imm8 / INTO / IRET need interrupt delivery
                return Err(CpuError::UnsupportedOpcode(opcode, self.instruction_address));
            }
            0xD0 | 0xD2 => {
                // GRP2 r/m8: shift/rotate by 1 (D0) or by CL (D2)
                let modrm = self.fetch_modrm(RegEncoding::Group, false);
                let op = BITWISE_GROUP_LUT[modrm.group() as usize];
                let count = if opcode == 0xD2 { self.regs.c.l() } else { 1 };
                let operand = self.read_rm8(modrm.rm);
                let result = self.bitshift_op8(op, operand, count);
                self.write_rm8(modrm.rm, result);
            }
            0xD1 | 0xD3 => {
                // GRP2 r/m16: shift/rotate by 1 (D1) or by CL (D3)
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let op = BITWISE_GROUP_LUT[modrm.group() as usize];
                let count = if opcode == 0xD3 { self.regs.c.l() } else { 1 };
                let operand = self.read_rm16(modrm.rm);
                let result = self.bitshift_op16(op, operand, count);
                self.write_rm16(modrm.rm, result);
            }
            0xD4 => {
                // AAM imm8
                let divisor = self.fetch_u8();
                self.aam(divisor)?;
            }
            0xD5 => {
                // AAD imm8
                let multiplier = self.fetch_u8();
                self.aad(multiplier);
            }
            0xD6 => {
                // SALC (undocumented): AL = CF ? FF : 00
                let value = if self.regs.get_flag(Flag::Carry) { 0xFF } else { 0x00 };
                self.regs.a.set_l(value);
            }
            0xD7 => {
                // XLAT: al = [seg:bx+al]
                let offset = self.regs.b.x().wrapping_add(self.regs.a.l() as u16);
                let segment = self.segment_base(Segment::DS);
                let value = self.mem_read_u8(segment, offset);
                self.regs.a.set_l(value);
            }
            0xD8..=0xDF => {
                // ESC: coprocessor opcodes. Without an x87 the 8086 still
                // decodes the modrm byte, then does nothing
                let _ = self.fetch_modrm(RegEncoding::Group, true);
            }
            0xE0 => {
                // LOOPNE rel8
                let disp = self.fetch_u8() as i8;
                let count = self.regs.c.x().wrapping_sub(1);
                self.regs.c.set_x(count);
                let taken = count != 0 && !self.regs.get_flag(Flag::Zero);
                self.jump_relative8(taken, disp);
            }
            0xE1 => {
                // LOOPE rel8
                let disp = self.fetch_u8() as i8;
                let count = self.regs.c.x().wrapping_sub(1);
                self.regs.c.set_x(count);
                let taken = count != 0 && self.regs.get_flag(Flag::Zero);
                self.jump_relative8(taken, disp);
            }
            0xE2 => {
                // LOOP rel8
                let disp = self.fetch_u8() as i8;
                let count = self.regs.c.x().wrapping_sub(1);
                self.regs.c.set_x(count);
                self.jump_relative8(count != 0, disp);
            }
            0xE3 => {
                // JCXZ rel8. Unlike LOOP, CX is only tested
                let disp = self.fetch_u8() as i8;
                let taken = self.regs.c.x() == 0;
                self.jump_relative8(taken, disp);
            }
            0xE4 => {
                // IN al, imm8
                let port = self.fetch_u8() as u16;
                let value = self.bus.io_read_u8(port);
                self.regs.a.set_l(value);
            }
            0xE5 => {
                // IN ax, imm8
                let port = self.fetch_u8() as u16;
                let value = self.bus.io_read_u16(port);
                self.regs.a.set_x(value);
            }
            0xE6 => {
                // OUT imm8, al
                let port = self.fetch_u8() as u16;
                self.bus.io_write_u8(port, self.regs.a.l());
            }
            0xE7 => {
                // OUT imm8, ax
                let port = self.fetch_u8() as u16;
                self.bus.io_write_u16(port, self.regs.a.x());
            }
            0xE8 => {
                // CALL rel16
                let disp = self.fetch_u16() as i16;
                self.call_relative16(disp);
            }
            0xE9 => {
                // JMP rel16
                let disp = self.fetch_u16() as i16;
                self.jump_relative16(true, disp);
            }
            0xEA => {
                // JMP far. The offset is fetched before the segment; updating
                // CS first would redirect the second fetch
                let new_ip = self.fetch_u16();
                let new_cs = self.fetch_u16();
                self.jump_far(new_cs, new_ip);
            }
            0xEB => {
                // JMP rel8
                let disp = self.fetch_u8() as i8;
                self.jump_relative8(true, disp);
            }
            0xEC => {
                // IN al, dx
                let value = self.bus.io_read_u8(self.regs.d.x());
                self.regs.a.set_l(value);
            }
            0xED => {
                // IN ax, dx
                let value = self.bus.io_read_u16(self.regs.d.x());
                self.regs.a.set_x(value);
            }
            0xEE => {
                // OUT dx, al
                self.bus.io_write_u8(self.regs.d.x(), self.regs.a.l());
            }
            0xEF => {
                // OUT dx, ax
                self.bus.io_write_u16(self.regs.d.x(), self.regs.a.x());
            }
            0xF4 => {
                // HLT. With no interrupt source, halting is terminal
                return Ok(StepResult::Halted);
            }
            0xF5 => {
                // CMC
                let carry = self.regs.get_flag(Flag::Carry);
                self.regs.set_flag_state(Flag::Carry, !carry);
            }
            0xF6 => {
                // GRP3 r/m8
                let modrm = self.fetch_modrm(RegEncoding::Group, false);
                let op1 = self.read_rm8(modrm.rm);
                match modrm.group() {
                    0 | 1 => {
                        // TEST r/m8, imm8 (1 is an undocumented alias)
                        let imm = self.fetch_u8();
                        self.math_op8(AluOp::Test, op1, imm);
                    }
                    2 => {
                        // NOT r/m8. Flags: none
                        let result = self.math_op8(AluOp::Not, op1, 0);
                        self.write_rm8(modrm.rm, result);
                    }
                    3 => {
                        // NEG r/m8
                        let result = self.math_op8(AluOp::Neg, op1, 0);
                        self.write_rm8(modrm.rm, result);
                    }
                    4 => self.mul_u8(op1),
                    5 => self.imul_u8(op1),
                    6 => self.div_u8(op1)?,
                    7 => self.idiv_u8(op1)?,
                    _ => unreachable!("group field exceeds three bits"),
                }
            }
            0xF7 => {
                // GRP3 r/m16
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                let op1 = self.read_rm16(modrm.rm);
                match modrm.group() {
                    0 | 1 => {
                        // TEST r/m16, imm16 (1 is an undocumented alias)
                        let imm = self.fetch_u16();
                        self.math_op16(AluOp::Test, op1, imm);
                    }
                    2 => {
                        // NOT r/m16. Flags: none
                        let result = self.math_op16(AluOp::Not, op1, 0);
                        self.write_rm16(modrm.rm, result);
                    }
                    3 => {
                        // NEG r/m16
                        let result = self.math_op16(AluOp::Neg, op1, 0);
                        self.write_rm16(modrm.rm, result);
                    }
                    4 => self.mul_u16(op1),
                    5 => self.imul_u16(op1),
                    6 => self.div_u16(op1)?,
                    7 => self.idiv_u16(op1)?,
                    _ => unreachable!("group field exceeds three bits"),
                }
            }
            0xF8 => {
                // CLC
                self.regs.clear_flag(Flag::Carry);
            }
            0xF9 => {
                // STC
                self.regs.set_flag(Flag::Carry);
            }
            0xFA => {
                // CLI
                self.regs.clear_flag(Flag::Interrupt);
            }
            0xFB => {
                // STI
                self.regs.set_flag(Flag::Interrupt);
            }
            0xFC => {
                // CLD
                self.regs.clear_flag(Flag::Direction);
            }
            0xFD => {
                // STD
                self.regs.set_flag(Flag::Direction);
            }
            0xFE => {
                // GRP4 r/m8: INC and DEC only; the remaining encodings are
                // undefined and rejected
                let modrm = self.fetch_modrm(RegEncoding::Group, false);
                match modrm.group() {
                    0 => {
                        let value = self.read_rm8(modrm.rm);
                        let result = self.math_op8(AluOp::Inc, value, 0);
                        self.write_rm8(modrm.rm, result);
                    }
                    1 => {
                        let value = self.read_rm8(modrm.rm);
                        let result = self.math_op8(AluOp::Dec, value, 0);
                        self.write_rm8(modrm.rm, result);
                    }
                    _ => return Err(self.invalid_opcode(opcode)),
                }
            }
            0xFF => {
                // GRP5 r/m16
                let modrm = self.fetch_modrm(RegEncoding::Group, true);
                match modrm.group() {
                    0 => {
                        // INC r/m16
                        let value = self.read_rm16(modrm.rm);
                        let result = self.math_op16(AluOp::Inc, value, 0);
                        self.write_rm16(modrm.rm, result);
                    }
                    1 => {
                        // DEC r/m16
                        let value = self.read_rm16(modrm.rm);
                        let result = self.math_op16(AluOp::Dec, value, 0);
                        self.write_rm16(modrm.rm, result);
                    }
                    2 => {
                        // CALL r/m16
                        let target = self.read_rm16(modrm.rm);
                        self.call_near(target);
                    }
                    3 => {
                        // CALL far [m32]
                        match modrm.rm {
                            RmOperand::Memory { ea, segment } => {
                                let new_ip = self.mem_read_u16(segment, ea);
                                let new_cs = self.mem_read_u16(segment, ea.wrapping_add(2));
                                self.call_far(new_cs, new_ip);
                            }
                            _ => return Err(self.invalid_opcode(opcode)),
                        }
                    }
                    4 => {
                        // JMP r/m16
                        self.regs.ip = self.read_rm16(modrm.rm);
                    }
                    5 => {
                        // JMP far [m32]
                        match modrm.rm {
                            RmOperand::Memory { ea, segment } => {
                                let new_ip = self.mem_read_u16(segment, ea);
                                let new_cs = self.mem_read_u16(segment, ea.wrapping_add(2));
                                self.jump_far(new_cs, new_ip);
                            }
                            _ => return Err(self.invalid_opcode(opcode)),
                        }
                    }
                    6 => {
                        // PUSH r/m16
                        let value = self.read_rm16(modrm.rm);
                        self.push_u16(value);
                    }
                    _ => return Err(self.invalid_opcode(opcode)),
                }
            }
            _ => {
                // Unpopulated entries take the invalid opcode policy:
                // terminate with the faulting address for the driver to dump
                return Err(self.invalid_opcode(opcode));
            }
        }

        Ok(StepResult::Normal)
    }
}
