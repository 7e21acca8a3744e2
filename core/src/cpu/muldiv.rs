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

    cpu::muldiv.rs

    Multiply and divide. CF and OF report whether the upper half of a
    product is significant; SF, ZF, AF and PF are undefined on hardware and
    left untouched here. Division faults are terminal until interrupt
    delivery exists to raise interrupt 0.

*/

use crate::cpu::{Cpu, CpuError, Flag};

impl Cpu {
    /// MUL r/m8: AX = AL * operand.
    pub(crate) fn mul_u8(&mut self, operand: u8) {
        let product = (self.regs.a.l() as u16) * (operand as u16);
        self.regs.a.set_x(product);

        let upper = self.regs.a.h() != 0;
        self.regs.set_flag_state(Flag::Carry, upper);
        self.regs.set_flag_state(Flag::Overflow, upper);
    }

    /// MUL r/m16: DX:AX = AX * operand.
    pub(crate) fn mul_u16(&mut self, operand: u16) {
        let product = (self.regs.a.x() as u32) * (operand as u32);
        self.regs.a.set_x((product & 0xFFFF) as u16);
        self.regs.d.set_x((product >> 16) as u16);

        let upper = self.regs.d.x() != 0;
        self.regs.set_flag_state(Flag::Carry, upper);
        self.regs.set_flag_state(Flag::Overflow, upper);
    }

    /// IMUL r/m8: AX = AL * operand, signed. CF/OF are set unless AH is the
    /// sign extension of AL.
    pub(crate) fn imul_u8(&mut self, operand: u8) {
        let product = (self.regs.a.l() as i8 as i16) * (operand as i8 as i16);
        self.regs.a.set_x(product as u16);

        let upper = product != (product as i8 as i16);
        self.regs.set_flag_state(Flag::Carry, upper);
        self.regs.set_flag_state(Flag::Overflow, upper);
    }

    /// IMUL r/m16: DX:AX = AX * operand, signed.
    pub(crate) fn imul_u16(&mut self, operand: u16) {
        let product = (self.regs.a.x() as i16 as i32) * (operand as i16 as i32);
        self.regs.a.set_x((product & 0xFFFF) as u16);
        self.regs.d.set_x(((product >> 16) & 0xFFFF) as u16);

        let upper = product != (product as i16 as i32);
        self.regs.set_flag_state(Flag::Carry, upper);
        self.regs.set_flag_state(Flag::Overflow, upper);
    }

    /// DIV r/m8: AL = AX / operand, AH = remainder.
    pub(crate) fn div_u8(&mut self, operand: u8) -> Result<(), CpuError> {
        if operand == 0 {
            return Err(self.divide_error());
        }

        let dividend = self.regs.a.x();
        let quotient = dividend / operand as u16;
        if quotient > 0xFF {
            return Err(self.divide_error());
        }

        self.regs.a.set_l(quotient as u8);
        self.regs.a.set_h((dividend % operand as u16) as u8);
        Ok(())
    }

    /// DIV r/m16: AX = DX:AX / operand, DX = remainder.
    pub(crate) fn div_u16(&mut self, operand: u16) -> Result<(), CpuError> {
        if operand == 0 {
            return Err(self.divide_error());
        }

        let dividend = ((self.regs.d.x() as u32) << 16) | self.regs.a.x() as u32;
        let quotient = dividend / operand as u32;
        if quotient > 0xFFFF {
            return Err(self.divide_error());
        }

        self.regs.a.set_x(quotient as u16);
        self.regs.d.set_x((dividend % operand as u32) as u16);
        Ok(())
    }

    /// IDIV r/m8: signed division of AX. The quotient truncates toward
    /// zero and must fit in a signed byte.
    pub(crate) fn idiv_u8(&mut self, operand: u8) -> Result<(), CpuError> {
        let divisor = operand as i8 as i16;
        if divisor == 0 {
            return Err(self.divide_error());
        }

        let dividend = self.regs.a.x() as i16;
        let quotient = dividend.wrapping_div(divisor);
        if quotient > i8::MAX as i16 || quotient < i8::MIN as i16 {
            return Err(self.divide_error());
        }

        self.regs.a.set_l(quotient as u8);
        self.regs.a.set_h(dividend.wrapping_rem(divisor) as u8);
        Ok(())
    }

    /// IDIV r/m16: signed division of DX:AX.
    pub(crate) fn idiv_u16(&mut self, operand: u16) -> Result<(), CpuError> {
        let divisor = operand as i16 as i32;
        if divisor == 0 {
            return Err(self.divide_error());
        }

        let dividend = (((self.regs.d.x() as u32) << 16) | self.regs.a.x() as u32) as i32;
        let quotient = dividend.wrapping_div(divisor);
        if quotient > i16::MAX as i32 || quotient < i16::MIN as i32 {
            return Err(self.divide_error());
        }

        self.regs.a.set_x(quotient as u16);
        self.regs.d.set_x(dividend.wrapping_rem(divisor) as u16);
        Ok(())
    }
}
