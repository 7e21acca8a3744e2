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

    cpu::bcd.rs

    Decimal and ASCII adjust instructions.

*/

use crate::cpu::{Cpu, CpuError, Flag};

impl Cpu {
    /// DAA - Decimal adjust AL after addition.
    pub(crate) fn daa(&mut self) {
        let old_al = self.regs.a.l();
        let old_cf = self.regs.get_flag(Flag::Carry);

        if (old_al & 0x0F) > 9 || self.regs.get_flag(Flag::AuxCarry) {
            let (al, nibble_carry) = old_al.overflowing_add(6);
            self.regs.a.set_l(al);
            self.regs.set_flag_state(Flag::Carry, old_cf || nibble_carry);
            self.regs.set_flag(Flag::AuxCarry);
        }
        else {
            self.regs.clear_flag(Flag::AuxCarry);
        }

        if old_al > 0x99 || old_cf {
            self.regs.a.set_l(self.regs.a.l().wrapping_add(0x60));
            self.regs.set_flag(Flag::Carry);
        }
        else {
            self.regs.clear_flag(Flag::Carry);
        }

        let al = self.regs.a.l();
        self.regs.set_szp_flags_from_result_u8(al);
    }

    /// DAS - Decimal adjust AL after subtraction.
    pub(crate) fn das(&mut self) {
        let old_al = self.regs.a.l();
        let old_cf = self.regs.get_flag(Flag::Carry);

        if (old_al & 0x0F) > 9 || self.regs.get_flag(Flag::AuxCarry) {
            let (al, nibble_borrow) = old_al.overflowing_sub(6);
            self.regs.a.set_l(al);
            self.regs.set_flag_state(Flag::Carry, old_cf || nibble_borrow);
            self.regs.set_flag(Flag::AuxCarry);
        }
        else {
            self.regs.clear_flag(Flag::AuxCarry);
        }

        if old_al > 0x99 || old_cf {
            self.regs.a.set_l(self.regs.a.l().wrapping_sub(0x60));
            self.regs.set_flag(Flag::Carry);
        }

        let al = self.regs.a.l();
        self.regs.set_szp_flags_from_result_u8(al);
    }

    /// AAA - ASCII adjust AL after addition. Leaves an unpacked BCD digit
    /// in AL with any decimal carry in AH.
    pub(crate) fn aaa(&mut self) {
        if (self.regs.a.l() & 0x0F) > 9 || self.regs.get_flag(Flag::AuxCarry) {
            self.regs.a.set_l(self.regs.a.l().wrapping_add(6));
            self.regs.a.set_h(self.regs.a.h().wrapping_add(1));
            self.regs.set_flag(Flag::AuxCarry);
            self.regs.set_flag(Flag::Carry);
        }
        else {
            self.regs.clear_flag(Flag::AuxCarry);
            self.regs.clear_flag(Flag::Carry);
        }
        self.regs.a.set_l(self.regs.a.l() & 0x0F);
    }

    /// AAS - ASCII adjust AL after subtraction.
    pub(crate) fn aas(&mut self) {
        if (self.regs.a.l() & 0x0F) > 9 || self.regs.get_flag(Flag::AuxCarry) {
            self.regs.a.set_l(self.regs.a.l().wrapping_sub(6));
            self.regs.a.set_h(self.regs.a.h().wrapping_sub(1));
            self.regs.set_flag(Flag::AuxCarry);
            self.regs.set_flag(Flag::Carry);
        }
        else {
            self.regs.clear_flag(Flag::AuxCarry);
            self.regs.clear_flag(Flag::Carry);
        }
        self.regs.a.set_l(self.regs.a.l() & 0x0F);
    }

    /// AAM - ASCII adjust after multiply. The immediate is the divisor
    /// (conventionally 10); zero raises a divide fault.
    pub(crate) fn aam(&mut self, divisor: u8) -> Result<(), CpuError> {
        if divisor == 0 {
            return Err(self.divide_error());
        }

        let al = self.regs.a.l();
        self.regs.a.set_h(al / divisor);
        self.regs.a.set_l(al % divisor);

        let al = self.regs.a.l();
        self.regs.set_szp_flags_from_result_u8(al);
        Ok(())
    }

    /// AAD - ASCII adjust before division. The immediate is the multiplier
    /// (conventionally 10).
    pub(crate) fn aad(&mut self, multiplier: u8) {
        let al = self
            .regs
            .a
            .l()
            .wrapping_add(self.regs.a.h().wrapping_mul(multiplier));
        self.regs.a.set_l(al);
        self.regs.a.set_h(0);
        self.regs.set_szp_flags_from_result_u8(al);
    }
}
