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

    cpu::jump.rs

    Control transfer helpers: relative jumps, calls, returns and the
    conditional-jump predicate table.

*/

use crate::cpu::{Cpu, Flag};

impl Cpu {
    /// Evaluate the condition of a Jcc opcode from its low nibble.
    /// Odd condition codes negate their even predecessor.
    pub(crate) fn condition_met(&self, cc: u8) -> bool {
        let predicate = match cc >> 1 {
            0 => self.regs.get_flag(Flag::Overflow),
            1 => self.regs.get_flag(Flag::Carry),
            2 => self.regs.get_flag(Flag::Zero),
            3 => self.regs.get_flag(Flag::Carry) || self.regs.get_flag(Flag::Zero),
            4 => self.regs.get_flag(Flag::Sign),
            5 => self.regs.get_flag(Flag::Parity),
            6 => self.regs.get_flag(Flag::Sign) != self.regs.get_flag(Flag::Overflow),
            _ => {
                self.regs.get_flag(Flag::Zero)
                    || (self.regs.get_flag(Flag::Sign) != self.regs.get_flag(Flag::Overflow))
            }
        };

        if cc & 0x01 != 0 {
            !predicate
        }
        else {
            predicate
        }
    }

    /// Displace IP by a sign-extended 8-bit offset if `condition` holds.
    pub(crate) fn jump_relative8(&mut self, condition: bool, disp: i8) {
        if condition {
            self.regs.ip = self.regs.ip.wrapping_add(disp as u16);
        }
    }

    pub(crate) fn jump_relative16(&mut self, condition: bool, disp: i16) {
        if condition {
            self.regs.ip = self.regs.ip.wrapping_add(disp as u16);
        }
    }

    /// CALL rel16: the return address is the IP following the displacement
    /// field, which fetching has already produced.
    pub(crate) fn call_relative16(&mut self, disp: i16) {
        self.push_u16(self.regs.ip);
        self.regs.ip = self.regs.ip.wrapping_add(disp as u16);
    }

    pub(crate) fn call_near(&mut self, new_ip: u16) {
        self.push_u16(self.regs.ip);
        self.regs.ip = new_ip;
    }

    pub(crate) fn call_far(&mut self, new_cs: u16, new_ip: u16) {
        self.push_u16(self.regs.cs);
        self.push_u16(self.regs.ip);
        self.regs.cs = new_cs;
        self.regs.ip = new_ip;
    }

    pub(crate) fn jump_far(&mut self, new_cs: u16, new_ip: u16) {
        self.regs.cs = new_cs;
        self.regs.ip = new_ip;
    }

    pub(crate) fn ret_near(&mut self, release: u16) {
        self.regs.ip = self.pop_u16();
        self.release(release);
    }

    pub(crate) fn ret_far(&mut self, release: u16) {
        self.regs.ip = self.pop_u16();
        self.regs.cs = self.pop_u16();
        self.release(release);
    }
}
