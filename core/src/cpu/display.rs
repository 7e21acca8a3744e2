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

    cpu::display.rs

    Formatting of addresses, flags and the register dump.

*/

use std::fmt;

use crate::cpu::{calc_linear_address, Cpu, CpuAddress, Flag, Segment};

impl fmt::Display for CpuAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CpuAddress::Flat(address) => write!(f, "{:05X}", address),
            CpuAddress::Segmented(segment, offset) => write!(f, "{:04X}:{:04X}", segment, offset),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Segment::ES => write!(f, "ES"),
            Segment::CS => write!(f, "CS"),
            Segment::SS => write!(f, "SS"),
            Segment::DS => write!(f, "DS"),
        }
    }
}

impl Cpu {
    /// Render FLAGS in the conventional o d i t s z a p c order, uppercase
    /// when set.
    pub fn flags_string(&self) -> String {
        let mut s = String::with_capacity(9);
        let flags = [
            (Flag::Overflow, 'o'),
            (Flag::Direction, 'd'),
            (Flag::Interrupt, 'i'),
            (Flag::Trap, 't'),
            (Flag::Sign, 's'),
            (Flag::Zero, 'z'),
            (Flag::AuxCarry, 'a'),
            (Flag::Parity, 'p'),
            (Flag::Carry, 'c'),
        ];
        for (flag, ch) in flags {
            if self.get_flag(flag) {
                s.push(ch.to_ascii_uppercase());
            }
            else {
                s.push(ch);
            }
        }
        s
    }

    /// Full register dump for fatal diagnostics.
    pub fn dump_string(&self) -> String {
        let regs = self.registers();
        format!(
            concat!(
                "AX: {:04X} BX: {:04X} CX: {:04X} DX: {:04X}\n",
                "SP: {:04X} BP: {:04X} SI: {:04X} DI: {:04X}\n",
                "CS: {:04X} DS: {:04X} ES: {:04X} SS: {:04X}\n",
                "IP: {:04X} ({:05X})\n",
                "FLAGS: {:04X} [{}]"
            ),
            regs.a.x(),
            regs.b.x(),
            regs.c.x(),
            regs.d.x(),
            regs.sp,
            regs.bp,
            regs.si,
            regs.di,
            regs.cs,
            regs.ds,
            regs.es,
            regs.ss,
            regs.ip,
            calc_linear_address(regs.cs, regs.ip),
            regs.flags,
            self.flags_string(),
        )
    }
}
