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

    cpu::stack.rs

    Stack primitives. The stack grows downward through SS:SP.

*/

use crate::cpu::{Cpu, Register16, Segment, FLAGS_POP_MASK};

impl Cpu {
    pub(crate) fn push_u16(&mut self, data: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.mem_write_u16(Segment::SS, self.regs.sp, data);
    }

    pub(crate) fn pop_u16(&mut self) -> u16 {
        let data = self.mem_read_u16(Segment::SS, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        data
    }

    /// SP is decremented before the value is read, so PUSH SP stores the
    /// new SP, as the 8086 does (the 286 changed this).
    pub(crate) fn push_register16(&mut self, reg: Register16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        let data = self.regs.get_register16(reg);
        self.mem_write_u16(Segment::SS, self.regs.sp, data);
    }

    pub(crate) fn pop_register16(&mut self, reg: Register16) {
        let data = self.mem_read_u16(Segment::SS, self.regs.sp);
        // POP SP loads the popped value without the usual adjustment.
        if reg != Register16::SP {
            self.regs.sp = self.regs.sp.wrapping_add(2);
        }
        self.regs.set_register16(reg, data);
    }

    pub(crate) fn push_flags(&mut self) {
        self.push_u16(self.regs.flags);
    }

    /// Only the defined flag bits are restored.
    pub(crate) fn pop_flags(&mut self) {
        let data = self.pop_u16();
        self.regs.flags = data & FLAGS_POP_MASK;
    }

    /// Discard `disp` bytes of stack, for the RET imm16 forms.
    pub(crate) fn release(&mut self, disp: u16) {
        self.regs.sp = self.regs.sp.wrapping_add(disp);
    }
}
