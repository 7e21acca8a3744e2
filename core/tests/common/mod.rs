#![allow(dead_code)]

use femto86_core::{
    bus::{Bus, MemoryArea},
    cpu::{calc_linear_address, Cpu, Register16, StepResult},
};

/// A CPU over a single flat RAM area covering the whole address space,
/// with CS:IP at 0000:0100 and a stack at the top of segment zero.
pub fn test_cpu() -> Cpu {
    let mut bus = Bus::new();
    bus.attach_area(MemoryArea::new(0x00000, 0xFFFFF, true, true));

    let mut cpu = Cpu::new(bus);
    cpu.set_register16(Register16::CS, 0x0000);
    cpu.set_register16(Register16::SS, 0x0000);
    cpu.registers_mut().ip = 0x0100;
    cpu.registers_mut().sp = 0xFFFE;
    cpu
}

/// Write `code` at the current CS:IP.
pub fn load_code(cpu: &mut Cpu, code: &[u8]) {
    let base = calc_linear_address(cpu.registers().cs, cpu.registers().ip);
    for (i, byte) in code.iter().enumerate() {
        cpu.bus_mut().write_u8(base + i as u32, *byte);
    }
}

/// Step once, expecting normal completion.
pub fn step(cpu: &mut Cpu) {
    assert_eq!(cpu.step().expect("instruction failed"), StepResult::Normal);
}

pub fn step_n(cpu: &mut Cpu, n: usize) {
    for _ in 0..n {
        step(cpu);
    }
}
