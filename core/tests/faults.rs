//! Terminal fault paths: invalid opcodes, unsupported opcodes, divide
//! errors.

mod common;

use common::{load_code, test_cpu};
use femto86_core::cpu::{CpuError, Register16, Register8};

#[test]
fn divide_by_zero_faults() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::BL, 0);
    // DIV BL
    load_code(&mut cpu, &[0xF6, 0xF3]);

    match cpu.step() {
        Err(CpuError::DivideError(_)) => {}
        other => panic!("expected divide error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn divide_quotient_overflow_faults() {
    let mut cpu = test_cpu();
    // AX / 1 cannot fit AL when AH is nonzero
    cpu.set_register16(Register16::AX, 0x0400);
    cpu.set_register8(Register8::BL, 1);
    load_code(&mut cpu, &[0xF6, 0xF3]);

    assert!(matches!(cpu.step(), Err(CpuError::DivideError(_))));
}

#[test]
fn aam_zero_faults() {
    let mut cpu = test_cpu();
    // AAM 0
    load_code(&mut cpu, &[0xD4, 0x00]);
    assert!(matches!(cpu.step(), Err(CpuError::DivideError(_))));
}

#[test]
fn undefined_group_encoding_is_invalid() {
    let mut cpu = test_cpu();
    // FE /7 has no defined semantics
    load_code(&mut cpu, &[0xFE, 0xF8]);
    assert!(matches!(cpu.step(), Err(CpuError::InvalidOpcode(0xFE, _))));
}

#[test]
fn interrupt_opcodes_are_unsupported() {
    let mut cpu = test_cpu();
    // INT 10h
    load_code(&mut cpu, &[0xCD, 0x10]);
    assert!(matches!(
        cpu.step(),
        Err(CpuError::UnsupportedOpcode(0xCD, _))
    ));
}

#[test]
fn fault_reports_instruction_address() {
    let mut cpu = test_cpu();
    load_code(&mut cpu, &[0xCD, 0x10]);

    let err = cpu.step().unwrap_err();
    let message = format!("{}", err);
    // The faulting CS:IP is the start of the instruction, not where fetch
    // stopped
    assert!(message.contains("0000:0100"), "message was: {}", message);
}

#[test]
fn esc_opcodes_are_tolerated() {
    let mut cpu = test_cpu();
    // FNINIT's first byte pattern: ESC with a register operand
    load_code(&mut cpu, &[0xDB, 0xE3, 0x90]);
    cpu.step().expect("ESC should be a no-op");
    assert_eq!(cpu.registers().ip, 0x0102);
}
