//! Multiply, divide, shifts and rotates through their opcode encodings.

mod common;

use common::{load_code, step, test_cpu};
use femto86_core::cpu::{Flag, Register16, Register8};

#[test]
fn mul_narrow_without_overflow() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 5);
    cpu.set_register8(Register8::BL, 7);
    // MUL BL
    load_code(&mut cpu, &[0xF6, 0xE3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 35);
    assert!(!cpu.get_flag(Flag::Carry));
    assert!(!cpu.get_flag(Flag::Overflow));
}

#[test]
fn mul_narrow_with_significant_high_half() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 0x80);
    cpu.set_register8(Register8::BL, 0x02);
    load_code(&mut cpu, &[0xF6, 0xE3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0100);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::Overflow));
}

#[test]
fn mul_wide_fills_dx() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x8000);
    cpu.set_register16(Register16::BX, 0x0004);
    // MUL BX
    load_code(&mut cpu, &[0xF7, 0xE3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0000);
    assert_eq!(cpu.get_register16(Register16::DX), 0x0002);
    assert!(cpu.get_flag(Flag::Carry));
}

#[test]
fn imul_sign_extension_clears_flags() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 0xFF); // -1
    cpu.set_register8(Register8::BL, 0x02);
    // IMUL BL
    load_code(&mut cpu, &[0xF6, 0xEB]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0xFFFE); // -2
    assert!(!cpu.get_flag(Flag::Carry));
    assert!(!cpu.get_flag(Flag::Overflow));
}

#[test]
fn div_narrow_quotient_and_remainder() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 100);
    cpu.set_register8(Register8::BL, 7);
    // DIV BL
    load_code(&mut cpu, &[0xF6, 0xF3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 14);
    assert_eq!(cpu.get_register8(Register8::AH), 2);
}

#[test]
fn idiv_truncates_toward_zero() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, (-7i16) as u16);
    cpu.set_register8(Register8::BL, 2);
    // IDIV BL
    load_code(&mut cpu, &[0xF6, 0xFB]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), (-3i8) as u8);
    assert_eq!(cpu.get_register8(Register8::AH), (-1i8) as u8);
}

#[test]
fn div_wide() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::DX, 0x0001);
    cpu.set_register16(Register16::AX, 0x0000);
    cpu.set_register16(Register16::BX, 0x0002);
    // DIV BX: 10000h / 2
    load_code(&mut cpu, &[0xF7, 0xF3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x8000);
    assert_eq!(cpu.get_register16(Register16::DX), 0x0000);
}

#[test]
fn neg_sets_carry_unless_zero() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::BL, 0x01);
    // NEG BL; NEG BL back through zero
    load_code(&mut cpu, &[0xF6, 0xDB]);
    step(&mut cpu);
    assert_eq!(cpu.get_register8(Register8::BL), 0xFF);
    assert!(cpu.get_flag(Flag::Carry));

    cpu.set_register8(Register8::BL, 0x00);
    cpu.registers_mut().ip = 0x0100;
    step(&mut cpu);
    assert_eq!(cpu.get_register8(Register8::BL), 0x00);
    assert!(!cpu.get_flag(Flag::Carry));
}

#[test]
fn not_leaves_flags_alone() {
    let mut cpu = test_cpu();
    cpu.set_flag_state(Flag::Carry, true);
    cpu.set_flag_state(Flag::Zero, true);
    cpu.set_register16(Register16::BX, 0x00FF);
    // NOT BX
    load_code(&mut cpu, &[0xF7, 0xD3]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::BX), 0xFF00);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::Zero));
}

#[test]
fn shl_by_one_sets_carry_and_overflow() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x8000);
    // SHL AX, 1
    load_code(&mut cpu, &[0xD1, 0xE0]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0000);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::Overflow));
    assert!(cpu.get_flag(Flag::Zero));
}

#[test]
fn shr_by_cl_count() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x0100);
    cpu.set_register8(Register8::CL, 4);
    // SHR AX, CL
    load_code(&mut cpu, &[0xD3, 0xE8]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0010);
    assert!(!cpu.get_flag(Flag::Carry));
}

#[test]
fn sar_preserves_sign() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::BL, 0xF0);
    cpu.set_register8(Register8::CL, 2);
    // SAR BL, CL
    load_code(&mut cpu, &[0xD2, 0xFB]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::BL), 0xFC);
    assert!(cpu.get_flag(Flag::Sign));
}

#[test]
fn rcl_rotates_through_carry() {
    let mut cpu = test_cpu();
    cpu.set_flag_state(Flag::Carry, true);
    cpu.set_register8(Register8::AL, 0x00);
    // RCL AL, 1
    load_code(&mut cpu, &[0xD0, 0xD0]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 0x01);
    assert!(!cpu.get_flag(Flag::Carry));
}

#[test]
fn rotate_count_zero_preserves_flags() {
    let mut cpu = test_cpu();
    cpu.set_flag_state(Flag::Carry, true);
    cpu.set_register8(Register8::CL, 0);
    cpu.set_register8(Register8::AL, 0x81);
    // ROL AL, CL with CL=0
    load_code(&mut cpu, &[0xD2, 0xC0]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 0x81);
    assert!(cpu.get_flag(Flag::Carry));
}

#[test]
fn aam_splits_binary_into_digits() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 45);
    // AAM
    load_code(&mut cpu, &[0xD4, 0x0A]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AH), 4);
    assert_eq!(cpu.get_register8(Register8::AL), 5);
}

#[test]
fn aad_recombines_digits() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AH, 4);
    cpu.set_register8(Register8::AL, 5);
    // AAD
    load_code(&mut cpu, &[0xD5, 0x0A]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 45);
}

#[test]
fn daa_adjusts_packed_sum() {
    let mut cpu = test_cpu();
    // 29h + 14h = 3Dh, DAA corrects to 43h
    cpu.set_register8(Register8::AL, 0x29);
    load_code(&mut cpu, &[0x04, 0x14, 0x27]);
    step(&mut cpu);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 0x43);
    assert!(!cpu.get_flag(Flag::Carry));
}
