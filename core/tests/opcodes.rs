//! Data movement and flag behavior of individual instructions.

mod common;

use common::{load_code, step, step_n, test_cpu};
use femto86_core::cpu::{Flag, Register16, Register8};

#[test]
fn mov_immediate_then_store() {
    let mut cpu = test_cpu();
    // MOV AX, 1234h; MOV [2000h], AX
    load_code(&mut cpu, &[0xB8, 0x34, 0x12, 0xA3, 0x00, 0x20]);
    step_n(&mut cpu, 2);

    assert_eq!(cpu.get_register16(Register16::AX), 0x1234);
    assert_eq!(cpu.bus().read_u8(0x02000), 0x34);
    assert_eq!(cpu.bus().read_u8(0x02001), 0x12);
}

#[test]
fn mov_r8_immediate_decodes_all_encodings() {
    let mut cpu = test_cpu();
    // B0-B7 select AL, CL, DL, BL, AH, CH, DH, BH in order
    load_code(
        &mut cpu,
        &[
            0xB0, 0x10, 0xB1, 0x11, 0xB2, 0x12, 0xB3, 0x13, //
            0xB4, 0x14, 0xB5, 0x15, 0xB6, 0x16, 0xB7, 0x17,
        ],
    );
    step_n(&mut cpu, 8);

    assert_eq!(cpu.get_register8(Register8::AL), 0x10);
    assert_eq!(cpu.get_register8(Register8::CL), 0x11);
    assert_eq!(cpu.get_register8(Register8::DL), 0x12);
    assert_eq!(cpu.get_register8(Register8::BL), 0x13);
    assert_eq!(cpu.get_register8(Register8::AH), 0x14);
    assert_eq!(cpu.get_register8(Register8::CH), 0x15);
    assert_eq!(cpu.get_register8(Register8::DH), 0x16);
    assert_eq!(cpu.get_register8(Register8::BH), 0x17);
}

#[test]
fn xor_ax_ax_sets_flags() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x1234);
    // XOR AX, AX
    load_code(&mut cpu, &[0x33, 0xC0]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0000);
    assert!(cpu.get_flag(Flag::Zero));
    assert!(!cpu.get_flag(Flag::Sign));
    assert!(!cpu.get_flag(Flag::Carry));
    assert!(!cpu.get_flag(Flag::Overflow));
    assert!(cpu.get_flag(Flag::Parity));
}

#[test]
fn inc_at_signed_maximum() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x7FFF);
    // INC AX
    load_code(&mut cpu, &[0x40]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x8000);
    assert!(cpu.get_flag(Flag::Overflow));
    assert!(cpu.get_flag(Flag::Sign));
    assert!(!cpu.get_flag(Flag::Zero));
}

#[test]
fn dec_at_signed_minimum() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x8000);
    // DEC AX
    load_code(&mut cpu, &[0x48]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x7FFF);
    assert!(cpu.get_flag(Flag::Overflow));
    assert!(!cpu.get_flag(Flag::Sign));
    assert!(!cpu.get_flag(Flag::Zero));
}

#[test]
fn inc_preserves_carry() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0xFFFF);
    // STC; INC AX
    load_code(&mut cpu, &[0xF9, 0x40]);
    step_n(&mut cpu, 2);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0000);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::Zero));
}

#[test]
fn push_pop_round_trip() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::BX, 0x55AA);
    let sp_before = cpu.registers().sp;
    // PUSH BX; POP BX
    load_code(&mut cpu, &[0x53, 0x5B]);
    step_n(&mut cpu, 2);

    assert_eq!(cpu.get_register16(Register16::BX), 0x55AA);
    assert_eq!(cpu.registers().sp, sp_before);
}

#[test]
fn xchg_twice_is_identity() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::BX, 0x0001);
    cpu.set_register16(Register16::CX, 0x0002);
    // XCHG BX, CX twice
    load_code(&mut cpu, &[0x87, 0xD9, 0x87, 0xD9]);

    step(&mut cpu);
    assert_eq!(cpu.get_register16(Register16::BX), 0x0002);
    assert_eq!(cpu.get_register16(Register16::CX), 0x0001);

    step(&mut cpu);
    assert_eq!(cpu.get_register16(Register16::BX), 0x0001);
    assert_eq!(cpu.get_register16(Register16::CX), 0x0002);
}

#[test]
fn add_sets_carry_and_aux() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 0xFF);
    // ADD AL, 1
    load_code(&mut cpu, &[0x04, 0x01]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 0x00);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::AuxCarry));
    assert!(cpu.get_flag(Flag::Zero));
}

#[test]
fn cmp_does_not_write_destination() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::AX, 0x0005);
    // CMP AX, 7
    load_code(&mut cpu, &[0x3D, 0x07, 0x00]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x0005);
    assert!(cpu.get_flag(Flag::Carry));
    assert!(cpu.get_flag(Flag::Sign));
}

#[test]
fn group1_sign_extended_immediate() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::BX, 0x0100);
    // ADD BX, -2 (83 /0 with sign-extended imm8)
    load_code(&mut cpu, &[0x83, 0xC3, 0xFE]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::BX), 0x00FE);
}

#[test]
fn lea_computes_address_without_memory_access() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::BX, 0x1000);
    cpu.registers_mut().si = 0x0234;
    // LEA AX, [BX+SI+4]
    load_code(&mut cpu, &[0x8D, 0x40, 0x04]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::AX), 0x1238);
}

#[test]
fn les_loads_offset_and_segment() {
    let mut cpu = test_cpu();
    cpu.bus_mut().write_u16(0x3000, 0xBEEF);
    cpu.bus_mut().write_u16(0x3002, 0x1234);
    // LES BX, [3000h]
    load_code(&mut cpu, &[0xC4, 0x1E, 0x00, 0x30]);
    step(&mut cpu);

    assert_eq!(cpu.get_register16(Register16::BX), 0xBEEF);
    assert_eq!(cpu.registers().es, 0x1234);
}

#[test]
fn cbw_and_cwd_sign_extend() {
    let mut cpu = test_cpu();
    cpu.set_register8(Register8::AL, 0x80);
    // CBW; CWD
    load_code(&mut cpu, &[0x98, 0x99]);
    step(&mut cpu);
    assert_eq!(cpu.get_register16(Register16::AX), 0xFF80);
    step(&mut cpu);
    assert_eq!(cpu.get_register16(Register16::DX), 0xFFFF);
}

#[test]
fn xlat_translates_through_bx_table() {
    let mut cpu = test_cpu();
    cpu.set_register16(Register16::BX, 0x4000);
    cpu.set_register8(Register8::AL, 0x05);
    cpu.bus_mut().write_u8(0x4005, 0x99);
    // XLAT
    load_code(&mut cpu, &[0xD7]);
    step(&mut cpu);

    assert_eq!(cpu.get_register8(Register8::AL), 0x99);
}

#[test]
fn sahf_lahf_round_trip() {
    let mut cpu = test_cpu();
    // STC; LAHF; CLC; SAHF  -- SAHF restores the saved carry
    load_code(&mut cpu, &[0xF9, 0x9F, 0xF8, 0x9E]);
    step_n(&mut cpu, 4);
    assert!(cpu.get_flag(Flag::Carry));
}
