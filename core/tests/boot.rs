//! Machine construction and the reset sequence against a synthetic BIOS
//! image.

use std::path::PathBuf;

use femto86_core::machine::Machine;

const ROM_WINDOW: usize = 0xA000;

/// Write a synthetic BIOS image to a unique temp file and return its path.
fn write_bios(name: &str, len: usize, patches: &[(usize, &[u8])]) -> PathBuf {
    let mut image = vec![0x90u8; len];
    for (offset, bytes) in patches {
        image[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    }

    let path = std::env::temp_dir().join(format!("femto86_{}_{}.rom", name, std::process::id()));
    std::fs::write(&path, &image).expect("couldn't write test image");
    path
}

#[test]
fn reset_vector_far_jump() {
    // JMP F000:0000 at the reset vector (window offset 0x9FF0 = FFFF0)
    let path = write_bios(
        "reset_vector",
        ROM_WINDOW,
        &[(0x9FF0, &[0xEA, 0x00, 0x00, 0x00, 0xF0])],
    );

    let mut machine = Machine::new(&path).expect("machine build failed");
    machine.reset();
    assert_eq!(machine.cpu().registers().cs, 0xFFFF);
    assert_eq!(machine.cpu().registers().ip, 0x0000);
    assert_eq!(machine.cpu().flat_ip(), 0xFFFF0);

    machine.cpu_mut().step().expect("first instruction failed");
    assert_eq!(machine.cpu().registers().cs, 0xF000);
    assert_eq!(machine.cpu().registers().ip, 0x0000);

    std::fs::remove_file(&path).ok();
}

#[test]
fn small_image_loads_right_aligned() {
    // An 8 KiB image lands at FE000 so its last 16 bytes hold the vector
    let path = write_bios("small_image", 0x2000, &[(0, &[0xAB])]);

    let machine = Machine::new(&path).expect("machine build failed");
    assert_eq!(machine.cpu().bus().read_u8(0xFE000), 0xAB);
    // The window below the image is still zero-filled ROM
    assert_eq!(machine.cpu().bus().read_u8(0xF6000), 0x00);

    std::fs::remove_file(&path).ok();
}

#[test]
fn oversized_image_is_fatal() {
    let path = write_bios("oversized", ROM_WINDOW + 1, &[]);
    assert!(Machine::new(&path).is_err());
    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_image_is_fatal() {
    let path = PathBuf::from("/nonexistent/femto86_no_such.rom");
    assert!(Machine::new(&path).is_err());
}

#[test]
fn rom_window_rejects_writes() {
    let path = write_bios("rom_writes", 0x2000, &[(0, &[0x5A])]);

    let mut machine = Machine::new(&path).expect("machine build failed");
    machine.cpu_mut().bus_mut().write_u8(0xFE000, 0x00);
    assert_eq!(machine.cpu().bus().read_u8(0xFE000), 0x5A);

    std::fs::remove_file(&path).ok();
}
