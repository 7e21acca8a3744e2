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

    bus.rs

    Implements the system bus: physical memory areas routed by 20-bit
    address, and port I/O dispatch to attached devices.

*/

use std::path::Path;

use fxhash::FxHashMap;

use crate::memerror::MemError;
use core::fmt::Display;
use std::error::Error;

/// 20-bit physical address space.
pub const ADDRESS_SPACE: usize = 0x10_0000;
pub const ADDRESS_MASK: u32 = 0xF_FFFF;

// An access that decodes to no area or port floats the bus; reads return
// a benign constant and writes are dropped.
pub const OPEN_BUS_BYTE: u8 = 0x00;
pub const NO_IO_BYTE: u8 = 0x00;

#[derive(Debug)]
pub enum BusError {
    PortInUse(u16),
}

impl Error for BusError {}
impl Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            BusError::PortInUse(port) => {
                write!(f, "I/O port {:04X}h is already registered.", port)
            }
        }
    }
}

/// A contiguous physical memory region with read/write permission flags.
///
/// Areas are built at machine construction time and never detached during a
/// run. Bytes mutate only through Bus writes to writable regions, or through
/// `load_image` before execution begins.
pub struct MemoryArea {
    start: u32,
    end: u32,
    readable: bool,
    writable: bool,
    data: Vec<u8>,
}

impl MemoryArea {
    /// Create a zero-filled area spanning `start..=end` (20-bit physical).
    pub fn new(start: u32, end: u32, readable: bool, writable: bool) -> Self {
        let len = (end - start + 1) as usize;
        Self {
            start,
            end,
            readable,
            writable,
            data: vec![0; len],
        }
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && address <= self.end
    }

    /// Read one byte at `offset` within the area. Offsets out of range are a
    /// caller bug; the Bus only produces offsets it has range-checked.
    pub fn read_u8(&self, offset: u32) -> Result<u8, MemError> {
        if !self.readable {
            return Err(MemError::NotReadable);
        }
        Ok(self.data[offset as usize])
    }

    pub fn write_u8(&mut self, offset: u32, byte: u8) -> Result<(), MemError> {
        if !self.writable {
            return Err(MemError::NotWritable);
        }
        self.data[offset as usize] = byte;
        Ok(())
    }

    /// Load a raw image file into the area at `offset`, replacing
    /// `[offset, offset + file_len)`. The file must fill the remainder of
    /// the area exactly; ROM images are right-aligned by choosing `offset`.
    ///
    /// Bypasses the writable flag. Only valid before execution begins.
    pub fn load_image(&mut self, path: &Path, offset: usize) -> Result<(), MemError> {
        let image = std::fs::read(path).map_err(|_| MemError::FileReadError)?;

        let expected = self.data.len() - offset;
        if image.len() != expected {
            return Err(MemError::SizeMismatch {
                expected,
                got: image.len(),
            });
        }

        self.data[offset..].copy_from_slice(&image);
        Ok(())
    }
}

/// Interface for a device that responds to port I/O.
///
/// Callbacks are invoked synchronously from within the executing IN/OUT
/// instruction and must not re-enter the CPU.
pub trait IoDevice {
    fn read_u8(&mut self, port: u16) -> u8;
    fn write_u8(&mut self, port: u16, data: u8);
    fn port_list(&self) -> Vec<(String, u16)>;
}

/// The system bus. Owns all memory areas and attached I/O devices, routing
/// memory accesses by 20-bit physical address (first attached match wins)
/// and port accesses by 16-bit port number.
#[derive(Default)]
pub struct Bus {
    areas: Vec<MemoryArea>,
    io_devices: Vec<Box<dyn IoDevice>>,
    io_map: FxHashMap<u16, usize>,
}

impl Bus {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an area to the routing table. Lookup is first-match in attach
    /// order; callers keep areas non-overlapping.
    pub fn attach_area(&mut self, area: MemoryArea) {
        self.areas.push(area);
    }

    pub fn areas(&self) -> &[MemoryArea] {
        &self.areas
    }

    pub fn area_mut(&mut self, index: usize) -> &mut MemoryArea {
        &mut self.areas[index]
    }

    fn find_area(&self, address: u32) -> Option<&MemoryArea> {
        self.areas.iter().find(|area| area.contains(address))
    }

    fn find_area_mut(&mut self, address: u32) -> Option<&mut MemoryArea> {
        self.areas.iter_mut().find(|area| area.contains(address))
    }

    /// Read one byte from physical memory. Unmapped or unreadable addresses
    /// float the bus: log once and return `OPEN_BUS_BYTE`.
    pub fn read_u8(&self, address: u32) -> u8 {
        let address = address & ADDRESS_MASK;
        match self.find_area(address) {
            Some(area) => match area.read_u8(address - area.start()) {
                Ok(byte) => byte,
                Err(_) => {
                    log::warn!("Read from non-readable memory area @ {:05X}", address);
                    OPEN_BUS_BYTE
                }
            },
            None => {
                log::warn!("Read from unknown memory area @ {:05X}", address);
                OPEN_BUS_BYTE
            }
        }
    }

    /// Write one byte to physical memory. Unmapped or non-writable addresses
    /// drop the write with a log line.
    pub fn write_u8(&mut self, address: u32, byte: u8) {
        let address = address & ADDRESS_MASK;
        match self.find_area_mut(address) {
            Some(area) => {
                let start = area.start();
                if area.write_u8(address - start, byte).is_err() {
                    log::warn!("Write of {:02X} to non-writable memory area @ {:05X}", byte, address);
                }
            }
            None => {
                log::warn!("Write of {:02X} to unknown memory area @ {:05X}", byte, address);
            }
        }
    }

    /// Little-endian word read as two independent byte accesses. The 8086
    /// imposes no alignment constraint.
    pub fn read_u16(&self, address: u32) -> u16 {
        (self.read_u8(address) as u16) | ((self.read_u8(address.wrapping_add(1)) as u16) << 8)
    }

    pub fn write_u16(&mut self, address: u32, word: u16) {
        self.write_u8(address, (word & 0xFF) as u8);
        self.write_u8(address.wrapping_add(1), (word >> 8) as u8);
    }

    /// Attach an I/O device, claiming every port it lists. Registering a
    /// port twice is a construction-time error.
    pub fn attach_io_device(&mut self, device: Box<dyn IoDevice>) -> Result<(), BusError> {
        let ports = device.port_list();
        for (_, port) in &ports {
            if self.io_map.contains_key(port) {
                return Err(BusError::PortInUse(*port));
            }
        }

        let device_idx = self.io_devices.len();
        for (name, port) in ports {
            log::debug!("Registering I/O port {:04X} ({})", port, name);
            self.io_map.insert(port, device_idx);
        }
        self.io_devices.push(device);
        Ok(())
    }

    pub fn io_read_u8(&mut self, port: u16) -> u8 {
        match self.io_map.get(&port) {
            Some(&device_idx) => self.io_devices[device_idx].read_u8(port),
            None => {
                log::warn!("Read from unregistered I/O port {:04X}", port);
                NO_IO_BYTE
            }
        }
    }

    pub fn io_write_u8(&mut self, port: u16, data: u8) {
        match self.io_map.get(&port) {
            Some(&device_idx) => self.io_devices[device_idx].write_u8(port, data),
            None => {
                log::warn!("Write of {:02X} to unregistered I/O port {:04X}", data, port);
            }
        }
    }

    /// Word port I/O decomposes into byte operations on consecutive ports.
    pub fn io_read_u16(&mut self, port: u16) -> u16 {
        (self.io_read_u8(port) as u16) | ((self.io_read_u8(port.wrapping_add(1)) as u16) << 8)
    }

    pub fn io_write_u16(&mut self, port: u16, data: u16) {
        self.io_write_u8(port, (data & 0xFF) as u8);
        self.io_write_u8(port.wrapping_add(1), (data >> 8) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScratchPort {
        port: u16,
        latch: u8,
    }

    impl IoDevice for ScratchPort {
        fn read_u8(&mut self, _port: u16) -> u8 {
            self.latch
        }
        fn write_u8(&mut self, _port: u16, data: u8) {
            self.latch = data;
        }
        fn port_list(&self) -> Vec<(String, u16)> {
            vec![("SCRATCH".to_string(), self.port)]
        }
    }

    fn test_bus() -> Bus {
        let mut bus = Bus::new();
        bus.attach_area(MemoryArea::new(0x00000, 0x9FFFF, true, true));
        bus.attach_area(MemoryArea::new(0xF6000, 0xFFFFF, true, false));
        bus
    }

    #[test]
    fn ram_read_back() {
        let mut bus = test_bus();
        bus.write_u8(0x1234, 0xAB);
        assert_eq!(bus.read_u8(0x1234), 0xAB);
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = test_bus();
        bus.write_u16(0x2000, 0x1234);
        assert_eq!(bus.read_u8(0x2000), 0x34);
        assert_eq!(bus.read_u8(0x2001), 0x12);
        assert_eq!(bus.read_u16(0x2000), 0x1234);
    }

    #[test]
    fn unmapped_address_floats() {
        let mut bus = test_bus();
        // F0000-F5FFF is not decoded by the test map
        bus.write_u8(0xF0000, 0x55);
        assert_eq!(bus.read_u8(0xF0000), OPEN_BUS_BYTE);
    }

    #[test]
    fn rom_write_is_dropped() {
        let mut bus = test_bus();
        bus.write_u8(0xF6000, 0x55);
        assert_eq!(bus.read_u8(0xF6000), 0x00);
    }

    #[test]
    fn address_wraps_at_20_bits() {
        let mut bus = test_bus();
        bus.write_u8(0x0000F, 0x77);
        assert_eq!(bus.read_u8(0x10000F), 0x77);
    }

    #[test]
    fn port_round_trip() {
        let mut bus = test_bus();
        bus.attach_io_device(Box::new(ScratchPort { port: 0x60, latch: 0 }))
            .unwrap();
        bus.io_write_u8(0x60, 0x42);
        assert_eq!(bus.io_read_u8(0x60), 0x42);
    }

    #[test]
    fn duplicate_port_refused() {
        let mut bus = test_bus();
        bus.attach_io_device(Box::new(ScratchPort { port: 0x60, latch: 0 }))
            .unwrap();
        let result = bus.attach_io_device(Box::new(ScratchPort { port: 0x60, latch: 0 }));
        assert!(matches!(result, Err(BusError::PortInUse(0x60))));
    }

    #[test]
    fn unregistered_port_reads_zero() {
        let mut bus = test_bus();
        assert_eq!(bus.io_read_u8(0x3F8), NO_IO_BYTE);
    }
}
