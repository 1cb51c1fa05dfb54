//! Spectrum memory subsystem.
//!
//! 16K OS ROM at $0000-$3FFF, the rest is the system-wide main RAM. A ROM
//! image shorter than 16K leaves its tail as open bus; with no image at all
//! the whole ROM range reads $FF.

use std::sync::Arc;

use kc_core::{MainRam, OPEN_BUS, RamInit};

/// Size of the OS ROM window.
pub const ROM_SIZE: usize = 0x4000;

/// 48K Spectrum memory: 16K ROM + 48K RAM.
///
/// Layout:
/// - $0000-$3FFF: ROM (writes ignored)
/// - $4000-$7FFF: Contended RAM (shared with ULA)
/// - $8000-$FFFF: Uncontended RAM
pub struct Memory48K {
    rom: Option<Arc<[u8]>>,
    ram: Box<dyn MainRam>,
}

impl Memory48K {
    #[must_use]
    pub fn new(ram: Box<dyn MainRam>) -> Self {
        Self { rom: None, ram }
    }

    /// Replace the OS ROM image.
    pub fn set_rom(&mut self, rom: Option<Arc<[u8]>>) {
        self.rom = rom;
    }

    #[must_use]
    pub fn rom(&self) -> Option<&[u8]> {
        self.rom.as_deref()
    }

    /// Read a byte without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        if usize::from(addr) < ROM_SIZE {
            self.rom
                .as_deref()
                .and_then(|rom| rom.get(usize::from(addr)))
                .copied()
                .unwrap_or(OPEN_BUS)
        } else {
            self.ram.read_ram(addr)
        }
    }

    /// Write a byte. ROM writes are silently ignored; returns whether the
    /// byte was stored.
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        if usize::from(addr) < ROM_SIZE {
            false
        } else {
            self.ram.write_ram(addr, value);
            true
        }
    }

    /// Re-initialise RAM (power-on).
    pub fn fill_ram(&mut self, init: RamInit) {
        self.ram.fill(init);
    }
}
