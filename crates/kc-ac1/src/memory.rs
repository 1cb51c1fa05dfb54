//! AC1 memory subsystem: the stores behind [`resolve`].

use std::sync::Arc;

use kc_core::{MainRam, OPEN_BUS, RamInit};

use crate::banking::{AccessKind, BankState, EXTENDED_RAM_SIZE, Layout, Location, resolve};
use crate::config::Monitor;

/// ROM images mapped into the address space. `None` leaves the range open.
#[derive(Debug, Clone, Default)]
pub struct RomImages {
    pub monitor: Option<Arc<[u8]>>,
    pub mini_basic: Option<Arc<[u8]>>,
    pub gs_basic: Option<Arc<[u8]>>,
    pub program_x: Option<Arc<[u8]>>,
    pub romdisk: Option<Arc<[u8]>>,
}

fn image_len(image: Option<&Arc<[u8]>>) -> usize {
    image.map_or(0, |image| image.len())
}

fn rom_byte(image: Option<&Arc<[u8]>>, offset: u16) -> u8 {
    image
        .and_then(|image| image.get(usize::from(offset)))
        .copied()
        .unwrap_or(OPEN_BUS)
}

/// All AC1 memory: ROMs, static and video RAM, the SCCH extended RAM and
/// the system-wide main RAM.
pub struct Ac1Memory {
    pub banks: BankState,
    layout: Layout,
    roms: RomImages,
    static_ram: Box<[u8]>,
    video_ram: Box<[u8]>,
    /// Empty without SCCH extensions.
    extended: Box<[u8]>,
    main: Box<dyn MainRam>,
}

impl Ac1Memory {
    #[must_use]
    pub fn new(monitor: Monitor, main: Box<dyn MainRam>) -> Self {
        let sram_len = monitor.sram_len();
        let extended_len = if monitor.is_scch() { EXTENDED_RAM_SIZE } else { 0 };
        Self {
            banks: BankState::default(),
            layout: Layout {
                scch: monitor.is_scch(),
                main_ram: !monitor.is_64x16(),
                sram_len,
                monitor_len: 0,
                mini_basic_len: 0,
            },
            roms: RomImages::default(),
            static_ram: vec![0; sram_len].into_boxed_slice(),
            video_ram: vec![0; sram_len].into_boxed_slice(),
            extended: vec![0; extended_len].into_boxed_slice(),
            main,
        }
    }

    /// Replace the ROM images.
    pub fn set_roms(&mut self, roms: RomImages) {
        self.layout.monitor_len = image_len(roms.monitor.as_ref());
        self.layout.mini_basic_len = image_len(roms.mini_basic.as_ref());
        self.roms = roms;
    }

    #[must_use]
    pub fn roms(&self) -> &RomImages {
        &self.roms
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Where an access would go with the current bank registers.
    #[must_use]
    pub fn location(&self, addr: u16, kind: AccessKind) -> Location {
        resolve(&self.banks, &self.layout, addr, kind)
    }

    /// Read a byte. Reading has no side effects on the AC1.
    #[must_use]
    pub fn read(&self, addr: u16, fetch: bool) -> u8 {
        let kind = if fetch { AccessKind::Fetch } else { AccessKind::Read };
        match self.location(addr, kind) {
            Location::Extended(offset) => self.extended[offset as usize],
            Location::GsBasic(offset) => rom_byte(self.roms.gs_basic.as_ref(), offset),
            Location::RomDisk(offset) => rom_byte(self.roms.romdisk.as_ref(), offset),
            Location::ProgramX(offset) => rom_byte(self.roms.program_x.as_ref(), offset),
            Location::Monitor(offset) => rom_byte(self.roms.monitor.as_ref(), offset),
            Location::MiniBasic(offset) => rom_byte(self.roms.mini_basic.as_ref(), offset),
            Location::VideoRam(offset) => self.video_ram[usize::from(offset)],
            Location::StaticRam(offset) => self.static_ram[usize::from(offset)],
            Location::MainRam(addr) => self.main.read_ram(addr),
            Location::Unmapped => OPEN_BUS,
        }
    }

    /// Write a byte; returns whether it was stored.
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        match self.location(addr, AccessKind::Write) {
            Location::Extended(offset) => self.extended[offset as usize] = value,
            Location::VideoRam(offset) => self.video_ram[usize::from(offset)] = value,
            Location::StaticRam(offset) => self.static_ram[usize::from(offset)] = value,
            Location::MainRam(addr) => self.main.write_ram(addr, value),
            _ => return false,
        }
        true
    }

    /// Character codes of the screen, stored backwards from the end.
    #[must_use]
    pub fn video_ram(&self) -> &[u8] {
        &self.video_ram
    }

    /// Power-on RAM contents. Video RAM always comes up random.
    pub fn power_on(&mut self, init: RamInit) {
        init.apply(&mut self.static_ram);
        RamInit::Random.apply(&mut self.video_ram);
        init.apply(&mut self.extended);
        self.main.fill(init);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_core::FlatRam;

    fn make_memory(monitor: Monitor) -> Ac1Memory {
        let mut memory = Ac1Memory::new(monitor, Box::new(FlatRam::new()));
        memory.set_roms(RomImages {
            monitor: Some(Arc::from(vec![0x31; 0x800])),
            gs_basic: Some(Arc::from(vec![0x65; 0x100])),
            ..RomImages::default()
        });
        memory
    }

    #[test]
    fn lower_block() {
        let mut memory = make_memory(Monitor::Mon31_64x32);
        assert_eq!(memory.read(0x0000, true), 0x31);
        assert!(!memory.write(0x0000, 0x00));
        assert_eq!(memory.read(0x0800, false), 0xFF, "no mini-BASIC image");

        assert!(memory.write(0x1000, 0x41));
        assert!(memory.write(0x1FFF, 0x42));
        assert_eq!(memory.read(0x1000, false), 0x41);
        assert_eq!(memory.read(0x1FFF, false), 0x42);
        assert_eq!(memory.video_ram()[0], 0x41);
    }

    #[test]
    fn main_ram_only_with_dram() {
        let mut memory = make_memory(Monitor::Mon31_64x32);
        assert!(memory.write(0x8000, 0x12));
        assert_eq!(memory.read(0x8000, false), 0x12);

        let mut memory = make_memory(Monitor::Mon31_64x16);
        assert!(!memory.write(0x8000, 0x12));
        assert_eq!(memory.read(0x8000, false), 0xFF);
    }

    #[test]
    fn extended_ram_pages_are_separate() {
        let mut memory = make_memory(Monitor::Scch80);
        memory.banks.write_ram_control(0x20); // 32K window, page 0
        assert!(memory.write(0x4000, 0xAA));
        memory.banks.write_ram_control(0x21); // page 1
        assert_eq!(memory.read(0x4000, false), 0x00);
        assert!(memory.write(0x4000, 0xBB));
        memory.banks.write_ram_control(0x20);
        assert_eq!(memory.read(0x4000, false), 0xAA);

        // Main RAM below the window is untouched
        memory.banks.write_ram_control(0x00);
        assert_eq!(memory.read(0x4000, false), 0x00);
    }

    #[test]
    fn short_rom_overlay_reads_open_bus_past_its_end() {
        let mut memory = make_memory(Monitor::Scch80);
        memory.banks.write_rom_control(0x02);
        assert_eq!(memory.read(0x40FF, false), 0x65);
        assert_eq!(memory.read(0x4100, false), 0xFF);
        assert!(!memory.write(0x4000, 0x00));
    }

    #[test]
    fn power_on_clears_static_ram() {
        let mut memory = make_memory(Monitor::Mon31_64x32);
        memory.write(0x1800, 0x99);
        memory.write(0x9000, 0x99);
        memory.power_on(RamInit::Zero);
        assert_eq!(memory.read(0x1800, false), 0x00);
        assert_eq!(memory.read(0x9000, false), 0x00);
    }
}
