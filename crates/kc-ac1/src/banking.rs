//! AC1 address decoding.
//!
//! Which store answers an access depends on the bank-control registers and
//! on the hardware variant. Resolution walks a fixed priority list and the
//! first match wins:
//!
//! | Priority | Condition                         | Range         | Store          |
//! |----------|-----------------------------------|---------------|----------------|
//! | 1        | SCCH, full window (read/write en.) | $0000-$FFFF   | extended RAM   |
//! | 2        | SCCH, 32K window                  | $4000-$BFFF   | extended RAM   |
//! | 3        | SCCH, GS-BASIC                    | $4000-$5FFF   | GS-BASIC ROM   |
//! | 4        | SCCH, ROM disk                    | $C000-$FFFF   | ROM disk       |
//! | 5        | SCCH, program X                   | $E000-$FFFF   | program-X ROM  |
//! | 6        | lower DRAM off                    | $0000-$1FFF   | monitor, mini-BASIC, video RAM, static RAM |
//! | 7        | not 64×16                         | $0000-$FFFF   | main RAM       |
//!
//! Anything left over is open bus. The full window only serves data reads;
//! instruction fetches go through the rest of the list.

use log::debug;

/// Bank-control registers (ports $14, $15 and $1C-$1F).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankState {
    /// DRAM instead of ROM and static RAM in the lowest 8 KiB.
    pub lower_dram: bool,
    pub romdisk: bool,
    /// ROM-disk address line A15.
    pub romdisk_a15: bool,
    pub program_x: bool,
    pub gs_basic: bool,
    /// Extended RAM visible at $4000-$BFFF.
    pub ext_32k: bool,
    /// Invert A15 inside the 32K window.
    pub ext_neg_a15: bool,
    /// Data reads from the whole address space go to extended RAM.
    pub ext_read: bool,
    /// Writes to the whole address space go to extended RAM.
    pub ext_write: bool,
    /// Extended RAM address bits 16-19.
    pub ext_page: u32,
}

impl BankState {
    /// SCCH ROM control, port $14. The lower-DRAM bit can only be set here.
    pub fn write_rom_control(&mut self, value: u8) {
        self.program_x = value & 0x01 != 0;
        self.gs_basic = value & 0x02 != 0;
        self.romdisk = value & 0x08 != 0;
        self.romdisk_a15 = value & 0x20 != 0;
        if value & 0x04 != 0 {
            self.lower_dram = true;
        }
        debug!("AC1 ROM control {value:02X}h: {self:?}");
    }

    /// SCCH extended RAM control, port $15.
    pub fn write_ram_control(&mut self, value: u8) {
        self.ext_page = (u32::from(value) << 16) & 0xF_0000;
        self.ext_neg_a15 = value & 0x10 != 0;
        self.ext_32k = value & 0x20 != 0;
        self.ext_read = value & 0x40 != 0;
        self.ext_write = value & 0x80 != 0;
        debug!("AC1 RAM control {value:02X}h: {self:?}");
    }

    /// Lower DRAM switch, ports $1C-$1F.
    pub fn set_lower_dram(&mut self, enabled: bool) {
        if enabled != self.lower_dram {
            debug!("AC1 lower DRAM {}", if enabled { "on" } else { "off" });
        }
        self.lower_dram = enabled;
    }
}

/// Fixed properties of one machine instance that affect decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// SCCH extensions fitted.
    pub scch: bool,
    /// Main DRAM fitted (every variant except 64×16).
    pub main_ram: bool,
    /// Size of static RAM and of video RAM.
    pub sram_len: usize,
    /// Length of the monitor image at $0000.
    pub monitor_len: usize,
    /// Length of the mini-BASIC image at $0800.
    pub mini_basic_len: usize,
}

/// Kind of bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Opcode fetch (M1).
    Fetch,
    Read,
    Write,
}

/// The store and offset an access resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Offset into the 1 MiB extended RAM.
    Extended(u32),
    GsBasic(u16),
    RomDisk(u16),
    ProgramX(u16),
    Monitor(u16),
    MiniBasic(u16),
    VideoRam(u16),
    StaticRam(u16),
    MainRam(u16),
    /// Open bus: reads $FF, writes are ignored.
    Unmapped,
}

impl Location {
    /// Can the CPU write here?
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Self::Extended(_) | Self::VideoRam(_) | Self::StaticRam(_) | Self::MainRam(_)
        )
    }
}

/// Size of the SCCH extended RAM.
pub const EXTENDED_RAM_SIZE: usize = 0x10_0000;

/// Resolve `addr` for an access of the given kind.
#[must_use]
pub fn resolve(banks: &BankState, layout: &Layout, addr: u16, kind: AccessKind) -> Location {
    if layout.scch
        && let Some(location) = resolve_scch(banks, addr, kind)
    {
        return location;
    }
    if !banks.lower_dram && addr < 0x2000 {
        return resolve_lower(layout, addr, kind);
    }
    if layout.main_ram {
        Location::MainRam(addr)
    } else {
        Location::Unmapped
    }
}

fn resolve_scch(banks: &BankState, addr: u16, kind: AccessKind) -> Option<Location> {
    let full_window = match kind {
        AccessKind::Fetch => false,
        AccessKind::Read => banks.ext_read,
        AccessKind::Write => banks.ext_write,
    };
    if full_window {
        return Some(Location::Extended(banks.ext_page | u32::from(addr)));
    }
    if banks.ext_32k && (0x4000..0xC000).contains(&addr) {
        let mut offset = banks.ext_page | u32::from(addr);
        if banks.ext_neg_a15 {
            offset ^= 0x8000;
        }
        return Some(Location::Extended(offset));
    }
    if banks.gs_basic && (0x4000..0x6000).contains(&addr) {
        return Some(Location::GsBasic(addr - 0x4000));
    }
    if banks.romdisk && addr >= 0xC000 {
        let mut offset = addr - 0xC000;
        if banks.program_x {
            offset |= 0x4000;
        }
        if banks.romdisk_a15 {
            offset |= 0x8000;
        }
        return Some(Location::RomDisk(offset));
    }
    if banks.program_x && addr >= 0xE000 {
        return Some(Location::ProgramX(addr - 0xE000));
    }
    None
}

/// Lowest 8 KiB with lower DRAM switched off. Writes pass through the
/// ROMs to the RAM below them.
fn resolve_lower(layout: &Layout, addr: u16, kind: AccessKind) -> Location {
    let index = usize::from(addr);
    if kind != AccessKind::Write {
        if index < layout.monitor_len {
            return Location::Monitor(addr);
        }
        if index >= 0x0800 && index - 0x0800 < layout.mini_basic_len {
            return Location::MiniBasic(addr - 0x0800);
        }
    }
    match addr {
        0x1000..=0x17FF if index - 0x1000 < layout.sram_len => Location::VideoRam(addr - 0x1000),
        0x1800..=0x1FFF if index - 0x1800 < layout.sram_len => Location::StaticRam(addr - 0x1800),
        _ => Location::Unmapped,
    }
}
