//! AC1 model configuration.

use serde::Deserialize;

/// Names of the built-in images in the host's ROM cache.
pub mod slots {
    pub const MONITOR_31_64X16: &str = "ac1/mon_31_64x16";
    pub const MONITOR_31_64X32: &str = "ac1/mon_31_64x32";
    pub const MONITOR_SCCH_80: &str = "ac1/scchmon_80";
    pub const MONITOR_SCCH_1088: &str = "ac1/scchmon_1088";
    pub const MINI_BASIC: &str = "ac1/minibasic";
    pub const GS_BASIC: &str = "ac1/gsbasic";
    pub const FONT_U402: &str = "ac1/u402font";
    pub const FONT_CCD: &str = "ac1/ccdfont";
    pub const FONT_SCCH: &str = "ac1/scchfont";
}

/// Monitor program, which also fixes the hardware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Monitor {
    /// Monitor 3.1 on the original 64×16 video board.
    #[serde(rename = "3.1_64x16")]
    Mon31_64x16,
    /// Monitor 3.1 with the 64×32 video extension.
    #[default]
    #[serde(rename = "3.1_64x32")]
    Mon31_64x32,
    #[serde(rename = "SCCH8.0")]
    Scch80,
    #[serde(rename = "SCCH10/88")]
    Scch1088,
}

impl Monitor {
    /// Original 64×16 hardware: 1 KiB static and video RAM, no DRAM.
    #[must_use]
    pub fn is_64x16(self) -> bool {
        self == Self::Mon31_64x16
    }

    /// SCCH extensions (extended RAM, ROM disk, program X, GS-BASIC).
    #[must_use]
    pub fn is_scch(self) -> bool {
        matches!(self, Self::Scch80 | Self::Scch1088)
    }

    #[must_use]
    pub fn rom_slot(self) -> &'static str {
        match self {
            Self::Mon31_64x16 => slots::MONITOR_31_64X16,
            Self::Mon31_64x32 => slots::MONITOR_31_64X32,
            Self::Scch80 => slots::MONITOR_SCCH_80,
            Self::Scch1088 => slots::MONITOR_SCCH_1088,
        }
    }

    #[must_use]
    pub fn font_slot(self) -> &'static str {
        match self {
            Self::Mon31_64x16 => slots::FONT_U402,
            Self::Mon31_64x32 => slots::FONT_CCD,
            Self::Scch80 | Self::Scch1088 => slots::FONT_SCCH,
        }
    }

    /// Size of the static RAM and of the video RAM.
    #[must_use]
    pub fn sram_len(self) -> usize {
        if self.is_64x16() { 0x0400 } else { 0x0800 }
    }
}

/// Configuration for creating an AC1 instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ac1Config {
    pub monitor: Monitor,
    /// Program-X ROM image (SCCH only).
    pub program_x_file: Option<String>,
    /// ROM-disk image (SCCH only).
    pub romdisk_file: Option<String>,
    /// Character generator replacing the monitor's built-in font.
    pub font_file: Option<String>,
}
