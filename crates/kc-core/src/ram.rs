//! System-wide flat RAM and power-on initialisation.

use rand::Rng;
use serde::Deserialize;

/// Power-on content of RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RamInit {
    /// All bytes zero.
    #[default]
    Zero,
    /// Random bytes, like real DRAM/SRAM after power-up.
    Random,
}

impl RamInit {
    /// Overwrite `buf` with the power-on pattern.
    pub fn apply(self, buf: &mut [u8]) {
        match self {
            Self::Zero => buf.fill(0),
            Self::Random => rand::thread_rng().fill(buf),
        }
    }
}

/// Flat 64 KiB RAM owned by the system, used for the primary, non-banked
/// RAM region of a hardware model.
pub trait MainRam: Send {
    fn read_ram(&self, addr: u16) -> u8;

    fn write_ram(&mut self, addr: u16, value: u8);

    /// Re-initialise the whole store.
    fn fill(&mut self, init: RamInit);
}

/// Heap-backed [`MainRam`].
pub struct FlatRam {
    data: Box<[u8]>,
}

impl FlatRam {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; 0x1_0000].into_boxed_slice(),
        }
    }
}

impl Default for FlatRam {
    fn default() -> Self {
        Self::new()
    }
}

impl MainRam for FlatRam {
    fn read_ram(&self, addr: u16) -> u8 {
        self.data[usize::from(addr)]
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        self.data[usize::from(addr)] = value;
    }

    fn fill(&mut self, init: RamInit) {
        init.apply(&mut self.data);
    }
}
