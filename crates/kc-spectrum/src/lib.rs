//! ZX Spectrum 48K hardware model.
//!
//! Memory map, ULA raster and contention, keyboard, Kempston joystick and
//! the EAR/MIC line, driven by an external Z80 engine through the
//! `kc-core` bus and tick contracts.

mod bus;
mod config;
mod ear;
pub mod keyboard;
mod memory;
pub mod screen_text;
mod spectrum;

pub use bus::SpectrumBus;
pub use config::{ROM_SLOT, SpectrumConfig};
pub use ear::EarLine;
pub use keyboard::SpectrumInput;
pub use memory::{Memory48K, ROM_SIZE};
pub use spectrum::Spectrum;
