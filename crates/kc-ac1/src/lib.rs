//! AC1 hardware model.
//!
//! The "Amateurcomputer 1": a Z80 with 64×16 or 64×32 character video RAM,
//! a CTC and a PIO (keyboard on port A, cassette and loudspeaker on port
//! B). The SCCH monitors add a 1 MiB extended RAM, a ROM disk, a
//! program-X ROM and GS-BASIC, all switched in through control ports.

mod ac1;
pub mod banking;
mod config;
mod keyboard;
mod memory;
pub mod video;

pub use ac1::{Ac1, DEFAULT_KHZ};
pub use banking::{AccessKind, BankState, Layout, Location};
pub use config::{Ac1Config, Monitor, slots};
pub use keyboard::Ac1Input;
pub use memory::{Ac1Memory, RomImages};
