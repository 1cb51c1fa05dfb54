//! Core contracts for the hardware models.
//!
//! A CPU engine drives a hardware model exclusively through these traits:
//! every memory and I/O bus cycle goes through [`Bus`], every executed
//! instruction reports its clock cycles through [`Tickable`], and interrupts
//! are polled and acknowledged through [`InterruptSource`]. Nothing on these
//! paths can fail; out-of-range accesses resolve to open bus (`0xFF`) or a
//! silently ignored write.

mod audio;
mod bus;
pub mod input;
mod interrupt;
mod machine;
mod observable;
mod ram;
mod reset;
pub mod rom;
mod speed;
mod tickable;
mod ticks;
mod video;

pub use audio::{AudioPort, NullAudio};
pub use bus::{Bus, IoDevice, OPEN_BUS, ReadResult};
pub use input::{InputMatrix, InputTarget, LogicalKey, Modifiers};
pub use interrupt::{InterruptLatch, InterruptSource, accept_first, any_requested, finish_first};
pub use machine::{HardwareModel, Host};
pub use observable::{Observable, Value, parse_address};
pub use ram::{FlatRam, MainRam, RamInit};
pub use reset::ResetLevel;
pub use rom::{RomCache, RomError, RomLoader};
pub use speed::{LINE_RATE_KHZ, SpeedControl, SpeedTracker, clocks_per_line};
pub use tickable::Tickable;
pub use ticks::Ticks;
pub use video::VideoSource;
