//! One-bit audio lines (cassette in/out, loudspeaker).
//!
//! Peripheral port handlers read and write phases; sampling, mixing and
//! device output belong to the host.

/// Host side of the cassette and loudspeaker lines.
pub trait AudioPort: Send {
    /// Current cassette input phase, or `None` when no input is running
    /// (paused or not connected).
    fn read_phase(&mut self) -> Option<bool>;

    /// New output phase.
    fn write_phase(&mut self, phase: bool);

    /// Is sound output (as opposed to cassette recording) selected?
    fn sound_out_enabled(&self) -> bool {
        true
    }

    /// Is the built-in loudspeaker emulated (instead of the cassette line)?
    fn loudspeaker_enabled(&self) -> bool {
        false
    }
}

/// Audio port with nothing attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPort for NullAudio {
    fn read_phase(&mut self) -> Option<bool> {
        None
    }

    fn write_phase(&mut self, _phase: bool) {}
}
