//! CPU speed shared between the UI and the emulation thread.
//!
//! The UI changes the emulated clock frequency at any time; the emulation
//! thread picks the change up on its next clock notification. The value is
//! a single atomic word, so no lock is held on the hot path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Horizontal line rate of a PAL raster in kHz (64 µs per line).
pub const LINE_RATE_KHZ: f64 = 15.625;

/// CPU clock cycles per raster line at the given clock frequency.
///
/// `round(khz / 15.625)`, never less than 1.
#[must_use]
pub fn clocks_per_line(khz: u32) -> u32 {
    let clocks = (f64::from(khz) / LINE_RATE_KHZ).round() as u32;
    clocks.max(1)
}

/// Writer side: cloneable handle to the emulated CPU frequency.
#[derive(Debug, Clone)]
pub struct SpeedControl {
    khz: Arc<AtomicU32>,
}

impl SpeedControl {
    #[must_use]
    pub fn new(khz: u32) -> Self {
        Self {
            khz: Arc::new(AtomicU32::new(khz)),
        }
    }

    /// Change the emulated CPU frequency.
    pub fn set_khz(&self, khz: u32) {
        self.khz.store(khz, Ordering::Relaxed);
    }

    #[must_use]
    pub fn khz(&self) -> u32 {
        self.khz.load(Ordering::Relaxed)
    }
}

/// Reader side: remembers the last frequency the emulation thread applied.
#[derive(Debug)]
pub struct SpeedTracker {
    control: SpeedControl,
    applied: u32,
    fallback: u32,
}

impl SpeedTracker {
    /// Track `control`, substituting `fallback` for a zero frequency.
    #[must_use]
    pub fn new(control: SpeedControl, fallback: u32) -> Self {
        Self {
            control,
            applied: 0,
            fallback,
        }
    }

    /// The frequency changed since the last poll? Returns the new value.
    pub fn poll(&mut self) -> Option<u32> {
        let mut khz = self.control.khz();
        if khz == 0 {
            khz = self.fallback;
        }
        if khz == self.applied {
            None
        } else {
            self.applied = khz;
            Some(khz)
        }
    }

    /// The writer handle this tracker follows.
    #[must_use]
    pub fn control(&self) -> &SpeedControl {
        &self.control
    }
}
