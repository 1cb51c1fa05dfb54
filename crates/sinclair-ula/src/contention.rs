//! Memory contention timing.
//!
//! While the ULA fetches display bytes it holds the CPU off contended RAM.
//! The delay depends only on where the beam is within the current line,
//! so it is computed from the line's T-state counter. The constants differ
//! between ULA revisions and are kept as data.

/// Contention parameters of one ULA revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentionTiming {
    /// Line width the phase is normalised to, in T-states.
    pub reference_line_tstates: u32,
    /// Phase of the first display fetch, minus one.
    pub phase_offset: i32,
    /// Length of the display-fetch window in T-states.
    pub window: i32,
    /// The delay pattern repeats with this period.
    pub period: i32,
    /// Delay at the start of each period.
    pub max_delay: i32,
    /// First raster line with display fetches.
    pub first_line: u16,
    /// Last raster line with display fetches (inclusive).
    pub last_line: u16,
    /// Contended address range `start..end`.
    pub start: u16,
    pub end: u16,
}

/// 48K ULA: fetches during T-states 0-127 of lines 64-255, delay pattern
/// `6, 5, 4, 3, 2, 1, 0, 0`.
pub const SPECTRUM_48K: ContentionTiming = ContentionTiming {
    reference_line_tstates: 224,
    phase_offset: 63,
    window: 128,
    period: 8,
    max_delay: 6,
    first_line: 64,
    last_line: 255,
    start: 0x4000,
    end: 0x8000,
};

impl ContentionTiming {
    /// Is `addr` in contended RAM?
    #[must_use]
    pub fn is_contended(&self, addr: u16) -> bool {
        (self.start..self.end).contains(&addr)
    }

    /// Is `line` inside the display-fetch band?
    #[must_use]
    pub fn is_fetch_line(&self, line: u16) -> bool {
        (self.first_line..=self.last_line).contains(&line)
    }

    /// Wait states for an access `diff` T-states into the current
    /// instruction, with the line counter at `line_tstate` out of
    /// `tstates_per_line`.
    ///
    /// Pure in its inputs; never more than `max_delay`.
    #[must_use]
    pub fn wait_states(&self, line_tstate: u32, tstates_per_line: u32, diff: u32) -> u8 {
        let position = f64::from(line_tstate + diff) / f64::from(tstates_per_line.max(1));
        let phase = (position * f64::from(self.reference_line_tstates)).round() as i32
            - self.phase_offset;
        if (0..self.window).contains(&phase) {
            let wait = self.max_delay - phase % self.period;
            if wait > 0 {
                return wait as u8;
            }
        }
        0
    }
}
