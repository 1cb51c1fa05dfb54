//! EAR/MIC line as seen by bit 6 of port $FE.
//!
//! With no cassette signal, bit 6 follows the EAR output written to port
//! $FE. A 0 -> 1 change shows immediately; a 1 -> 0 change shows only after
//! a delay that grows with how long the line was high, because the input
//! stage's capacitor has to discharge first.

/// Minimum 1 -> 0 delay in T-states.
const MIN_FALL_DELAY: i32 = 180;
/// Maximum 1 -> 0 delay in T-states.
const MAX_FALL_DELAY: i32 = 2000;

/// EAR output level and its decay into the input bit.
#[derive(Debug, Clone, Copy)]
pub struct EarLine {
    phase: bool,
    /// Charges at half rate while high, discharges at full rate while low.
    delay: i32,
}

impl EarLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: true,
            delay: 0,
        }
    }

    /// New EAR output level from a port $FE write.
    pub fn set_phase(&mut self, phase: bool) {
        if phase == self.phase {
            return;
        }
        if phase {
            self.delay = 0;
        } else if self.delay < MIN_FALL_DELAY {
            self.delay = MIN_FALL_DELAY;
        }
        self.phase = phase;
    }

    #[must_use]
    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Advance by executed T-states.
    pub fn tick(&mut self, tstates: u64) {
        let tstates = tstates.min(i32::MAX as u64) as i32;
        if self.phase {
            if self.delay < MAX_FALL_DELAY {
                self.delay += tstates / 2;
            }
        } else if self.delay > 0 {
            self.delay -= tstates;
        }
    }

    /// Level seen on the input bit when no cassette signal is running.
    #[must_use]
    pub fn input_level(&self) -> bool {
        self.phase || self.delay > 0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for EarLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_is_immediate() {
        let mut ear = EarLine::new();
        ear.set_phase(false);
        ear.tick(10_000);
        assert!(!ear.input_level());
        ear.set_phase(true);
        assert!(ear.input_level());
    }

    #[test]
    fn short_high_falls_after_minimum_delay() {
        let mut ear = EarLine::new();
        ear.set_phase(false);
        assert!(ear.input_level());
        ear.tick(179);
        assert!(ear.input_level());
        ear.tick(1);
        assert!(!ear.input_level());
    }

    #[test]
    fn long_high_extends_the_delay() {
        let mut ear = EarLine::new();
        ear.tick(1000); // charges to 500
        ear.set_phase(false);
        ear.tick(499);
        assert!(ear.input_level());
        ear.tick(1);
        assert!(!ear.input_level());
    }

    #[test]
    fn charge_stops_near_maximum() {
        let mut ear = EarLine::new();
        for _ in 0..1000 {
            ear.tick(100);
        }
        assert!(ear.delay < MAX_FALL_DELAY + 50);
    }
}
