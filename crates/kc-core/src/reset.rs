/// Reset depth requested by the collaborator driving the machine.
///
/// The CPU engine quiesces before calling `reset`; no bus access may be in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetLevel {
    /// Power cycle: ROM images are (re)loaded and RAM is re-initialised.
    PowerOn,
    /// Reset button with full peripheral reset. RAM survives.
    ColdReset,
    /// Soft reset. RAM survives, peripherals keep part of their state.
    WarmReset,
}

impl ResetLevel {
    /// Do peripheral chips get their full (power-up) reset at this level?
    #[must_use]
    pub fn is_cold(self) -> bool {
        matches!(self, Self::PowerOn | Self::ColdReset)
    }
}
