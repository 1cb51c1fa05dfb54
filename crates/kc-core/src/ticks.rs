//! CPU clock cycle counts.

/// A count of CPU clock cycles (T-states).
///
/// Hardware models are notified in these units after every executed
/// instruction, so a single notification is small (4-23 on a Z80), but
/// totals across a session grow without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u32> for Ticks {
    fn from(count: u32) -> Self {
        Self(u64::from(count))
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
