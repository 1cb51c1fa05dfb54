//! Trait for components driven by executed CPU clock cycles.

use crate::Ticks;

/// A component advanced by the CPU clock.
///
/// The CPU engine calls [`tick_n`](Tickable::tick_n) once per executed
/// instruction with the number of elapsed clock cycles (including any wait
/// states the bus inserted). Components keep their own sub-line or
/// prescaler accumulators and must never block.
pub trait Tickable {
    fn tick_n(&mut self, ticks: Ticks);

    /// Advance by a single clock cycle.
    fn tick(&mut self) {
        self.tick_n(Ticks::new(1));
    }
}
