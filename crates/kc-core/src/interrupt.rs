//! Interrupt sources and the priority chain that connects them to the CPU.
//!
//! Z80-family peripherals are wired in a daisy chain: the first device in
//! the chain has the highest priority, and a device that is being serviced
//! blocks every device behind it until it sees the return-from-interrupt.
//! Sources without a completion phase (the ZX Spectrum ULA never decodes
//! RETI) clear their request on acceptance and never report themselves as
//! in service.

use crate::OPEN_BUS;

/// A unit that can request a maskable interrupt.
pub trait InterruptSource {
    /// Is an interrupt currently being requested?
    fn is_interrupt_requested(&self) -> bool;

    /// Has an interrupt been accepted but not yet finished?
    ///
    /// Sources without a completion step always return false.
    fn is_interrupt_accepted(&self) -> bool {
        false
    }

    /// Acknowledge the request. Returns the byte presented on the data bus
    /// during the acknowledge cycle (vector or opcode).
    fn interrupt_accept(&mut self) -> u8;

    /// The service routine returned (RETI). No-op for sources without a
    /// completion step.
    fn interrupt_finish(&mut self) {}
}

/// Does any source in the chain request service?
///
/// Walks `sources` in priority order. A source that is in service blocks
/// all lower-priority sources.
#[must_use]
pub fn any_requested(sources: &[&dyn InterruptSource]) -> bool {
    for source in sources {
        if source.is_interrupt_accepted() {
            return false;
        }
        if source.is_interrupt_requested() {
            return true;
        }
    }
    false
}

/// Acknowledge the highest-priority requesting source.
///
/// Returns `None` when no source may claim the cycle.
pub fn accept_first(sources: &mut [&mut dyn InterruptSource]) -> Option<u8> {
    for source in sources.iter_mut() {
        if source.is_interrupt_accepted() {
            return None;
        }
        if source.is_interrupt_requested() {
            return Some(source.interrupt_accept());
        }
    }
    None
}

/// Deliver a RETI to the highest-priority source still in service.
///
/// Returns true if a source took it.
pub fn finish_first(sources: &mut [&mut dyn InterruptSource]) -> bool {
    for source in sources.iter_mut() {
        if source.is_interrupt_accepted() {
            source.interrupt_finish();
            return true;
        }
    }
    false
}

/// Single-shot interrupt request latch for hardware with no completion
/// step.
///
/// `raise` sets the latch; `interrupt_accept` clears it and returns the
/// configured bus value. There is no in-service state, so `interrupt_finish`
/// is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptLatch {
    pending: bool,
    bus_value: u8,
}

impl InterruptLatch {
    /// A latch that presents `bus_value` during acknowledge.
    #[must_use]
    pub const fn new(bus_value: u8) -> Self {
        Self {
            pending: false,
            bus_value,
        }
    }

    pub fn raise(&mut self) {
        self.pending = true;
    }

    pub fn clear(&mut self) {
        self.pending = false;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for InterruptLatch {
    fn default() -> Self {
        Self::new(OPEN_BUS)
    }
}

impl InterruptSource for InterruptLatch {
    fn is_interrupt_requested(&self) -> bool {
        self.pending
    }

    fn interrupt_accept(&mut self) -> u8 {
        self.pending = false;
        self.bus_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Daisy-chain member with an in-service phase.
    #[derive(Default)]
    struct ChainedDevice {
        pending: bool,
        in_service: bool,
        vector: u8,
    }

    impl InterruptSource for ChainedDevice {
        fn is_interrupt_requested(&self) -> bool {
            self.pending
        }

        fn is_interrupt_accepted(&self) -> bool {
            self.in_service
        }

        fn interrupt_accept(&mut self) -> u8 {
            self.pending = false;
            self.in_service = true;
            self.vector
        }

        fn interrupt_finish(&mut self) {
            self.in_service = false;
        }
    }

    #[test]
    fn latch_clears_on_accept() {
        let mut latch = InterruptLatch::default();
        assert!(!latch.is_interrupt_requested());
        latch.raise();
        assert!(latch.is_interrupt_requested());
        assert_eq!(latch.interrupt_accept(), 0xFF);
        assert!(!latch.is_interrupt_requested());
        assert!(!latch.is_interrupt_accepted());
        latch.interrupt_finish();
        assert!(!latch.is_interrupt_requested());
    }

    #[test]
    fn first_in_chain_claims_the_cycle() {
        let mut high = ChainedDevice {
            vector: 0x10,
            ..Default::default()
        };
        let mut low = ChainedDevice {
            vector: 0x20,
            ..Default::default()
        };
        high.pending = true;
        low.pending = true;

        assert_eq!(accept_first(&mut [&mut high, &mut low]), Some(0x10));
        assert!(low.pending, "lower-priority request must stay pending");
    }

    #[test]
    fn in_service_source_blocks_lower_priority() {
        let mut high = ChainedDevice::default();
        let mut low = ChainedDevice {
            vector: 0x20,
            ..Default::default()
        };
        high.pending = true;
        accept_first(&mut [&mut high, &mut low]);

        low.pending = true;
        assert!(!any_requested(&[&high, &low]));
        assert_eq!(accept_first(&mut [&mut high, &mut low]), None);

        assert!(finish_first(&mut [&mut high, &mut low]));
        assert!(any_requested(&[&high, &low]));
        assert_eq!(accept_first(&mut [&mut high, &mut low]), Some(0x20));
    }

    #[test]
    fn finish_without_service_is_ignored() {
        let mut a = ChainedDevice::default();
        let mut latch = InterruptLatch::default();
        assert!(!finish_first(&mut [&mut a, &mut latch]));
    }
}
