//! Memory and I/O bus interface.

/// Value seen on an undriven data bus.
pub const OPEN_BUS: u8 = 0xFF;

/// Result of a bus read: the data byte plus any wait states the access
/// inserted into the CPU clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResult {
    pub data: u8,
    /// Extra CPU clock cycles to add before the access completes.
    pub wait: u8,
}

impl ReadResult {
    #[must_use]
    pub const fn new(data: u8) -> Self {
        Self { data, wait: 0 }
    }

    #[must_use]
    pub const fn with_wait(data: u8, wait: u8) -> Self {
        Self { data, wait }
    }
}

/// Memory and I/O bus as seen by the CPU engine.
///
/// The hardware model decodes addresses and ports, routes them to the
/// owning backing store or peripheral, and reports wait states. None of
/// these calls can fail: unmapped reads return [`OPEN_BUS`] and unmapped
/// writes are dropped.
pub trait Bus {
    /// Read a byte. `fetch` is true for the opcode fetch (M1) cycle.
    fn read(&mut self, addr: u16, fetch: bool) -> ReadResult;

    /// Write a byte. Returns the inserted wait states.
    fn write(&mut self, addr: u16, value: u8) -> u8;

    /// Read a byte without wait states or other side effects (debuggers,
    /// screen text extraction, video fetches).
    fn peek(&self, addr: u16, fetch: bool) -> u8;

    /// Read an I/O port. The full 16-bit port address is passed because
    /// some hardware decodes the high byte (keyboard half-row selection).
    fn io_read(&mut self, port: u16) -> ReadResult;

    /// Write an I/O port. Returns the inserted wait states.
    fn io_write(&mut self, port: u16, value: u8) -> u8;
}

/// A register-addressed peripheral attached to a block of I/O ports
/// (e.g. a RAM floppy on ports `$E0-$E7`). `reg` is the port offset
/// within the block.
pub trait IoDevice: Send {
    fn read_register(&mut self, reg: u8) -> u8;

    fn write_register(&mut self, reg: u8, value: u8);
}
