//! AC1 keyboard.
//!
//! The keyboard delivers a 7-bit ASCII code with bit 7 as the strobe to
//! PIO port A. The latched code is shared with the UI thread as a
//! one-row matrix and handed to the PIO on the emulation thread.

use kc_core::{InputMatrix, InputTarget, LogicalKey, Modifiers};

/// Strobe bit set while a key is held.
const STROBE: u8 = 0x80;

fn control_code(key: LogicalKey) -> Option<u8> {
    match key {
        LogicalKey::Left | LogicalKey::Backspace => Some(0x08),
        LogicalKey::Right => Some(0x09),
        LogicalKey::Down => Some(0x0A),
        LogicalKey::Up => Some(0x0B),
        LogicalKey::Enter => Some(0x0D),
        LogicalKey::Space => Some(0x20),
        LogicalKey::Delete => Some(0x7F),
        _ => None,
    }
}

/// AC1 keyboard latch, shareable with the UI thread.
#[derive(Debug, Clone, Default)]
pub struct Ac1Input {
    matrix: InputMatrix<1>,
}

impl Ac1Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn latch(&self, code: u8) -> bool {
        self.matrix.update(|rows| {
            rows[0] = code | STROBE;
            true
        })
    }

    /// Latched value if it changed since the last call.
    pub fn take_latch(&self) -> Option<u8> {
        self.matrix
            .take_changed()
            .then(|| self.matrix.snapshot()[0])
    }

    /// Current latch value.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.matrix.snapshot()[0]
    }

    pub fn reset(&self) {
        self.matrix.clear();
    }
}

impl InputTarget for Ac1Input {
    fn apply_key(&self, key: LogicalKey, _mods: Modifiers) -> bool {
        control_code(key).is_some_and(|code| self.latch(code))
    }

    fn apply_char(&self, ch: char) -> bool {
        match u8::try_from(ch) {
            Ok(code @ 0x01..=0x7E) => self.latch(code),
            _ => false,
        }
    }

    fn release_keys(&self) {
        self.matrix.clear();
    }
}
