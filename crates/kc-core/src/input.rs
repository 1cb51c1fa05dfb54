//! Host input: logical keys, modifiers and the shared keyboard matrix.
//!
//! The UI thread translates host key events into [`LogicalKey`]s and pushes
//! them into a hardware model through its [`InputTarget`]. The emulation
//! thread reads the same state on every keyboard port access. Both sides
//! share one [`InputMatrix`]; every read and write of the matrix holds its
//! lock, so a port read never observes a half-applied key event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A key as the host reports it, independent of the emulated keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// A printable character key.
    Char(char),
    Enter,
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    /// Function key F1..F12.
    Function(u8),
}

/// Modifier keys held while a [`LogicalKey`] was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

/// Joystick action bits as delivered by the host.
pub mod joystick {
    pub const UP: u8 = 0x01;
    pub const DOWN: u8 = 0x02;
    pub const LEFT: u8 = 0x04;
    pub const RIGHT: u8 = 0x08;
    pub const BUTTON_1: u8 = 0x10;
    pub const BUTTON_2: u8 = 0x20;
    pub const BUTTONS: u8 = BUTTON_1 | BUTTON_2;
}

/// UI-side handle for feeding host input into one hardware model.
///
/// Handles are cheap to clone behind a `Box` and safe to use from any
/// thread while the emulation runs.
pub trait InputTarget: Send + Sync {
    /// Press a key. Returns false if the model has no mapping for it.
    fn apply_key(&self, key: LogicalKey, mods: Modifiers) -> bool;

    /// Type a character (key plus whatever shift it needs). Returns false
    /// if the character cannot be produced.
    fn apply_char(&self, ch: char) -> bool;

    /// Release every key.
    fn release_keys(&self);

    /// Set the joystick action mask (see [`joystick`]). Ignored by models
    /// without a joystick interface.
    fn apply_joystick(&self, mask: u8) {
        let _ = mask;
    }
}

#[derive(Debug, Clone, Copy)]
struct MatrixState<const ROWS: usize> {
    rows: [u8; ROWS],
    joystick: u8,
}

/// Keyboard matrix shared between the UI and the emulation thread.
///
/// Each row is a bit set of pressed keys (1 = pressed). The `changed` flag
/// lets a model that latches keyboard state into a peripheral (rather than
/// scanning on every port read) pick up updates cheaply.
#[derive(Debug, Clone)]
pub struct InputMatrix<const ROWS: usize> {
    state: Arc<Mutex<MatrixState<ROWS>>>,
    changed: Arc<AtomicBool>,
}

impl<const ROWS: usize> InputMatrix<ROWS> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MatrixState {
                rows: [0; ROWS],
                joystick: 0,
            })),
            changed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MatrixState<ROWS>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a key event to the rows as one unit. If `f` returns false the
    /// matrix is left as it was.
    pub fn update(&self, f: impl FnOnce(&mut [u8; ROWS]) -> bool) -> bool {
        let mut state = self.lock();
        let mut rows = state.rows;
        if !f(&mut rows) {
            return false;
        }
        state.rows = rows;
        self.changed.store(true, Ordering::Release);
        true
    }

    /// Copy of the current rows.
    #[must_use]
    pub fn snapshot(&self) -> [u8; ROWS] {
        self.lock().rows
    }

    /// Release all keys (joystick state is kept).
    pub fn clear(&self) {
        self.lock().rows = [0; ROWS];
        self.changed.store(true, Ordering::Release);
    }

    pub fn set_joystick(&self, mask: u8) {
        self.lock().joystick = mask;
        self.changed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn joystick(&self) -> u8 {
        self.lock().joystick
    }

    /// Has the matrix changed since the last call? Resets the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// No key pressed?
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.lock().rows.iter().all(|&r| r == 0)
    }
}

impl<const ROWS: usize> Default for InputMatrix<ROWS> {
    fn default() -> Self {
        Self::new()
    }
}

/// Set the bit for `ch` in `rows` using a key table laid out as
/// `table[row][bit]`. Returns false if the table has no entry for `ch`.
pub fn set_from_table<const ROWS: usize, const COLS: usize>(
    rows: &mut [u8; ROWS],
    table: &[[Option<char>; COLS]; ROWS],
    ch: char,
) -> bool {
    for (row, keys) in rows.iter_mut().zip(table) {
        if let Some(bit) = keys.iter().position(|&k| k == Some(ch)) {
            *row |= 1 << bit;
            return true;
        }
    }
    false
}
