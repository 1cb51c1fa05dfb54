//! ZX Spectrum keyboard.
//!
//! The Spectrum keyboard is an 8×5 matrix of half-rows, read via port $FE.
//! The high byte of the port address selects which half-rows to scan: each
//! cleared bit (A8-A15) enables one half-row. Multiple rows can be scanned
//! simultaneously by clearing multiple address bits.
//!
//! # Half-row layout
//!
//! | Addr bit | Row | Keys (bit 0-4)                |
//! |----------|-----|-------------------------------|
//! | A8       | 0   | Shift, Z, X, C, V            |
//! | A9       | 1   | A, S, D, F, G                |
//! | A10      | 2   | Q, W, E, R, T                |
//! | A11      | 3   | 1, 2, 3, 4, 5                |
//! | A12      | 4   | 0, 9, 8, 7, 6                |
//! | A13      | 5   | P, O, I, U, Y                |
//! | A14      | 6   | Enter, L, K, J, H            |
//! | A15      | 7   | Space, Sym, M, N, B          |
//!
//! A pressed key reads as 0 (active low).

use kc_core::input::{joystick, set_from_table};
use kc_core::{InputMatrix, InputTarget, LogicalKey, Modifiers};

/// Number of half-rows.
pub const ROWS: usize = 8;

type KeyTable = [[Option<char>; 5]; ROWS];

const CAPS_SHIFT_ROW: usize = 0;
const CAPS_SHIFT: u8 = 0x01;
const SYMBOL_SHIFT_ROW: usize = 7;
const SYMBOL_SHIFT: u8 = 0x02;

/// Unshifted legends.
const KEYS_NORMAL: KeyTable = [
    [None, Some('z'), Some('x'), Some('c'), Some('v')],
    [Some('a'), Some('s'), Some('d'), Some('f'), Some('g')],
    [Some('q'), Some('w'), Some('e'), Some('r'), Some('t')],
    [Some('1'), Some('2'), Some('3'), Some('4'), Some('5')],
    [Some('0'), Some('9'), Some('8'), Some('7'), Some('6')],
    [Some('p'), Some('o'), Some('i'), Some('u'), Some('y')],
    [Some('\r'), Some('l'), Some('k'), Some('j'), Some('h')],
    [Some(' '), None, Some('m'), Some('n'), Some('b')],
];

/// Red symbol-shift legends.
const KEYS_SYMBOL: KeyTable = [
    [None, Some(':'), Some('£'), Some('?'), Some('/')],
    [Some('~'), Some('|'), Some('\\'), Some('{'), Some('}')],
    [None, None, None, Some('<'), Some('>')],
    [Some('!'), Some('@'), Some('#'), Some('$'), Some('%')],
    [Some('_'), Some(')'), Some('('), Some('\''), Some('&')],
    [Some('"'), Some(';'), None, Some(']'), Some('[')],
    [Some('\r'), Some('='), Some('+'), Some('-'), Some('^')],
    [Some(' '), None, Some('.'), Some(','), Some('*')],
];

/// Port $FE keyboard bits for the half-rows selected by `port`.
///
/// Starts from $FF and clears the bits of every pressed key in each row
/// whose address line is low.
#[must_use]
pub fn read_rows(rows: &[u8; ROWS], port: u16) -> u8 {
    let selected = !(port >> 8) as u8;
    rows.iter()
        .enumerate()
        .filter(|&(i, _)| selected & (1 << i) != 0)
        .fold(0xFF, |value, (_, &row)| value & !row)
}

/// Kempston interface bits (active high): right, left, down, up, fire.
#[must_use]
pub fn kempston(mask: u8) -> u8 {
    let mut value = 0;
    if mask & joystick::RIGHT != 0 {
        value |= 0x01;
    }
    if mask & joystick::LEFT != 0 {
        value |= 0x02;
    }
    if mask & joystick::DOWN != 0 {
        value |= 0x04;
    }
    if mask & joystick::UP != 0 {
        value |= 0x08;
    }
    if mask & joystick::BUTTONS != 0 {
        value |= 0x10;
    }
    value
}

fn caps_shift(rows: &mut [u8; ROWS]) {
    rows[CAPS_SHIFT_ROW] |= CAPS_SHIFT;
}

fn symbol_shift(rows: &mut [u8; ROWS]) {
    rows[SYMBOL_SHIFT_ROW] |= SYMBOL_SHIFT;
}

/// CAPS SHIFT plus one key: the Spectrum's editing and cursor keys.
fn caps_shifted(rows: &mut [u8; ROWS], row: usize, bit: u8) -> bool {
    caps_shift(rows);
    rows[row] |= bit;
    true
}

fn apply_key(rows: &mut [u8; ROWS], key: LogicalKey, mods: Modifiers) -> bool {
    if mods.ctrl {
        if mods.shift {
            // Extended mode
            caps_shift(rows);
            symbol_shift(rows);
            return true;
        }
        let found = match key {
            LogicalKey::Char(ch) if ch.is_ascii_alphanumeric() => {
                set_from_table(rows, &KEYS_NORMAL, ch.to_ascii_lowercase())
            }
            LogicalKey::Enter => set_from_table(rows, &KEYS_NORMAL, '\r'),
            LogicalKey::Space => set_from_table(rows, &KEYS_NORMAL, ' '),
            _ => false,
        };
        if found {
            symbol_shift(rows);
        }
        return found;
    }
    match key {
        LogicalKey::Function(1) => caps_shifted(rows, 3, 0x01), // EDIT
        LogicalKey::Function(2) => caps_shifted(rows, 3, 0x02), // CAPS LOCK
        LogicalKey::Function(3) => caps_shifted(rows, 3, 0x04), // TRUE VIDEO
        LogicalKey::Function(4) => caps_shifted(rows, 3, 0x08), // INV VIDEO
        LogicalKey::Function(5) => {
            caps_shift(rows);
            true
        }
        LogicalKey::Function(6) => {
            symbol_shift(rows);
            true
        }
        LogicalKey::Function(9) => caps_shifted(rows, 4, 0x02), // GRAPHICS
        LogicalKey::Backspace | LogicalKey::Delete => caps_shifted(rows, 4, 0x01),
        LogicalKey::Left => caps_shifted(rows, 3, 0x10),
        LogicalKey::Down => caps_shifted(rows, 4, 0x10),
        LogicalKey::Up => caps_shifted(rows, 4, 0x08),
        LogicalKey::Right => caps_shifted(rows, 4, 0x04),
        LogicalKey::Enter | LogicalKey::Space => {
            if mods.shift {
                caps_shift(rows);
            }
            let (row, bit) = if key == LogicalKey::Enter { (6, 0x01) } else { (7, 0x01) };
            rows[row] |= bit;
            true
        }
        // Plain characters arrive through `apply_char`
        _ => false,
    }
}

fn apply_char(rows: &mut [u8; ROWS], ch: char) -> bool {
    if set_from_table(rows, &KEYS_NORMAL, ch) {
        return true;
    }
    if ch.is_ascii_uppercase() && set_from_table(rows, &KEYS_NORMAL, ch.to_ascii_lowercase()) {
        caps_shift(rows);
        return true;
    }
    if set_from_table(rows, &KEYS_SYMBOL, ch) {
        symbol_shift(rows);
        return true;
    }
    false
}

/// Spectrum keyboard and joystick input, shareable with the UI thread.
#[derive(Debug, Clone, Default)]
pub struct SpectrumInput {
    matrix: InputMatrix<ROWS>,
}

impl SpectrumInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared matrix.
    #[must_use]
    pub fn matrix(&self) -> &InputMatrix<ROWS> {
        &self.matrix
    }

    /// Release keys and joystick.
    pub fn reset(&self) {
        self.matrix.clear();
        self.matrix.set_joystick(0);
    }
}

impl InputTarget for SpectrumInput {
    fn apply_key(&self, key: LogicalKey, mods: Modifiers) -> bool {
        self.matrix.update(|rows| apply_key(rows, key, mods))
    }

    fn apply_char(&self, ch: char) -> bool {
        self.matrix.update(|rows| apply_char(rows, ch))
    }

    fn release_keys(&self) {
        self.matrix.clear();
    }

    fn apply_joystick(&self, mask: u8) {
        self.matrix.set_joystick(mask);
    }
}
