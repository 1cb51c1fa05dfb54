//! Text recognition on the Spectrum bitmap.
//!
//! The 48K ROM draws text with the 8×8 font at $3D00 (codes $20-$7F). A
//! cell is recognised by comparing its eight bitmap bytes with each glyph,
//! first as drawn and then inverted (cursor or INVERSE 1).

use crate::memory::Memory48K;

/// Text cells per row.
pub const COLUMNS: usize = 32;
/// Text rows.
pub const ROWS: usize = 24;

const CHARSET: usize = 0x3D00;
const FIRST_CODE: u8 = 0x20;
const LAST_CODE: u8 = 0x7F;

/// Bitmap address of pixel row 0 of text cell `(col, row)`.
fn cell_addr(col: usize, row: usize) -> u16 {
    let row = row as u16;
    0x4000 | ((row << 8) & 0x1800) | ((row << 5) & 0x00E0) | col as u16
}

fn glyph(rom: &[u8], code: u8) -> Option<&[u8]> {
    let start = CHARSET + usize::from(code - FIRST_CODE) * 8;
    rom.get(start..start + 8)
}

fn decode(code: u8) -> char {
    match code {
        0x60 => '£',
        0x7F => '©',
        _ => char::from(code),
    }
}

/// Character shown at `(col, row)`, or `None` if the cell matches no ROM
/// glyph or no ROM is mapped.
#[must_use]
pub fn char_at(memory: &Memory48K, col: usize, row: usize) -> Option<char> {
    if col >= COLUMNS || row >= ROWS {
        return None;
    }
    let rom = memory.rom()?;
    let base = cell_addr(col, row);
    let mut cell = [0u8; 8];
    for (line, byte) in cell.iter_mut().enumerate() {
        *byte = memory.peek(base + (line as u16) * 0x100);
    }
    for inverted in [false, true] {
        let found = (FIRST_CODE..=LAST_CODE).find(|&code| {
            glyph(rom, code).is_some_and(|glyph| {
                glyph
                    .iter()
                    .zip(&cell)
                    .all(|(&g, &c)| if inverted { !g == c } else { g == c })
            })
        });
        if let Some(code) = found {
            return Some(decode(code));
        }
    }
    None
}
