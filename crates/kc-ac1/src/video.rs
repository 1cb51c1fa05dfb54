//! AC1 character display.
//!
//! 64 columns of 6-pixel-wide characters. The 64×32 board draws 8-pixel
//! rows; the original 64×16 board draws each row 16 pixels high with the
//! lower half blank. Video RAM is scanned backwards: the top-left cell is
//! the last byte. Font bit `n` is pixel column `n` of the cell.

/// Display width in pixels.
pub const SCREEN_WIDTH: u32 = 384;
pub const COLUMNS: usize = 64;

const CHAR_WIDTH: i32 = 6;
const BLACK: u8 = 0;
const WHITE: u8 = 1;

/// Display geometry of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 16-pixel character rows (64×16 board).
    pub tall_rows: bool,
}

impl Geometry {
    #[must_use]
    pub fn rows(self) -> usize {
        if self.tall_rows { 16 } else { 32 }
    }

    #[must_use]
    pub fn row_height(self) -> i32 {
        if self.tall_rows { 16 } else { 8 }
    }

    /// Display height in pixels. The 64×16 picture stops after the last
    /// character line.
    #[must_use]
    pub fn screen_height(self) -> u32 {
        if self.tall_rows { 248 } else { 256 }
    }

    /// Video RAM index of cell `(col, row)`.
    fn cell_index(self, video_ram: &[u8], col: usize, row: usize) -> Option<usize> {
        if col >= COLUMNS || row >= self.rows() {
            return None;
        }
        video_ram.len().checked_sub(1 + row * COLUMNS + col)
    }

    /// Palette index (0 black, 1 white) of pixel `(x, y)`.
    #[must_use]
    pub fn color_index(self, video_ram: &[u8], font: &[u8], x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH as i32 || y >= self.screen_height() as i32 {
            return BLACK;
        }
        let row_height = self.row_height();
        let pixel_row = y % row_height;
        if pixel_row >= 8 {
            return BLACK;
        }
        let Some(index) =
            self.cell_index(video_ram, (x / CHAR_WIDTH) as usize, (y / row_height) as usize)
        else {
            return BLACK;
        };
        let glyph = usize::from(video_ram[index]) * 8 + pixel_row as usize;
        match font.get(glyph) {
            Some(&bits) if bits & (1 << (x % CHAR_WIDTH)) != 0 => WHITE,
            _ => BLACK,
        }
    }

    /// Printable character in cell `(col, row)`.
    #[must_use]
    pub fn screen_char(self, video_ram: &[u8], col: usize, row: usize) -> Option<char> {
        let code = video_ram[self.cell_index(video_ram, col, row)?];
        (0x20..0x7F).contains(&code).then_some(char::from(code))
    }
}
