//! Standard Sinclair ULA (Uncommitted Logic Array).
//!
//! The ULA handles video generation, memory contention and the frame
//! interrupt. Keyboard, border port decoding and the beeper are wired
//! through the system bus by the machine crate; the ULA only stores the
//! border colour it is given.
//!
//! # Timing (48K PAL)
//!
//! - 224 CPU T-states per line at 3.5 MHz, `round(khz / 15.625)` in general
//! - 312 lines per frame, display lines 64-255
//! - INT raised once per frame when the line counter wraps
//!
//! The ULA is advanced by executed CPU T-states. When the accumulated count
//! crosses a line boundary, that line is decoded from display memory into a
//! colour-index grid and its border colour is recorded.
//!
//! # Screen memory layout
//!
//! Bitmap at $4000-$57FF (6144 bytes), attributes at $5800-$5AFF (768 bytes).
//! Bitmap address: `010Y7 Y6Y2 Y1Y0 Y5Y4Y3 X4X3X2X1X0`
//! Attribute address: `0101 10Y7 Y6Y5 Y4Y3 X4X3X2X1X0`

mod contention;
mod palette;

use kc_core::{InterruptLatch, InterruptSource, clocks_per_line};

pub use contention::{ContentionTiming, SPECTRUM_48K};
pub use palette::palette;

/// Active display size.
pub const SCREEN_WIDTH: u32 = 256;
pub const SCREEN_HEIGHT: u32 = 192;

/// Lines per frame.
pub const LINES_PER_FRAME: u16 = 312;

/// First display line. Line 0 is the start of the vertical retrace.
pub const FIRST_SCREEN_LINE: u16 = 64;

/// Number of frames between FLASH toggles.
const FLASH_FRAME_COUNT: u8 = 16;

/// Default clock of the 48K.
pub const DEFAULT_KHZ: u32 = 3500;

/// Standard Sinclair ULA.
pub struct Ula {
    timing: ContentionTiming,
    tstates_per_line: u32,
    /// T-states elapsed in the current line.
    line_tstate: u32,
    /// Current scanline (0 = start of frame).
    line: u16,
    /// Current border colour (0-7).
    border: u8,
    /// Border colour latched on every raster line.
    border_by_line: [u8; LINES_PER_FRAME as usize],
    /// FLASH state: false = normal, true = inverted.
    flash_state: bool,
    /// Frame counter for FLASH timing.
    flash_counter: u8,
    /// Palette indices, one per display pixel.
    colors: Box<[u8]>,
    interrupt: InterruptLatch,
}

impl Ula {
    #[must_use]
    pub fn new(timing: ContentionTiming, khz: u32) -> Self {
        Self {
            timing,
            tstates_per_line: clocks_per_line(khz),
            line_tstate: 0,
            line: 0,
            border: 0,
            border_by_line: [0; LINES_PER_FRAME as usize],
            flash_state: false,
            flash_counter: 0,
            colors: vec![0; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize].into_boxed_slice(),
            interrupt: InterruptLatch::default(),
        }
    }

    /// Recompute the line length for a new CPU clock.
    pub fn set_speed_khz(&mut self, khz: u32) {
        self.tstates_per_line = clocks_per_line(khz);
    }

    /// Advance by executed CPU T-states.
    ///
    /// `read_vram` reads display memory without side effects. Every line
    /// boundary crossed is processed, so long instructions or a slowed-down
    /// clock never skip lines. Whole frames before the last one or two are
    /// only counted: they raise the interrupt and advance the FLASH phase,
    /// and the remaining lines redraw the picture.
    pub fn tick_n(&mut self, tstates: u64, read_vram: impl Fn(u16) -> u8) {
        let per_line = u64::from(self.tstates_per_line);
        let total = u64::from(self.line_tstate).saturating_add(tstates);
        let mut lines = total / per_line;
        self.line_tstate = (total % per_line) as u32;

        let frame = u64::from(LINES_PER_FRAME);
        if lines > 2 * frame {
            let skipped = lines / frame - 1;
            lines -= skipped * frame;
            self.interrupt.raise();
            self.advance_flash(skipped);
        }
        for _ in 0..lines {
            self.next_line(&read_vram);
        }
    }

    fn next_line(&mut self, read_vram: &impl Fn(u16) -> u8) {
        self.finish_line(read_vram);
        self.line += 1;
        if self.line >= LINES_PER_FRAME {
            self.line = 0;
            self.interrupt.raise();
            self.advance_flash(1);
        }
    }

    fn advance_flash(&mut self, frames: u64) {
        let count = u64::from(self.flash_counter) + frames;
        let period = u64::from(FLASH_FRAME_COUNT);
        self.flash_counter = (count % period) as u8;
        if (count / period) % 2 == 1 {
            self.flash_state = !self.flash_state;
        }
    }

    /// Wait states for a memory access at `addr`, `diff` T-states into the
    /// current instruction.
    #[must_use]
    pub fn contention(&self, addr: u16, diff: u32) -> u8 {
        if !self.timing.is_contended(addr) || !self.timing.is_fetch_line(self.line) {
            return 0;
        }
        self.timing
            .wait_states(self.line_tstate, self.tstates_per_line, diff)
    }

    /// Wait states for an I/O access. ULA ports (A0 clear) are contended
    /// even when the high byte is outside contended RAM.
    #[must_use]
    pub fn io_contention(&self, port: u16, diff: u32) -> u8 {
        let addr = if port & 0x01 == 0 {
            (port & 0x3FFF) | 0x4000
        } else {
            port
        };
        self.contention(addr, diff)
    }

    #[must_use]
    pub fn tstates_per_line(&self) -> u32 {
        self.tstates_per_line
    }

    #[must_use]
    pub fn line(&self) -> u16 {
        self.line
    }

    #[must_use]
    pub fn line_tstate(&self) -> u32 {
        self.line_tstate
    }

    #[must_use]
    pub fn flash_state(&self) -> bool {
        self.flash_state
    }

    #[must_use]
    pub fn border_colour(&self) -> u8 {
        self.border
    }

    pub fn set_border_colour(&mut self, colour: u8) {
        self.border = colour & 0x07;
    }

    /// Border colour latched on display line `line` (0 = first display
    /// line). Out-of-range lines wrap as `abs(line) % 312`.
    #[must_use]
    pub fn border_colour_at_line(&self, line: i32) -> u8 {
        let len = self.border_by_line.len() as i32;
        let mut index = line + i32::from(FIRST_SCREEN_LINE);
        if !(0..len).contains(&index) {
            index = index.unsigned_abs() as i32 % len;
        }
        self.border_by_line[index as usize]
    }

    /// Palette index of display pixel `(x, y)`, 0 outside the display.
    #[must_use]
    pub fn color_index(&self, x: i32, y: i32) -> u8 {
        if (0..SCREEN_WIDTH as i32).contains(&x) && (0..SCREEN_HEIGHT as i32).contains(&y) {
            self.colors[(y as u32 * SCREEN_WIDTH + x as u32) as usize] & 0x0F
        } else {
            0
        }
    }

    /// Back to the power-up state. The clock setting is kept.
    pub fn reset(&mut self) {
        self.line_tstate = 0;
        self.line = 0;
        self.border = 0;
        self.border_by_line.fill(0);
        self.flash_state = false;
        self.flash_counter = 0;
        self.colors.fill(0);
        self.interrupt.clear();
    }

    /// Bitmap address of the first byte of display line `y`.
    #[must_use]
    pub fn bitmap_addr(y: u16) -> u16 {
        0x4000 | ((y << 5) & 0x1800) | ((y << 2) & 0x00E0) | ((y << 8) & 0x0700)
    }

    /// Attribute address of the first cell of display line `y`.
    #[must_use]
    pub fn attr_addr(y: u16) -> u16 {
        0x5800 + (y / 8) * 32
    }

    /// Decode the line just completed and latch its border colour.
    fn finish_line(&mut self, read_vram: &impl Fn(u16) -> u8) {
        if let Some(y) = self
            .line
            .checked_sub(FIRST_SCREEN_LINE)
            .filter(|&y| u32::from(y) < SCREEN_HEIGHT)
        {
            self.decode_line(y, read_vram);
        }
        self.border_by_line[usize::from(self.line)] = self.border;
    }

    fn decode_line(&mut self, y: u16, read_vram: &impl Fn(u16) -> u8) {
        let bitmap = Self::bitmap_addr(y);
        let attrs = Self::attr_addr(y);
        let row = usize::from(y) * SCREEN_WIDTH as usize;
        for col in 0..32u16 {
            let attr = read_vram(attrs + col);
            let mut pixels = read_vram(bitmap + col);
            let flash = attr & 0x80 != 0 && self.flash_state;
            let ink = (attr & 0x07) | ((attr & 0x40) >> 3);
            let paper = (attr >> 3) & 0x07;
            let base = row + usize::from(col) * 8;
            for cell in &mut self.colors[base..base + 8] {
                let foreground = (pixels & 0x80 != 0) != flash;
                *cell = if foreground { ink } else { paper };
                pixels <<= 1;
            }
        }
    }
}

impl InterruptSource for Ula {
    fn is_interrupt_requested(&self) -> bool {
        self.interrupt.is_interrupt_requested()
    }

    fn interrupt_accept(&mut self) -> u8 {
        self.interrupt.interrupt_accept()
    }
}

impl Default for Ula {
    fn default() -> Self {
        Self::new(SPECTRUM_48K, DEFAULT_KHZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Simple 64K memory for tests.
    struct TestMemory {
        data: Vec<u8>,
    }

    impl TestMemory {
        fn new() -> Self {
            Self {
                data: vec![0; 0x10000],
            }
        }

        fn peek(&self, addr: u16) -> u8 {
            self.data[addr as usize]
        }

        fn write(&mut self, addr: u16, val: u8) {
            self.data[addr as usize] = val;
        }
    }

    const FRAME_TSTATES: u64 = 224 * LINES_PER_FRAME as u64;

    fn run_lines(ula: &mut Ula, mem: &TestMemory, lines: u32) {
        for _ in 0..lines {
            ula.tick_n(224, |addr| mem.peek(addr));
        }
    }

    /// Position the ULA at a specific line and T-state.
    fn position_ula(ula: &mut Ula, line: u16, tstate: u32) {
        ula.line = line;
        ula.line_tstate = tstate;
    }

    #[test]
    fn frame_timing() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        assert_eq!(ula.tstates_per_line(), 224);

        run_lines(&mut ula, &mem, u32::from(LINES_PER_FRAME) - 1);
        assert!(!ula.is_interrupt_requested(), "interrupt raised too early");

        run_lines(&mut ula, &mem, 1);
        assert_eq!(ula.line(), 0);
        assert!(ula.is_interrupt_requested());
        assert_eq!(ula.interrupt_accept(), 0xFF);
        assert!(
            !ula.is_interrupt_requested(),
            "accepting clears the request"
        );
    }

    #[test]
    fn huge_tick_after_partial_line() {
        let mut ula = Ula::default();
        let mut mem = TestMemory::new();
        mem.write(0x4000, 0x80);
        mem.write(0x5800, 0x07);

        ula.tick_n(100, |addr| mem.peek(addr));
        ula.tick_n(u64::from(u32::MAX), |addr| mem.peek(addr));

        let total = 100 + u64::from(u32::MAX);
        let lines = total / 224;
        let frames = lines / u64::from(LINES_PER_FRAME);
        assert_eq!(u64::from(ula.line_tstate()), total % 224);
        assert_eq!(
            u64::from(ula.line()),
            lines % u64::from(LINES_PER_FRAME)
        );
        assert!(ula.is_interrupt_requested());
        assert_eq!(ula.flash_state(), (frames / 16) % 2 == 1);
        // The picture is still decoded
        assert_eq!(ula.color_index(0, 0), 7);
        assert_eq!(ula.color_index(1, 0), 0);
    }

    #[test]
    fn long_run_matches_frame_by_frame() {
        let mem = TestMemory::new();
        let mut stepped = Ula::default();
        for _ in 0..40 {
            stepped.tick_n(FRAME_TSTATES, |addr| mem.peek(addr));
        }
        stepped.tick_n(1000, |addr| mem.peek(addr));

        let mut jumped = Ula::default();
        jumped.tick_n(40 * FRAME_TSTATES + 1000, |addr| mem.peek(addr));

        assert_eq!(jumped.line(), stepped.line());
        assert_eq!(jumped.line_tstate(), stepped.line_tstate());
        assert_eq!(jumped.flash_state(), stepped.flash_state());
    }

    #[test]
    fn line_counter_advances_by_one_per_line() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        for expected in 1..LINES_PER_FRAME {
            ula.tick_n(100, |addr| mem.peek(addr));
            ula.tick_n(124, |addr| mem.peek(addr));
            assert_eq!(ula.line(), expected);
        }
    }

    #[test]
    fn long_tick_crosses_several_lines() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        ula.tick_n(224 * 3 + 10, |addr| mem.peek(addr));
        assert_eq!(ula.line(), 3);
        assert_eq!(ula.line_tstate(), 10);
    }

    #[test]
    fn interrupt_latch_is_single_shot() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        ula.tick_n(FRAME_TSTATES, |addr| mem.peek(addr));
        assert!(ula.is_interrupt_requested());

        // Another frame without acceptance keeps one pending request
        ula.tick_n(FRAME_TSTATES, |addr| mem.peek(addr));
        assert!(ula.is_interrupt_requested());
        assert_eq!(ula.interrupt_accept(), 0xFF);
        assert!(!ula.is_interrupt_requested());
        assert!(!ula.is_interrupt_accepted());

        ula.interrupt_finish();
        assert!(!ula.is_interrupt_requested());
    }

    #[test]
    fn border_colour() {
        let mut ula = Ula::default();
        assert_eq!(ula.border_colour(), 0);

        ula.set_border_colour(2);
        assert_eq!(ula.border_colour(), 2);

        ula.set_border_colour(0xFF);
        assert_eq!(ula.border_colour(), 7);
    }

    #[test]
    fn border_recorded_per_line() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        ula.set_border_colour(1);
        run_lines(&mut ula, &mem, u32::from(FIRST_SCREEN_LINE) + 10);
        ula.set_border_colour(5);
        run_lines(&mut ula, &mem, 10);

        assert_eq!(ula.border_colour_at_line(0), 1);
        assert_eq!(ula.border_colour_at_line(9), 1);
        assert_eq!(ula.border_colour_at_line(10), 5);
        assert_eq!(ula.border_colour_at_line(19), 5);
    }

    #[test]
    fn border_lookup_wraps() {
        let mut ula = Ula::default();
        for (i, entry) in ula.border_by_line.iter_mut().enumerate() {
            *entry = (i % 8) as u8;
        }
        for line in [-1000, -65, -64, -1, 248, 400, 10_000] {
            let index = (line + 64_i32).unsigned_abs() as usize % 312;
            assert_eq!(
                ula.border_colour_at_line(line),
                (index % 8) as u8,
                "line {line}"
            );
        }
    }

    #[test]
    fn decodes_ink_paper_and_bright() {
        let mut ula = Ula::default();
        let mut mem = TestMemory::new();
        // Line 0, column 0: left half set, ink 2 bright, paper 5
        mem.write(0x4000, 0xF0);
        mem.write(0x5800, 0x40 | (5 << 3) | 2);
        run_lines(&mut ula, &mem, u32::from(FIRST_SCREEN_LINE) + 1);

        assert_eq!(ula.color_index(0, 0), 0x0A);
        assert_eq!(ula.color_index(3, 0), 0x0A);
        assert_eq!(ula.color_index(4, 0), 5, "bright applies to ink only");
        assert_eq!(ula.color_index(-1, 0), 0);
        assert_eq!(ula.color_index(0, 192), 0);
    }

    #[test]
    fn third_line_of_screen_uses_interleaved_address() {
        assert_eq!(Ula::bitmap_addr(0), 0x4000);
        assert_eq!(Ula::bitmap_addr(1), 0x4100);
        assert_eq!(Ula::bitmap_addr(8), 0x4020);
        assert_eq!(Ula::bitmap_addr(64), 0x4800);
        assert_eq!(Ula::bitmap_addr(191), 0x57E0);
        assert_eq!(Ula::attr_addr(0), 0x5800);
        assert_eq!(Ula::attr_addr(191), 0x5AE0);
    }

    #[test]
    fn flash_toggles_every_16_frames() {
        let mut ula = Ula::default();
        let mut mem = TestMemory::new();
        mem.write(0x4000, 0xFF);
        mem.write(0x5800, 0x80 | (1 << 3) | 6);

        assert!(!ula.flash_state());
        for _ in 0..16 {
            ula.tick_n(FRAME_TSTATES, |addr| mem.peek(addr));
        }
        assert!(ula.flash_state());

        // Decode line 0 in the inverted phase: set pixels show paper
        run_lines(&mut ula, &mem, u32::from(FIRST_SCREEN_LINE) + 1);
        assert_eq!(ula.color_index(0, 0), 1);

        for _ in 0..16 {
            ula.tick_n(FRAME_TSTATES, |addr| mem.peek(addr));
        }
        assert!(!ula.flash_state());
    }

    #[test]
    fn speed_change_recomputes_line_length() {
        let mut ula = Ula::default();
        ula.set_speed_khz(7000);
        assert_eq!(ula.tstates_per_line(), 448);
        ula.set_speed_khz(2000);
        assert_eq!(ula.tstates_per_line(), 128);
    }

    // === Contention tests ===

    #[test]
    fn contention_at_start_of_display_line() {
        let mut ula = Ula::default();
        position_ula(&mut ula, 64, 0);
        let expected = SPECTRUM_48K.wait_states(0, 224, 4);
        assert_eq!(ula.contention(0x4000, 4), expected);
        assert_eq!(expected, 0);
    }

    #[test]
    fn contention_in_screen_area() {
        let mut ula = Ula::default();
        position_ula(&mut ula, 64, 59);
        assert_eq!(ula.contention(0x4000, 4), 6);
        position_ula(&mut ula, 100, 63);
        assert_eq!(ula.contention(0x7FFF, 4), 2);
    }

    #[test]
    fn contention_outside_screen_area() {
        let mut ula = Ula::default();

        // Line 0 (vblank) -- no contention
        position_ula(&mut ula, 0, 59);
        assert_eq!(ula.contention(0x4000, 4), 0);

        // Line 256 (bottom border) -- no contention
        position_ula(&mut ula, 256, 59);
        assert_eq!(ula.contention(0x4000, 4), 0);
    }

    #[test]
    fn contention_non_contended_ram() {
        let mut ula = Ula::default();
        position_ula(&mut ula, 64, 59);
        assert_eq!(ula.contention(0x3FFF, 4), 0);
        assert_eq!(ula.contention(0x8000, 4), 0);
    }

    #[test]
    fn io_contention_ula_port() {
        let mut ula = Ula::default();
        position_ula(&mut ula, 64, 59);
        // $00FE contends as $40FE
        assert_eq!(ula.io_contention(0x00FE, 4), 6);
        // $00FF: odd port outside contended RAM
        assert_eq!(ula.io_contention(0x00FF, 4), 0);
        // $40FF: odd port with contended high byte
        assert_eq!(ula.io_contention(0x40FF, 4), 6);
    }

    #[test]
    fn reset_restores_power_up_state() {
        let mut ula = Ula::default();
        let mem = TestMemory::new();
        ula.set_border_colour(3);
        ula.tick_n(FRAME_TSTATES + 500, |addr| mem.peek(addr));
        ula.reset();
        assert_eq!(ula.line(), 0);
        assert_eq!(ula.line_tstate(), 0);
        assert_eq!(ula.border_colour(), 0);
        assert!(!ula.is_interrupt_requested());
        assert_eq!(ula.border_colour_at_line(0), 0);
    }
}
