//! Screen output as palette indices.

/// A hardware model's screen, sampled pixel by pixel by the host renderer.
///
/// Colour indices refer to the model's own palette; the host owns the
/// mapping to RGB.
pub trait VideoSource {
    /// Active display width in pixels (border excluded).
    fn screen_width(&self) -> u32;

    fn screen_height(&self) -> u32;

    /// Number of palette entries [`color_index`](Self::color_index) may
    /// return.
    fn color_count(&self) -> usize;

    /// Palette index of the pixel at `(x, y)`. Coordinates outside the
    /// active display yield the background colour (0).
    fn color_index(&self, x: i32, y: i32) -> u8;

    /// Current border colour.
    fn border_color(&self) -> u8 {
        0
    }

    /// Border colour latched on a display line, where line 0 is the first
    /// line of the active display. `None` if the model has no per-line
    /// border.
    fn border_color_at_line(&self, line: i32) -> Option<u8> {
        let _ = line;
        None
    }
}
