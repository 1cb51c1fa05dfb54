//! ZX Spectrum 16-colour palette.
//!
//! 3-bit GRB colour plus BRIGHT. Normal colours use 192/255 of full
//! intensity, bright colours full intensity, both scaled by a user
//! brightness factor.

/// ARGB32 palette for `brightness` in `0.0..=1.0` (clamped).
///
/// Index layout: `bright_bit << 3 | grb`, where bit 0 is blue, bit 1 red
/// and bit 2 green.
#[must_use]
pub fn palette(brightness: f32) -> [u32; 16] {
    let brightness = brightness.clamp(0.0, 1.0);
    let mut colours = [0u32; 16];
    for (index, colour) in colours.iter_mut().enumerate() {
        let full = if index & 0x08 != 0 { 255.0 } else { 192.0 };
        let level = (brightness * full).round() as u32;
        let component = |bit: usize| if index & bit != 0 { level } else { 0 };
        *colour = 0xFF00_0000 | (component(0x02) << 16) | (component(0x04) << 8) | component(0x01);
    }
    colours
}
