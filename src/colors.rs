//! Color constants for the display.
//!
//! Uses the `RgbColor` trait constants where a standard color exists. The
//! remaining shades are hand-picked RGB565 values.
//!
//! ## Rgb565 Color Format
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.
//! Configuration files specify colors as 8-bit `[r, g, b]` triples, which
//! [`from_rgb888`] narrows to the panel format.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black (0, 0, 0). Default empty-screen fill.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white (31, 63, 31).
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red (31, 0, 0). Error log entries.
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green (0, 63, 0). Default glyph color, info log entries.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Pure yellow (31, 63, 0). Warning log entries.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

// =============================================================================
// Custom Colors
// =============================================================================

/// Dark gray. RGB565: (8, 16, 8) - roughly 25% brightness.
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);

/// Darker gray for trace output. RGB565: (4, 8, 4).
pub const DARK_GRAY: Rgb565 = Rgb565::new(4, 8, 4);

/// Phosphor amber, the classic CRT text alternative to green.
/// RGB565: (31, 44, 0).
pub const AMBER: Rgb565 = Rgb565::new(31, 44, 0);

/// Artificial horizon sky. RGB565: (4, 24, 20).
pub const SKY: Rgb565 = Rgb565::new(4, 24, 20);

/// Artificial horizon ground. RGB565: (14, 18, 4).
pub const GROUND: Rgb565 = Rgb565::new(14, 18, 4);

/// Convert an 8-bit-per-channel color to RGB565 by dropping the low bits.
#[inline]
pub const fn from_rgb888(rgb: [u8; 3]) -> Rgb565 { Rgb565::new(rgb[0] >> 3, rgb[1] >> 2, rgb[2] >> 3) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb888_extremes() {
        assert_eq!(from_rgb888([0, 0, 0]), BLACK);
        assert_eq!(from_rgb888([255, 255, 255]), WHITE);
        assert_eq!(from_rgb888([0, 255, 0]), GREEN);
    }

    #[test]
    fn test_from_rgb888_drops_low_bits() {
        let c = from_rgb888([0x0F, 0x0F, 0x0F]);
        assert_eq!((c.r(), c.g(), c.b()), (1, 3, 1));
    }
}
