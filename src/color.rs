//! Straight-alpha color type and packed-integer conversions.
//!
//! Pixels live in `u32` words laid out as `0xAARRGGBB`; opaque buffers use
//! the same layout with the alpha byte set to 0xff. `Color` is the value
//! callers place glyphs with: 8-bit RGB plus a float alpha, so very faint
//! contributions are not lost before they reach a compositor.

use crate::basics::unit_to_byte;

// ============================================================================
// Packed pixel helpers
// ============================================================================

/// Mask selecting the RGB bytes of a packed pixel.
pub const RGB_MASK: u32 = 0x00ff_ffff;

/// Alpha byte of a packed pixel set fully opaque.
pub const OPAQUE_ALPHA: u32 = 0xff00_0000;

/// Alpha byte of a packed 0xAARRGGBB pixel.
#[inline]
pub fn alpha_of(argb: u32) -> u32 {
    argb >> 24
}

/// Pack straight 8-bit channels as 0xAARRGGBB.
#[inline]
pub fn pack_argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    (a << 24) | (r << 16) | (g << 8) | b
}

// ============================================================================
// Color
// ============================================================================

/// RGB color with u8 components and a straight (non-premultiplied) alpha
/// in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub const BASE_MASK: u32 = 255;

    pub const BLACK: Color = Color::new_opaque(0, 0, 0);
    pub const WHITE: Color = Color::new_opaque(255, 255, 255);
    pub const RED: Color = Color::new_opaque(255, 0, 0);
    pub const GREEN: Color = Color::new_opaque(0, 255, 0);
    pub const BLUE: Color = Color::new_opaque(0, 0, 255);
    pub const TRANSPARENT: Color = Color::from_parts(0, 0, 0, 0.0);

    const fn from_parts(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }

    /// Color with an 8-bit alpha.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_parts(r, g, b, a as f32 / Self::BASE_MASK as f32)
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::from_parts(r, g, b, 1.0)
    }

    /// Same color with alpha `alpha`, clamped to [0, 1].
    pub fn with_alpha(&self, alpha: f32) -> Self {
        let alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        Self { alpha, ..*self }
    }

    /// Create a color from a packed RGB value (0xRRGGBB), fully opaque.
    pub fn from_rgb(v: u32) -> Self {
        Self::new_opaque((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Create a color from a packed ARGB value (0xAARRGGBB).
    pub fn from_argb(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8)
    }

    /// Packed 0xRRGGBB, alpha discarded.
    #[inline]
    pub fn rgb(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Alpha rounded to a byte.
    #[inline]
    pub fn a(&self) -> u8 {
        unit_to_byte(self.alpha) as u8
    }

    /// Packed 0xAARRGGBB, alpha rounded to a byte.
    #[inline]
    pub fn argb(&self) -> u32 {
        ((self.a() as u32) << 24) | self.rgb()
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Alpha as a float in [0, 1].
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.alpha
    }

    /// Components as floats in [0, 1], ordered r, g, b, a.
    pub fn to_rgba_f32(&self) -> [f32; 4] {
        let s = 1.0 / Self::BASE_MASK as f32;
        [
            self.r as f32 * s,
            self.g as f32 * s,
            self.b as f32 * s,
            self.alpha,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_roundtrip() {
        let c = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.argb(), 0x7812_3456);
        assert_eq!(c.rgb(), 0x12_3456);
        assert_eq!(Color::from_argb(0x7812_3456), c);
    }

    #[test]
    fn test_from_rgb_is_opaque() {
        let c = Color::from_rgb(0xff00_80ff);
        assert!(c.is_opaque());
        assert_eq!(c.rgb(), 0x0080ff);
        assert_eq!(Color::from_argb(0xffff_0000), Color::RED);
    }

    #[test]
    fn test_with_alpha() {
        let c = Color::RED.with_alpha(0.5);
        assert_eq!(c.a(), 128);
        assert_eq!(c.rgb(), Color::RED.rgb());
        assert!(Color::RED.with_alpha(0.0).is_transparent());
        assert_eq!(Color::RED.with_alpha(3.0).alpha, 1.0);
    }

    #[test]
    fn test_faint_alpha_kept() {
        let c = Color::BLACK.with_alpha(1e-4);
        assert!(!c.is_transparent());
        assert_eq!(c.opacity(), 1e-4);
        assert_eq!(c.a(), 0);
    }

    #[test]
    fn test_to_rgba_f32() {
        let f = Color::new(255, 0, 51, 255).to_rgba_f32();
        assert_eq!(f[0], 1.0);
        assert_eq!(f[1], 0.0);
        assert!((f[2] - 0.2).abs() < 1e-6);
        assert_eq!(f[3], 1.0);
    }

    #[test]
    fn test_pack_helpers() {
        assert_eq!(pack_argb(0xff, 1, 2, 3), 0xff01_0203);
        assert_eq!(alpha_of(0x80ab_cdef), 0x80);
    }
}
