//! Flat packed-integer pixel buffer.
//!
//! An [`RgbImage`] is a row-major `Vec<u32>` of `width * height` pixels,
//! either opaque (stored as 0xffRRGGBB) or 0xAARRGGBB with alpha. Alpha
//! images start out filled with [`EMPTY_PIXEL`], which the decal scanners
//! use as the "nothing painted here" sentinel.

use crate::color::{Color, OPAQUE_ALPHA};

/// Initial value of every pixel in a fresh alpha image: transparent black.
pub const EMPTY_PIXEL: u32 = 0;

/// A width×height buffer of packed pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    has_alpha: bool,
    pixels: Vec<u32>,
}

impl RgbImage {
    /// Create an opaque image filled with `background`.
    pub fn new_rgb(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            has_alpha: false,
            pixels: vec![background.rgb() | OPAQUE_ALPHA; width * height],
        }
    }

    /// Create an alpha image filled with transparent black.
    pub fn new_argb(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            has_alpha: true,
            pixels: vec![EMPTY_PIXEL; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether pixels carry an alpha byte.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Raw backing array.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable raw backing array.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Index into the backing array for pixel (x, y).
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Pixel at (x, y) as 0xAARRGGBB; opaque images report alpha 0xff.
    #[inline]
    pub fn argb(&self, x: usize, y: usize) -> u32 {
        let p = self.pixels[self.index(x, y)];
        if self.has_alpha {
            p
        } else {
            p | OPAQUE_ALPHA
        }
    }

    /// Pixel at (x, y) as a color.
    pub fn color(&self, x: usize, y: usize) -> Color {
        Color::from_argb(self.argb(x, y))
    }

    /// Overwrite pixel (x, y) with a packed value in this image's format.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u32) {
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    /// Fill every pixel with `value`.
    pub fn fill(&mut self, value: u32) {
        self.pixels.fill(value);
    }

    /// Export as tightly packed RGBA bytes, row-major, top-to-bottom.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let c = if self.has_alpha {
                Color::from_argb(p)
            } else {
                Color::from_rgb(p)
            };
            out.extend_from_slice(&[c.r, c.g, c.b, c.a()]);
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
