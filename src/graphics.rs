//! Immediate-mode drawing surfaces.
//!
//! [`Graphics`] is the narrow drawing interface that surfaces, decals and
//! glyphs paint through. Coordinates are plot graphics coordinates; an
//! implementation maps them onto its own storage.
//!
//! - [`ImageGraphics`] blends straight into an [`RgbImage`] whose top-left
//!   pixel sits at a configurable origin.
//! - [`Recording`] keeps the calls as a display list for later replay, which
//!   is how vector output is represented.

use std::sync::Arc;

use crate::basics::RectI;
use crate::color::{Color, OPAQUE_ALPHA};
use crate::compositor::{src_over, src_over_opaque};
use crate::rgb_image::RgbImage;

// ============================================================================
// Graphics trait
// ============================================================================

/// A surface that accepts straight-alpha, source-over drawing calls.
pub trait Graphics {
    /// Region that drawing can affect, in graphics coordinates.
    fn clip_bounds(&self) -> RectI;

    /// Fill a `width`×`height` rectangle whose top-left pixel is (x, y).
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);

    /// Draw an image with its top-left pixel at (x, y). Opaque images are
    /// copied, alpha images are blended.
    fn draw_image(&mut self, x: i32, y: i32, image: &RgbImage);
}

// ============================================================================
// ImageGraphics — raster target
// ============================================================================

/// Raster [`Graphics`] over a borrowed image.
pub struct ImageGraphics<'a> {
    image: &'a mut RgbImage,
    origin_x: i32,
    origin_y: i32,
}

impl<'a> ImageGraphics<'a> {
    /// Graphics whose coordinates coincide with image pixel coordinates.
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self::with_origin(image, 0, 0)
    }

    /// Graphics where graphics point (origin_x, origin_y) maps to image
    /// pixel (0, 0).
    pub fn with_origin(image: &'a mut RgbImage, origin_x: i32, origin_y: i32) -> Self {
        Self {
            image,
            origin_x,
            origin_y,
        }
    }

    #[inline]
    fn blend_at(&mut self, index: usize, src_argb: u32) {
        let has_alpha = self.image.has_alpha();
        let pixels = self.image.pixels_mut();
        let dst = pixels[index];
        pixels[index] = if has_alpha {
            src_over(src_argb, dst)
        } else {
            src_over_opaque(src_argb, dst)
        };
    }

    /// Blend a horizontal run of `len` pixels with one color.
    fn blend_hline(&mut self, x: i32, y: i32, len: i32, src_argb: u32) {
        let w = self.image.width();
        let row = y as usize * w;
        let opaque_copy = src_argb >> 24 == 0xff;
        for px in x..x + len {
            let i = row + px as usize;
            if opaque_copy {
                self.image.pixels_mut()[i] = src_argb;
            } else {
                self.blend_at(i, src_argb);
            }
        }
    }
}

impl Graphics for ImageGraphics<'_> {
    fn clip_bounds(&self) -> RectI {
        RectI::from_xywh(
            self.origin_x,
            self.origin_y,
            self.image.width() as i32,
            self.image.height() as i32,
        )
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        if color.is_transparent() {
            return;
        }
        let mut r = RectI::from_xywh(x - self.origin_x, y - self.origin_y, width, height);
        let img = RectI::from_xywh(0, 0, self.image.width() as i32, self.image.height() as i32);
        if !r.clip(&img) {
            return;
        }
        let argb = color.argb();
        for py in r.y1..=r.y2 {
            self.blend_hline(r.x1, py, r.width(), argb);
        }
    }

    fn draw_image(&mut self, x: i32, y: i32, image: &RgbImage) {
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let mut r = RectI::from_xywh(dx, dy, image.width() as i32, image.height() as i32);
        let img = RectI::from_xywh(0, 0, self.image.width() as i32, self.image.height() as i32);
        if !r.clip(&img) {
            return;
        }
        let w = self.image.width();
        let dst_alpha = self.image.has_alpha();
        for py in r.y1..=r.y2 {
            for px in r.x1..=r.x2 {
                let src = image.argb((px - dx) as usize, (py - dy) as usize);
                let i = py as usize * w + px as usize;
                if image.has_alpha() {
                    self.blend_at(i, src);
                } else {
                    self.image.pixels_mut()[i] = if dst_alpha { src } else { src | OPAQUE_ALPHA };
                }
            }
        }
    }
}

// ============================================================================
// Recording — vector display list
// ============================================================================

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    },
    Image {
        x: i32,
        y: i32,
        image: Arc<RgbImage>,
    },
}

/// A replayable list of drawing calls, bounded by a clip region.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    clip: RectI,
    ops: Vec<DrawOp>,
}

impl Recording {
    pub fn new(clip: RectI) -> Self {
        Self {
            clip,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append a copy of the given calls.
    pub fn extend_from(&mut self, ops: &[DrawOp]) {
        self.ops.extend_from_slice(ops);
    }

    /// Replay every call onto `g`, shifted by (dx, dy).
    pub fn replay(&self, g: &mut dyn Graphics, dx: i32, dy: i32) {
        replay_ops(&self.ops, g, dx, dy);
    }
}

/// Replay a slice of recorded calls onto `g`, shifted by (dx, dy).
pub fn replay_ops(ops: &[DrawOp], g: &mut dyn Graphics, dx: i32, dy: i32) {
    for op in ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => g.fill_rect(x + dx, y + dy, *width, *height, *color),
            DrawOp::Image { x, y, image } => g.draw_image(x + dx, y + dy, image),
        }
    }
}

impl Graphics for Recording {
    fn clip_bounds(&self) -> RectI {
        self.clip
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        if width > 0 && height > 0 && !color.is_transparent() {
            self.ops.push(DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            });
        }
    }

    fn draw_image(&mut self, x: i32, y: i32, image: &RgbImage) {
        self.ops.push(DrawOp::Image {
            x,
            y,
            image: Arc::new(image.clone()),
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
