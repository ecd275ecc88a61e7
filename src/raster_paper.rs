//! Shared plumbing for bitmap papers.
//!
//! Every bitmap paper owns a [`RasterBase`]: the plot bounds and an opaque
//! image with the background already painted. Placement is expressed as
//! visits to pixel indices in that image, so the variant-specific
//! accumulators can be plain flat arrays indexed the same way.

use crate::basics::{glyph_pixel, RectI};
use crate::color::{Color, OPAQUE_ALPHA};
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::graphics::ImageGraphics;
use crate::paper::{checked_bounds, DataIcon, Surface};
use crate::rgb_image::{RgbImage, EMPTY_PIXEL};

use std::sync::Arc;

/// Bounds plus background-painted opaque image.
#[derive(Debug)]
pub(crate) struct RasterBase {
    pub bounds: RectI,
    pub image: RgbImage,
}

impl RasterBase {
    pub fn new(surface: &dyn Surface) -> Result<Self> {
        let bounds = checked_bounds(surface)?;
        let mut image = RgbImage::new_rgb(
            bounds.width() as usize,
            bounds.height() as usize,
            Color::WHITE,
        );
        surface.paint_background(&mut ImageGraphics::with_origin(
            &mut image,
            bounds.x1,
            bounds.y1,
        ));
        Ok(Self { bounds, image })
    }

    pub fn pixel_count(&self) -> usize {
        self.image.pixels().len()
    }

    /// Graphics drawing straight onto the image in plot coordinates.
    pub fn graphics(&mut self) -> ImageGraphics<'_> {
        ImageGraphics::with_origin(&mut self.image, self.bounds.x1, self.bounds.y1)
    }

    pub fn into_icon(self) -> DataIcon {
        DataIcon::Raster {
            bounds: self.bounds,
            image: Arc::new(self.image),
        }
    }
}

/// Call `f` with the image index of every in-bounds pixel covered by
/// `glyph` placed at graphics position (gx, gy).
///
/// Positions too far off-plot to express relative to the bounds, and NaN
/// positions, cover nothing.
pub(crate) fn for_each_glyph_pixel(
    bounds: &RectI,
    gx: f64,
    gy: f64,
    glyph: &dyn Glyph,
    mut f: impl FnMut(usize),
) {
    let Some((px, py)) = glyph_pixel(gx, gy) else {
        return;
    };
    let Some(clip) = bounds.relative_to(px, py) else {
        return;
    };
    let Some(pixer) = glyph.pixer(&clip) else {
        return;
    };
    let width = bounds.width() as usize;
    for (ox, oy) in pixer {
        debug_assert!(clip.hit_test(ox, oy), "pixer offset outside clip");
        if !clip.hit_test(ox, oy) {
            continue;
        }
        let x = (ox - clip.x1) as usize;
        let y = (oy - clip.y1) as usize;
        f(y * width + x);
    }
}

/// Render `decal` into a transparent scratch image covering `bounds` and
/// call `f` with the image index and ARGB sample of every painted pixel.
///
/// Opaque decals report their pixels with full alpha.
pub(crate) fn for_each_decal_pixel(bounds: &RectI, decal: &dyn Decal, mut f: impl FnMut(usize, u32)) {
    let mut scratch = RgbImage::new_argb(bounds.width() as usize, bounds.height() as usize);
    decal.paint_decal(&mut ImageGraphics::with_origin(
        &mut scratch,
        bounds.x1,
        bounds.y1,
    ));
    let opaque = decal.is_opaque();
    for (i, &p) in scratch.pixels().iter().enumerate() {
        if p == EMPTY_PIXEL {
            continue;
        }
        f(i, if opaque { p | OPAQUE_ALPHA } else { p });
    }
}

// ============================================================================
// Tests
// ============================================================================
