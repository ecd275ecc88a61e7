//! Placeable graphics: glyphs and decals.
//!
//! A [`Glyph`] is a small colorless shape described by the pixel offsets it
//! covers relative to its origin. Bitmap papers walk those offsets directly;
//! vector papers ask the glyph to paint itself with [`Glyph::paint_glyph`].
//!
//! A [`Decal`] is a one-shot graphic painted as a unit through
//! [`Graphics`] calls, for instance a density map.

use crate::basics::RectI;
use crate::color::Color;
use crate::graphics::Graphics;
use crate::rgb_image::RgbImage;

/// Iterator over the (x, y) offsets a glyph covers.
pub type Pixer<'a> = Box<dyn Iterator<Item = (i32, i32)> + 'a>;

// ============================================================================
// Glyph
// ============================================================================

/// A shape with a pixel coverage iterator. Carries no color.
pub trait Glyph: Send + Sync {
    /// Offsets covered by this glyph that fall inside `clip`, which is given
    /// relative to the glyph origin. `None` if nothing is covered.
    ///
    /// Every offset yielded must lie inside `clip`, and no offset may be
    /// yielded twice.
    fn pixer(&self, clip: &RectI) -> Option<Pixer<'_>>;

    /// Paint this glyph onto `g` with its origin at (x, y).
    ///
    /// The default implementation fills one rectangle per horizontal run of
    /// covered pixels, so replaying it on a raster target touches exactly
    /// the pixels the pixer reports. An origin too far from the clip to
    /// express the clip relative to it paints nothing.
    fn paint_glyph(&self, g: &mut dyn Graphics, x: i32, y: i32, color: Color) {
        let Some(clip) = g.clip_bounds().relative_to(x, y) else {
            return;
        };
        let Some(pixer) = self.pixer(&clip) else {
            return;
        };
        let mut offsets: Vec<(i32, i32)> = pixer.map(|(px, py)| (py, px)).collect();
        offsets.sort_unstable();
        offsets.dedup();

        let mut run: Option<(i32, i32, i32)> = None; // (row, start, len)
        for (py, px) in offsets {
            match run {
                Some((row, start, len)) if row == py && start + len == px => {
                    run = Some((row, start, len + 1));
                }
                _ => {
                    if let Some((row, start, len)) = run {
                        g.fill_rect(x + start, y + row, len, 1, color);
                    }
                    run = Some((py, px, 1));
                }
            }
        }
        if let Some((row, start, len)) = run {
            g.fill_rect(x + start, y + row, len, 1, color);
        }
    }
}

// ============================================================================
// OffsetsGlyph
// ============================================================================

/// Glyph defined by an explicit list of covered offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetsGlyph {
    offsets: Vec<(i32, i32)>,
    bounds: RectI,
}

impl OffsetsGlyph {
    /// Duplicate offsets are removed.
    pub fn new(mut offsets: Vec<(i32, i32)>) -> Self {
        offsets.sort_unstable_by_key(|&(x, y)| (y, x));
        offsets.dedup();
        let mut bounds = RectI::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        for &(x, y) in &offsets {
            bounds.x1 = bounds.x1.min(x);
            bounds.y1 = bounds.y1.min(y);
            bounds.x2 = bounds.x2.max(x);
            bounds.y2 = bounds.y2.max(y);
        }
        Self { offsets, bounds }
    }

    /// Bounding box of the covered offsets; empty if there are none.
    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }
}

impl Glyph for OffsetsGlyph {
    fn pixer(&self, clip: &RectI) -> Option<Pixer<'_>> {
        if self.offsets.is_empty() || !self.bounds.overlaps(clip) {
            return None;
        }
        let inner = self.bounds.intersect(clip) == self.bounds;
        if inner {
            Some(Box::new(self.offsets.iter().copied()))
        } else {
            let clip = *clip;
            Some(Box::new(
                self.offsets
                    .iter()
                    .copied()
                    .filter(move |&(x, y)| clip.hit_test(x, y)),
            ))
        }
    }
}

// ============================================================================
// Decal
// ============================================================================

/// A graphic painted as a unit.
pub trait Decal {
    /// Paint the decal. Pixels it leaves untouched stay transparent.
    fn paint_decal(&self, g: &mut dyn Graphics);

    /// True if every pixel the decal paints is fully opaque.
    fn is_opaque(&self) -> bool;
}

/// Decal drawing a prebuilt image with its top-left pixel at a fixed
/// graphics position. Opaque if the image has no alpha channel.
#[derive(Debug, Clone)]
pub struct ImageDecal {
    x: i32,
    y: i32,
    image: RgbImage,
}

impl ImageDecal {
    pub fn new(x: i32, y: i32, image: RgbImage) -> Self {
        Self { x, y, image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl Decal for ImageDecal {
    fn paint_decal(&self, g: &mut dyn Graphics) {
        g.draw_image(self.x, self.y, &self.image);
    }

    fn is_opaque(&self) -> bool {
        !self.image.has_alpha()
    }
}

// ============================================================================
// Tests
// ============================================================================
