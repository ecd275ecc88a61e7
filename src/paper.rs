//! Paper: per-render accumulation state, and the collaborators that feed it.
//!
//! A paper lives for exactly one render pass. It is created by a paper type
//! (see [`crate::paper_type`]) with the background already painted, receives
//! any number of glyph and decal placements, and is consumed by
//! [`Paper::flush`], which turns it into a [`DataIcon`].
//!
//! The collaborator traits here are what callers implement:
//! - [`Surface`] supplies plot bounds and paints the background.
//! - [`Drawing2D`] and [`Drawing3D`] paint one layer of glyphs and decals
//!   onto a paper.
//! - [`DataStore`] is the read-only data access handle drawings read from.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::basics::RectI;
use crate::color::Color;
use crate::error::{RenderError, Result};
use crate::glyph::{Decal, Glyph};
use crate::graphics::{Graphics, ImageGraphics, Recording};
use crate::rgb_image::RgbImage;

// ============================================================================
// Paper traits
// ============================================================================

/// Accumulation state for one render pass.
pub trait Paper {
    /// Plot bounds in graphics coordinates. Fixed for the paper's lifetime.
    fn bounds(&self) -> RectI;

    /// Paint a decal as a unit.
    fn place_decal(&mut self, decal: &dyn Decal);

    /// Finish the pass and hand back the result.
    fn flush(self: Box<Self>) -> DataIcon;
}

/// Paper accepting glyphs at 2D graphics positions.
pub trait Paper2D: Paper {
    /// Place `glyph` with its origin at the pixel containing (gx, gy).
    fn place_glyph(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color);
}

/// Paper accepting glyphs at 2D graphics positions plus a depth.
///
/// Smaller `dz` is nearer the viewer.
pub trait Paper3D: Paper {
    /// Place `glyph` with its origin at the pixel containing (gx, gy), at
    /// depth `dz`.
    fn place_glyph(&mut self, gx: f64, gy: f64, dz: f64, glyph: &dyn Glyph, color: Color);
}

// ============================================================================
// Collaborators
// ============================================================================

/// The region being plotted and its background.
pub trait Surface {
    /// Plot bounds in graphics coordinates.
    fn plot_bounds(&self) -> RectI;

    /// Paint the plot background into `g`, which covers the plot bounds.
    fn paint_background(&self, g: &mut dyn Graphics);
}

/// Surface that fills its bounds with a single color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlainSurface {
    bounds: RectI,
    background: Color,
}

impl PlainSurface {
    pub fn new(bounds: RectI, background: Color) -> Self {
        Self { bounds, background }
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

impl Surface for PlainSurface {
    fn plot_bounds(&self) -> RectI {
        self.bounds
    }

    fn paint_background(&self, g: &mut dyn Graphics) {
        g.fill_rect(
            self.bounds.x1,
            self.bounds.y1,
            self.bounds.width(),
            self.bounds.height(),
            self.background,
        );
    }
}

/// Read-only data access shared by every drawing in a render.
pub trait DataStore: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl DataStore for () {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One plot layer, able to paint itself onto a 2D paper.
pub trait Drawing2D {
    /// Paint this layer's glyphs and decals. `plan` is the layer's
    /// precomputed plan object; drawings downcast it to their own type.
    fn paint_data(
        &self,
        plan: &dyn Any,
        paper: &mut dyn Paper2D,
        data_store: &dyn DataStore,
    ) -> Result<()>;
}

/// One plot layer, able to paint itself onto a 3D paper.
pub trait Drawing3D {
    fn paint_data(
        &self,
        plan: &dyn Any,
        paper: &mut dyn Paper3D,
        data_store: &dyn DataStore,
    ) -> Result<()>;
}

/// Downcast a plan object, reporting the layer on mismatch.
pub fn plan_as<T: Any>(plan: &dyn Any, layer: usize) -> Result<&T> {
    plan.downcast_ref::<T>().ok_or_else(|| RenderError::Plan {
        layer,
        reason: format!("plan is not a {}", std::any::type_name::<T>()),
    })
}

/// Validate that a surface's bounds describe at least one pixel.
pub(crate) fn checked_bounds(surface: &dyn Surface) -> Result<RectI> {
    let b = surface.plot_bounds();
    if b.width() <= 0 || b.height() <= 0 {
        return Err(RenderError::InvalidBounds {
            width: b.x2 - b.x1 + 1,
            height: b.y2 - b.y1 + 1,
        });
    }
    Ok(b)
}

// ============================================================================
// Paper kinds and layer order
// ============================================================================

/// Order in which a paper type walks the drawing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrder {
    Ascending,
    Descending,
}

impl LayerOrder {
    /// Layer indices for `count` layers in this order.
    pub fn indices(self, count: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            LayerOrder::Ascending => Box::new(0..count),
            LayerOrder::Descending => Box::new((0..count).rev()),
        }
    }
}

/// The concrete paper type families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperKind {
    Paint,
    Sorted,
    Over,
    Mono,
    Composite,
    ZBuffer,
    PixelStack,
}

impl PaperKind {
    pub const ALL: [PaperKind; 7] = [
        PaperKind::Paint,
        PaperKind::Sorted,
        PaperKind::Over,
        PaperKind::Mono,
        PaperKind::Composite,
        PaperKind::ZBuffer,
        PaperKind::PixelStack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaperKind::Paint => "Paint",
            PaperKind::Sorted => "Sorted",
            PaperKind::Over => "Over",
            PaperKind::Mono => "Mono",
            PaperKind::Composite => "Composite",
            PaperKind::ZBuffer => "ZBuffer",
            PaperKind::PixelStack => "PixelStack",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    pub fn is_bitmap(self) -> bool {
        !matches!(self, PaperKind::Paint | PaperKind::Sorted)
    }

    /// Whether papers of this kind accept 2D placement.
    pub fn supports_2d(self) -> bool {
        matches!(
            self,
            PaperKind::Paint | PaperKind::Over | PaperKind::Mono | PaperKind::Composite
        )
    }

    /// Whether papers of this kind accept 3D placement.
    pub fn supports_3d(self) -> bool {
        matches!(
            self,
            PaperKind::Sorted | PaperKind::Mono | PaperKind::ZBuffer | PaperKind::PixelStack
        )
    }
}

impl fmt::Display for PaperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// DataIcon
// ============================================================================

/// Finished output of a render pass.
#[derive(Debug, Clone)]
pub enum DataIcon {
    /// Pixels covering `bounds`, top-left at the bounds origin.
    Raster { bounds: RectI, image: Arc<RgbImage> },
    /// Drawing calls in graphics coordinates, clipped to `bounds`.
    Vector { bounds: RectI, recording: Recording },
}

impl DataIcon {
    /// Paint the result onto `g`, shifted by (x, y).
    pub fn paint(&self, g: &mut dyn Graphics, x: i32, y: i32) {
        match self {
            DataIcon::Raster { bounds, image } => g.draw_image(x + bounds.x1, y + bounds.y1, image),
            DataIcon::Vector { recording, .. } => recording.replay(g, x, y),
        }
    }

    pub fn bounds(&self) -> RectI {
        match self {
            DataIcon::Raster { bounds, .. } | DataIcon::Vector { bounds, .. } => *bounds,
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, DataIcon::Raster { .. })
    }

    /// Render the result into a fresh alpha image covering its bounds.
    pub fn to_image(&self) -> RgbImage {
        let b = self.bounds();
        let mut image = RgbImage::new_argb(b.width() as usize, b.height() as usize);
        let mut g = ImageGraphics::with_origin(&mut image, b.x1, b.y1);
        self.paint(&mut g, 0, 0);
        image
    }

    /// Rasterize a vector result once so repeated painting is cheap.
    /// Raster results are returned unchanged.
    pub fn into_cached(self) -> DataIcon {
        match self {
            DataIcon::Raster { .. } => self,
            DataIcon::Vector { bounds, .. } => {
                let image = Arc::new(self.to_image());
                DataIcon::Raster { bounds, image }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
