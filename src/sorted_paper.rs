//! Vector 3D paper using the painter's algorithm.
//!
//! Glyph placements are recorded into one shared arena as they arrive,
//! each tagged with its depth and position in submission order. At flush
//! the placements are replayed far to near; equal depths keep submission
//! order. When every placement uses one color the order makes no visible
//! difference and the sort is skipped.

use tracing::{debug, trace};

use crate::basics::{glyph_pixel, RectI};
use crate::color::Color;
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::graphics::Recording;
use crate::paper::{checked_bounds, DataIcon, Paper, Paper3D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType3D};

/// Paper type producing depth-sorted vector output for 3D plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortedPaperType3D;

impl PaperType for SortedPaperType3D {
    fn kind(&self) -> PaperKind {
        PaperKind::Sorted
    }
}

impl PaperType3D for SortedPaperType3D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper3D>> {
        let bounds = checked_bounds(surface)?;
        let mut background = Recording::new(bounds);
        surface.paint_background(&mut background);
        debug!(?bounds, "created sorted paper");
        Ok(Box::new(SortedPaper {
            bounds,
            background,
            arena: Recording::new(bounds),
            items: Vec::new(),
            color: ColorUse::None,
        }))
    }
}

/// One recorded glyph placement: `arena.ops()[start..end]` at `depth`.
#[derive(Debug, Clone, Copy)]
struct Placement {
    depth: f64,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorUse {
    None,
    Single(Color),
    Mixed,
}

struct SortedPaper {
    bounds: RectI,
    /// Background and decals, replayed first.
    background: Recording,
    arena: Recording,
    items: Vec<Placement>,
    color: ColorUse,
}

impl Paper for SortedPaper {
    fn bounds(&self) -> RectI {
        self.bounds
    }

    /// Decals sit behind every glyph.
    fn place_decal(&mut self, decal: &dyn Decal) {
        decal.paint_decal(&mut self.background);
    }

    fn flush(mut self: Box<Self>) -> DataIcon {
        let sorted = self.color == ColorUse::Mixed;
        if sorted {
            // Stable, so equal depths stay in submission order.
            self.items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        }
        trace!(placements = self.items.len(), sorted, "flushed sorted paper");
        let mut recording = self.background;
        let ops = self.arena.ops();
        for item in &self.items {
            recording.extend_from(&ops[item.start..item.end]);
        }
        DataIcon::Vector {
            bounds: self.bounds,
            recording,
        }
    }
}

impl Paper3D for SortedPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, dz: f64, glyph: &dyn Glyph, color: Color) {
        debug_assert!(!dz.is_nan(), "NaN depth");
        if dz.is_nan() {
            return;
        }
        let Some((x, y)) = glyph_pixel(gx, gy) else {
            return;
        };
        let start = self.arena.len();
        glyph.paint_glyph(&mut self.arena, x, y, color);
        let end = self.arena.len();
        if end == start {
            return;
        }
        self.color = match self.color {
            ColorUse::None => ColorUse::Single(color),
            ColorUse::Single(c) if c == color => ColorUse::Single(c),
            _ => ColorUse::Mixed,
        };
        self.items.push(Placement {
            depth: dz,
            start,
            end,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
