//! Vector 2D paper: every placement is recorded as drawing calls straight
//! away, and blending is left to whatever the recording is replayed onto.

use tracing::debug;

use crate::basics::{glyph_pixel, RectI};
use crate::color::Color;
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::graphics::Recording;
use crate::paper::{checked_bounds, DataIcon, Paper, Paper2D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType2D};

/// Paper type producing vector output for 2D plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintPaperType2D;

impl PaperType for PaintPaperType2D {
    fn kind(&self) -> PaperKind {
        PaperKind::Paint
    }
}

impl PaperType2D for PaintPaperType2D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper2D>> {
        let bounds = checked_bounds(surface)?;
        let mut recording = Recording::new(bounds);
        surface.paint_background(&mut recording);
        debug!(?bounds, "created paint paper");
        Ok(Box::new(PaintPaper { bounds, recording }))
    }
}

struct PaintPaper {
    bounds: RectI,
    recording: Recording,
}

impl Paper for PaintPaper {
    fn bounds(&self) -> RectI {
        self.bounds
    }

    fn place_decal(&mut self, decal: &dyn Decal) {
        decal.paint_decal(&mut self.recording);
    }

    fn flush(self: Box<Self>) -> DataIcon {
        DataIcon::Vector {
            bounds: self.bounds,
            recording: self.recording,
        }
    }
}

impl Paper2D for PaintPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color) {
        if let Some((x, y)) = glyph_pixel(gx, gy) {
            glyph.paint_glyph(&mut self.recording, x, y, color);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
