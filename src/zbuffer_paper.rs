//! Opaque 3D bitmap paper using a depth buffer.

use tracing::debug;

use crate::basics::RectI;
use crate::color::{Color, OPAQUE_ALPHA};
use crate::compositor::src_over_opaque;
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::paper::{DataIcon, Paper, Paper3D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType3D};
use crate::raster_paper::{for_each_decal_pixel, for_each_glyph_pixel, RasterBase};

/// Paper type keeping the nearest opaque sample at each pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZBufferPaperType3D;

impl PaperType for ZBufferPaperType3D {
    fn kind(&self) -> PaperKind {
        PaperKind::ZBuffer
    }
}

impl PaperType3D for ZBufferPaperType3D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper3D>> {
        let base = RasterBase::new(surface)?;
        debug!(bounds = ?base.bounds, "created z-buffer paper");
        Ok(Box::new(ZBufferPaper {
            depths: vec![f32::INFINITY; base.pixel_count()],
            base,
        }))
    }
}

struct ZBufferPaper {
    base: RasterBase,
    depths: Vec<f32>,
}

impl Paper for ZBufferPaper {
    fn bounds(&self) -> RectI {
        self.base.bounds
    }

    /// Decals sit behind everything at infinite depth, so they only show
    /// where no glyph has landed.
    fn place_decal(&mut self, decal: &dyn Decal) {
        let depths = &self.depths;
        let pixels = self.base.image.pixels_mut();
        let bounds = self.base.bounds;
        for_each_decal_pixel(&bounds, decal, |i, argb| {
            if f32::INFINITY <= depths[i] {
                pixels[i] = src_over_opaque(argb, pixels[i]);
            }
        });
    }

    fn flush(self: Box<Self>) -> DataIcon {
        self.base.into_icon()
    }
}

impl Paper3D for ZBufferPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, dz: f64, glyph: &dyn Glyph, color: Color) {
        let z = dz as f32;
        debug_assert!(!z.is_nan(), "NaN depth");
        if z.is_nan() {
            return;
        }
        let value = color.rgb() | OPAQUE_ALPHA;
        let bounds = self.base.bounds;
        let depths = &mut self.depths;
        let pixels = self.base.image.pixels_mut();
        for_each_glyph_pixel(&bounds, gx, gy, glyph, |i| {
            if z <= depths[i] {
                depths[i] = z;
                pixels[i] = value;
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
