//! Single-color bitmap paper, for 2D and 3D.
//!
//! When every layer draws in the same RGB only the opacity varies between
//! placements, so each pixel needs one running alpha total. Depth is
//! irrelevant for a single color and is ignored in 3D.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::basics::{unit_to_byte, RectI};
use crate::color::{alpha_of, Color, RGB_MASK};
use crate::compositor::{src_over_opaque, Compositor};
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::paper::{DataIcon, Paper, Paper2D, Paper3D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType2D, PaperType3D};
use crate::raster_paper::{for_each_decal_pixel, for_each_glyph_pixel, RasterBase};

/// Paper type accumulating alpha for one fixed RGB.
#[derive(Debug, Clone)]
pub struct MonoPaperType {
    rgb: u32,
    compositor: Arc<dyn Compositor>,
}

impl MonoPaperType {
    /// Only the RGB part of `color` is used.
    pub fn new(color: Color, compositor: Arc<dyn Compositor>) -> Self {
        Self {
            rgb: color.rgb(),
            compositor,
        }
    }

    /// The fixed 0xRRGGBB every placement must use.
    pub fn rgb(&self) -> u32 {
        self.rgb
    }

    fn create_mono_paper(&self, surface: &dyn Surface) -> Result<MonoPaper> {
        let base = RasterBase::new(surface)?;
        debug!(bounds = ?base.bounds, rgb = self.rgb, "created mono paper");
        Ok(MonoPaper {
            alphas: vec![0.0; base.pixel_count()],
            base,
            rgb: self.rgb,
            compositor: self.compositor.clone(),
        })
    }
}

impl PaperType for MonoPaperType {
    fn kind(&self) -> PaperKind {
        PaperKind::Mono
    }
}

impl PaperType2D for MonoPaperType {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper2D>> {
        Ok(Box::new(self.create_mono_paper(surface)?))
    }
}

impl PaperType3D for MonoPaperType {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper3D>> {
        Ok(Box::new(self.create_mono_paper(surface)?))
    }
}

struct MonoPaper {
    base: RasterBase,
    rgb: u32,
    compositor: Arc<dyn Compositor>,
    /// Uncapped alpha total per pixel.
    alphas: Vec<f32>,
}

impl MonoPaper {
    fn place(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color) {
        debug_assert_eq!(color.rgb(), self.rgb, "mono paper given a foreign color");
        let alpha = color.opacity();
        if alpha <= 0.0 {
            return;
        }
        let alphas = &mut self.alphas;
        for_each_glyph_pixel(&self.base.bounds, gx, gy, glyph, |i| alphas[i] += alpha);
    }
}

impl Paper for MonoPaper {
    fn bounds(&self) -> RectI {
        self.base.bounds
    }

    fn place_decal(&mut self, decal: &dyn Decal) {
        let rgb = self.rgb;
        let alphas = &mut self.alphas;
        for_each_decal_pixel(&self.base.bounds, decal, |i, argb| {
            debug_assert_eq!(argb & RGB_MASK, rgb, "decal pixel has a foreign color");
            alphas[i] += alpha_of(argb) as f32 / 255.0;
        });
    }

    fn flush(mut self: Box<Self>) -> DataIcon {
        let mut touched = 0usize;
        let pixels = self.base.image.pixels_mut();
        for (dst, &total) in pixels.iter_mut().zip(&self.alphas) {
            let alpha = total.min(1.0);
            if alpha <= 0.0 {
                continue;
            }
            touched += 1;
            let scaled = self.compositor.scale_alpha(alpha);
            let src = (unit_to_byte(scaled) << 24) | self.rgb;
            *dst = src_over_opaque(src, *dst);
        }
        trace!(touched, "flushed mono paper");
        self.base.into_icon()
    }
}

impl Paper2D for MonoPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color) {
        self.place(gx, gy, glyph, color);
    }
}

impl Paper3D for MonoPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, _dz: f64, glyph: &dyn Glyph, color: Color) {
        self.place(gx, gy, glyph, color);
    }
}

// ============================================================================
// Tests
// ============================================================================
