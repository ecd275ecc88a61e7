//! General multi-color 2D bitmap paper.
//!
//! Every pixel gets a compositor cell. Under saturation compositing the
//! first samples into a cell dominate, so layers are painted in descending
//! order to let later layers take precedence, matching how they would stack
//! when drawn one over another.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::basics::RectI;
use crate::color::Color;
use crate::compositor::{src_over_opaque, Buffer, Compositor};
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::paper::{DataIcon, LayerOrder, Paper, Paper2D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType2D};
use crate::raster_paper::{for_each_decal_pixel, for_each_glyph_pixel, RasterBase};

/// Paper type compositing arbitrary colors and opacities in 2D.
#[derive(Debug, Clone)]
pub struct CompositePaperType2D {
    compositor: Arc<dyn Compositor>,
}

impl CompositePaperType2D {
    pub fn new(compositor: Arc<dyn Compositor>) -> Self {
        Self { compositor }
    }
}

impl PaperType for CompositePaperType2D {
    fn kind(&self) -> PaperKind {
        PaperKind::Composite
    }

    fn layer_order(&self) -> LayerOrder {
        LayerOrder::Descending
    }
}

impl PaperType2D for CompositePaperType2D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper2D>> {
        let base = RasterBase::new(surface)?;
        debug!(bounds = ?base.bounds, "created composite paper");
        Ok(Box::new(CompositePaper {
            buffer: Buffer::new(self.compositor.clone(), base.pixel_count()),
            base,
            last_color: None,
        }))
    }
}

struct CompositePaper {
    base: RasterBase,
    buffer: Buffer,
    last_color: Option<(Color, [f32; 4])>,
}

impl CompositePaper {
    fn rgba(&mut self, color: Color) -> [f32; 4] {
        match self.last_color {
            Some((c, rgba)) if c == color => rgba,
            _ => {
                let rgba = color.to_rgba_f32();
                self.last_color = Some((color, rgba));
                rgba
            }
        }
    }
}

impl Paper for CompositePaper {
    fn bounds(&self) -> RectI {
        self.base.bounds
    }

    fn place_decal(&mut self, decal: &dyn Decal) {
        let buffer = &mut self.buffer;
        for_each_decal_pixel(&self.base.bounds, decal, |i, argb| {
            buffer.add_argb(i, argb);
        });
    }

    fn flush(mut self: Box<Self>) -> DataIcon {
        let mut touched = 0usize;
        let pixels = self.base.image.pixels_mut();
        for (i, dst) in pixels.iter_mut().enumerate() {
            if self.buffer.alpha(i) <= 0.0 {
                continue;
            }
            touched += 1;
            *dst = src_over_opaque(self.buffer.to_rgb_int(i), *dst);
        }
        trace!(touched, "flushed composite paper");
        self.base.into_icon()
    }
}

impl Paper2D for CompositePaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color) {
        let [r, g, b, a] = self.rgba(color);
        if a <= 0.0 {
            return;
        }
        let buffer = &mut self.buffer;
        for_each_glyph_pixel(&self.base.bounds, gx, gy, glyph, |i| {
            buffer.add_sample(i, r, g, b, a);
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::SATURATION;
    use crate::glyph::ImageDecal;
    use crate::marker::{MarkerGlyph, MarkerShape};
    use crate::paper::PlainSurface;
    use crate::rgb_image::RgbImage;

    fn paper() -> Box<dyn Paper2D> {
        let s = PlainSurface::new(RectI::from_xywh(0, 0, 5, 5), Color::WHITE);
        CompositePaperType2D::new(Arc::new(SATURATION))
            .create_paper(&s)
            .unwrap()
    }

    #[test]
    fn test_descending_layers() {
        let t = CompositePaperType2D::new(Arc::new(SATURATION));
        assert_eq!(t.layer_order(), LayerOrder::Descending);
        assert_eq!(t.kind(), PaperKind::Composite);
    }

    #[test]
    fn test_first_opaque_sample_wins() {
        let dot = MarkerGlyph::point();
        let mut p = paper();
        p.place_glyph(1.0, 1.0, &dot, Color::GREEN);
        p.place_glyph(1.0, 1.0, &dot, Color::RED);
        assert_eq!(p.flush().to_image().color(1, 1), Color::GREEN);
    }

    #[test]
    fn test_mixed_translucent_colors() {
        let dot = MarkerGlyph::point();
        let mut p = paper();
        p.place_glyph(2.0, 2.0, &dot, Color::RED.with_alpha(0.5));
        p.place_glyph(2.0, 2.0, &dot, Color::BLUE.with_alpha(0.5));
        let c = p.flush().to_image().color(2, 2);
        // Equal weights of red and blue, fully covering the white background.
        assert!((c.r as i32 - 128).abs() <= 1, "{:?}", c);
        assert!((c.b as i32 - 127).abs() <= 1, "{:?}", c);
        assert!(c.g <= 1, "{:?}", c);
    }

    #[test]
    fn test_untouched_pixels_keep_background() {
        let square = MarkerGlyph::new(MarkerShape::FilledSquare, 1);
        let mut p = paper();
        p.place_glyph(1.0, 1.0, &square, Color::BLACK.with_alpha(0.25));
        let img = p.flush().to_image();
        assert_eq!(img.color(4, 4), Color::WHITE);
        let c = img.color(0, 0);
        assert!(c.r < 255 && c.r > 150, "{:?}", c);
    }

    #[test]
    fn test_decal_samples() {
        let mut img = RgbImage::new_argb(1, 1);
        img.set(0, 0, 0xff00_00ff);
        let mut p = paper();
        p.place_decal(&ImageDecal::new(4, 0, img));
        p.place_glyph(4.0, 0.0, &MarkerGlyph::point(), Color::RED);
        assert_eq!(p.flush().to_image().color(4, 0), Color::BLUE);
    }

    #[test]
    fn test_offplot_positions_ignored() {
        let glyph = MarkerGlyph::new(MarkerShape::FilledSquare, 2);
        let mut p = paper();
        for (x, y) in [
            (-5e9, 3.0),
            (5e9, 3.0),
            (3.0, -2147483648.5),
            (f64::INFINITY, f64::NEG_INFINITY),
            (f64::NAN, 1.0),
        ] {
            p.place_glyph(x, y, &glyph, Color::RED.with_alpha(0.5));
        }
        assert_eq!(p.flush().to_image(), paper().flush().to_image());
    }
}
