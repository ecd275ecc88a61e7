//! Opaque 2D bitmap paper.
//!
//! Every covered pixel is overwritten with the glyph color, so the last
//! placement wins. Only correct when every layer is opaque, which is the
//! case the selector picks it for.

use tracing::debug;

use crate::basics::RectI;
use crate::color::{Color, OPAQUE_ALPHA};
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::paper::{DataIcon, Paper, Paper2D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType2D};
use crate::raster_paper::{for_each_glyph_pixel, RasterBase};

/// Paper type overwriting pixels in draw order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverPaperType2D;

impl PaperType for OverPaperType2D {
    fn kind(&self) -> PaperKind {
        PaperKind::Over
    }
}

impl PaperType2D for OverPaperType2D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper2D>> {
        let base = RasterBase::new(surface)?;
        debug!(bounds = ?base.bounds, "created over paper");
        Ok(Box::new(OverPaper { base }))
    }
}

struct OverPaper {
    base: RasterBase,
}

impl Paper for OverPaper {
    fn bounds(&self) -> RectI {
        self.base.bounds
    }

    fn place_decal(&mut self, decal: &dyn Decal) {
        decal.paint_decal(&mut self.base.graphics());
    }

    fn flush(self: Box<Self>) -> DataIcon {
        self.base.into_icon()
    }
}

impl Paper2D for OverPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, glyph: &dyn Glyph, color: Color) {
        let bounds = self.base.bounds;
        let value = color.rgb() | OPAQUE_ALPHA;
        let pixels = self.base.image.pixels_mut();
        for_each_glyph_pixel(&bounds, gx, gy, glyph, |i| pixels[i] = value);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::ImageDecal;
    use crate::marker::{MarkerGlyph, MarkerShape};
    use crate::paper::PlainSurface;
    use crate::rgb_image::RgbImage;

    fn paper() -> Box<dyn Paper2D> {
        let s = PlainSurface::new(RectI::from_xywh(0, 0, 6, 6), Color::WHITE);
        OverPaperType2D.create_paper(&s).unwrap()
    }

    #[test]
    fn test_last_write_wins() {
        let dot = MarkerGlyph::point();
        let mut p = paper();
        p.place_glyph(2.0, 2.0, &dot, Color::RED);
        p.place_glyph(2.0, 2.0, &dot, Color::BLUE);
        assert_eq!(p.flush().to_image().color(2, 2), Color::BLUE);

        let mut p = paper();
        p.place_glyph(2.0, 2.0, &dot, Color::BLUE);
        p.place_glyph(2.0, 2.0, &dot, Color::RED);
        assert_eq!(p.flush().to_image().color(2, 2), Color::RED);
    }

    #[test]
    fn test_no_blending() {
        let square = MarkerGlyph::new(MarkerShape::FilledSquare, 1);
        let mut p = paper();
        p.place_glyph(3.0, 3.0, &square, Color::new(0, 0, 0, 10));
        let img = p.flush().to_image();
        assert_eq!(img.color(2, 4), Color::BLACK);
        assert_eq!(img.color(1, 1), Color::WHITE);
    }

    #[test]
    fn test_decal_painted_directly() {
        let mut p = paper();
        p.place_decal(&ImageDecal::new(4, 5, RgbImage::new_rgb(2, 1, Color::GREEN)));
        let img = p.flush().to_image();
        assert_eq!(img.color(4, 5), Color::GREEN);
        assert_eq!(img.color(5, 5), Color::GREEN);
        assert_eq!(img.color(3, 5), Color::WHITE);
    }

    #[test]
    fn test_kind() {
        assert_eq!(OverPaperType2D.kind(), PaperKind::Over);
        assert!(OverPaperType2D.is_bitmap());
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
            p.place_glyph(x, y, &glyph, Color::RED);
        }
        assert_eq!(p.flush().to_image(), paper().flush().to_image());
    }
}
