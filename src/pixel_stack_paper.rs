//! Order-independent transparency for 3D bitmaps.
//!
//! Each pixel collects every sample that lands on it as a packed `u64`
//! key. The high word is the depth mapped to an unsigned integer with the
//! same ordering, the low word is `0xRRGGBBaa` with the alpha quantized by
//! an [`AlphaPacker`]. At flush a plain integer sort puts each pixel's
//! samples front to back, and they are composited until saturation.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::alpha_packer::AlphaPacker;
use crate::basics::RectI;
use crate::color::{alpha_of, Color};
use crate::compositor::{src_over_opaque, Buffer, Compositor};
use crate::error::Result;
use crate::glyph::{Decal, Glyph};
use crate::paper::{DataIcon, Paper, Paper3D, PaperKind, Surface};
use crate::paper_type::{PaperType, PaperType3D};
use crate::raster_paper::{for_each_decal_pixel, for_each_glyph_pixel, RasterBase};

/// Map an `f32` to a `u32` whose unsigned order matches the float's total
/// order, negatives below positives.
#[inline]
pub fn depth_order_bits(z: f32) -> u32 {
    let bits = z.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

/// Pack depth, color and quantized alpha into one sortable key.
#[inline]
pub fn pack_sample(z: f32, rgb: u32, alpha_byte: u8) -> u64 {
    ((depth_order_bits(z) as u64) << 32) | (((rgb & 0x00ff_ffff) as u64) << 8) | alpha_byte as u64
}

/// RGB and alpha byte from a packed key.
#[inline]
pub fn unpack_sample(key: u64) -> (u32, u8) {
    (((key >> 8) & 0x00ff_ffff) as u32, key as u8)
}

/// Paper type compositing arbitrary colors in 3D, independent of
/// submission order.
#[derive(Debug, Clone)]
pub struct PixelStackPaperType3D {
    compositor: Arc<dyn Compositor>,
    packer: Arc<AlphaPacker>,
    min_alpha: f32,
}

impl PixelStackPaperType3D {
    /// `min_alpha` is the faintest per-sample alpha that must survive
    /// quantization.
    pub fn new(compositor: Arc<dyn Compositor>, min_alpha: f32) -> Self {
        Self {
            compositor,
            packer: Arc::new(AlphaPacker::new(min_alpha)),
            min_alpha,
        }
    }

    pub fn min_alpha(&self) -> f32 {
        self.min_alpha
    }

    pub fn packer(&self) -> &AlphaPacker {
        &self.packer
    }
}

impl PaperType for PixelStackPaperType3D {
    fn kind(&self) -> PaperKind {
        PaperKind::PixelStack
    }
}

impl PaperType3D for PixelStackPaperType3D {
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper3D>> {
        let base = RasterBase::new(surface)?;
        debug!(
            bounds = ?base.bounds,
            logarithmic = self.packer.is_logarithmic(),
            "created pixel stack paper"
        );
        Ok(Box::new(PixelStackPaper {
            stacks: vec![None; base.pixel_count()],
            base,
            compositor: self.compositor.clone(),
            packer: self.packer.clone(),
            last_color: None,
        }))
    }
}

struct PixelStackPaper {
    base: RasterBase,
    compositor: Arc<dyn Compositor>,
    packer: Arc<AlphaPacker>,
    stacks: Vec<Option<Vec<u64>>>,
    /// Last color placed and its packed low word.
    last_color: Option<(Color, u32)>,
}

impl PixelStackPaper {
    fn low_word(&mut self, color: Color) -> u32 {
        match self.last_color {
            Some((c, low)) if c == color => low,
            _ => {
                let low = (color.rgb() << 8) | self.packer.pack(color.opacity()) as u32;
                self.last_color = Some((color, low));
                low
            }
        }
    }

    fn push(stacks: &mut [Option<Vec<u64>>], i: usize, key: u64) {
        stacks[i].get_or_insert_with(Vec::new).push(key);
    }
}

impl Paper for PixelStackPaper {
    fn bounds(&self) -> RectI {
        self.base.bounds
    }

    fn place_decal(&mut self, decal: &dyn Decal) {
        let packer = &self.packer;
        let stacks = &mut self.stacks;
        for_each_decal_pixel(&self.base.bounds, decal, |i, argb| {
            let alpha = packer.pack(alpha_of(argb) as f32 / 255.0);
            Self::push(stacks, i, pack_sample(f32::INFINITY, argb, alpha));
        });
    }

    fn flush(mut self: Box<Self>) -> DataIcon {
        let mut cell = Buffer::new(self.compositor.clone(), 1);
        let mut touched = 0usize;
        let mut max_depth = 0usize;
        let pixels = self.base.image.pixels_mut();
        for (dst, stack) in pixels.iter_mut().zip(self.stacks.iter_mut()) {
            let Some(samples) = stack.as_mut() else {
                continue;
            };
            touched += 1;
            max_depth = max_depth.max(samples.len());
            if samples.len() > 1 {
                samples.sort_unstable();
            }
            for &key in samples.iter() {
                let (rgb, alpha) = unpack_sample(key);
                if cell.add_rgb(0, rgb, self.packer.unpack(alpha)) {
                    break;
                }
            }
            *dst = src_over_opaque(cell.to_rgb_int(0), *dst);
            cell.clear(0);
        }
        trace!(touched, max_depth, "flushed pixel stack paper");
        self.base.into_icon()
    }
}

impl Paper3D for PixelStackPaper {
    fn place_glyph(&mut self, gx: f64, gy: f64, dz: f64, glyph: &dyn Glyph, color: Color) {
        if color.is_transparent() {
            return;
        }
        let z = dz as f32;
        debug_assert!(!z.is_nan(), "NaN depth");
        if z.is_nan() {
            return;
        }
        let key = ((depth_order_bits(z) as u64) << 32) | self.low_word(color) as u64;
        let stacks = &mut self.stacks;
        for_each_glyph_pixel(&self.base.bounds, gx, gy, glyph, |i| {
            Self::push(stacks, i, key);
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
    use crate::marker::MarkerGlyph;
    use crate::paper::PlainSurface;
    use crate::rgb_image::RgbImage;

    fn paper(min_alpha: f32) -> Box<dyn Paper3D> {
        let s = PlainSurface::new(RectI::from_xywh(0, 0, 3, 3), Color::WHITE);
        PixelStackPaperType3D::new(Arc::new(SATURATION), min_alpha)
            .create_paper(&s)
            .unwrap()
    }

    #[test]
    fn test_depth_order_bits() {
        let zs = [
            f32::NEG_INFINITY,
            -1e30,
            -2.5,
            -0.0,
            0.0,
            1e-30,
            3.0,
            1e30,
            f32::INFINITY,
        ];
        for w in zs.windows(2) {
            assert!(depth_order_bits(w[0]) < depth_order_bits(w[1]), "{:?}", w);
        }
    }

    #[test]
    fn test_sample_keys_sort_by_depth() {
        let near = pack_sample(1.0, 0xffffff, 255);
        let far = pack_sample(2.0, 0x000000, 1);
        assert!(near < far);
        assert_eq!(unpack_sample(near), (0xffffff, 255));
        assert_eq!(unpack_sample(far), (0, 1));
    }

    #[test]
    fn test_order_independence() {
        let dot = MarkerGlyph::point();
        let samples = [
            (1.0, Color::RED.with_alpha(0.3)),
            (2.0, Color::GREEN.with_alpha(0.3)),
            (3.0, Color::BLUE),
        ];
        let orders = [[0, 1, 2], [2, 1, 0], [1, 2, 0], [2, 0, 1]];
        let mut results = Vec::new();
        for order in orders {
            let mut p = paper(1.0 / 255.0);
            for i in order {
                let (z, c) = samples[i];
                p.place_glyph(1.0, 1.0, z, &dot, c);
            }
            results.push(p.flush().to_image());
        }
        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        // Red and green each take their own alpha, blue fills the remaining
        // coverage and saturates the pixel.
        let c = results[0].color(1, 1);
        assert!(c.b > c.r, "{:?}", c);
        assert!((c.r as i32 - 77).abs() <= 1, "{:?}", c);
        assert!((c.g as i32 - 77).abs() <= 1, "{:?}", c);
        assert!((c.b as i32 - 101).abs() <= 1, "{:?}", c);
    }

    #[test]
    fn test_single_sample_over_background() {
        let dot = MarkerGlyph::point();
        let mut p = paper(1.0 / 255.0);
        p.place_glyph(0.0, 0.0, 5.0, &dot, Color::BLACK.with_alpha(0.5));
        let img = p.flush().to_image();
        assert!((img.color(0, 0).r as i32 - 127).abs() <= 1);
        assert_eq!(img.color(2, 2), Color::WHITE);
    }

    #[test]
    fn test_faint_samples_accumulate_with_log_packing() {
        let dot = MarkerGlyph::point();
        let mut p = paper(1e-4);
        for i in 0..200 {
            p.place_glyph(2.0, 2.0, i as f64, &dot, Color::BLACK.with_alpha(1e-3));
        }
        // About 0.2 total coverage. Linear packing would round each sample
        // up to 1/255 and give nearly 0.8.
        let c = p.flush().to_image().color(2, 2);
        assert!((c.r as i32 - 204).abs() <= 3, "{:?}", c);
    }

    #[test]
    fn test_decal_behind_glyphs() {
        let dot = MarkerGlyph::point();
        let mut p = paper(1.0 / 255.0);
        p.place_decal(&ImageDecal::new(0, 0, RgbImage::new_rgb(3, 1, Color::BLUE)));
        p.place_glyph(1.0, 0.0, 1e6, &dot, Color::RED);
        let img = p.flush().to_image();
        assert_eq!(img.color(1, 0), Color::RED);
        assert_eq!(img.color(0, 0), Color::BLUE);
        assert_eq!(img.color(0, 1), Color::WHITE);
    }

    #[test]
    fn test_offplot_positions_ignored() {
        let glyph = MarkerGlyph::point();
        let mut p = paper(1.0 / 255.0);
        for (x, y) in [
            (-5e9, 3.0),
            (5e9, 3.0),
            (3.0, -2147483648.5),
            (f64::INFINITY, f64::NEG_INFINITY),
            (f64::NAN, 1.0),
        ] {
            p.place_glyph(x, y, 1.0, &glyph, Color::RED);
        }
        assert_eq!(p.flush().to_image(), paper(1.0 / 255.0).flush().to_image());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "NaN depth")]
    fn test_nan_depth_rejected() {
        let mut p = paper(1.0 / 255.0);
        p.place_glyph(1.0, 1.0, f64::NAN, &MarkerGlyph::point(), Color::RED);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_nan_depth_dropped() {
        let mut p = paper(1.0 / 255.0);
        p.place_glyph(1.0, 1.0, f64::NAN, &MarkerGlyph::point(), Color::RED);
        assert_eq!(p.flush().to_image(), paper(1.0 / 255.0).flush().to_image());
    }
}
