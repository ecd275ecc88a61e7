//! Saturation compositing of transparent samples.
//!
//! A [`Buffer`] holds one accumulator cell per pixel that needs general
//! compositing. Samples are folded in with `weight = min(1 - alpha, a)`, so
//! the first samples added take precedence and a cell stops changing once
//! its alpha reaches 1. The [`Compositor`] decides how the accumulated alpha
//! is presented when the cell is turned back into a pixel.

use std::fmt;
use std::sync::Arc;

use crate::basics::unit_to_byte;
use crate::color::{alpha_of, pack_argb, OPAQUE_ALPHA};

// ============================================================================
// Compositor trait
// ============================================================================

/// Strategy for presenting accumulated alpha.
pub trait Compositor: fmt::Debug + Send + Sync {
    /// Map an accumulated alpha in (0, 1] to the alpha actually displayed.
    fn scale_alpha(&self, alpha: f32) -> f32;
}

/// Plain saturation: accumulated alpha is displayed as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaturationCompositor;

impl Compositor for SaturationCompositor {
    #[inline]
    fn scale_alpha(&self, alpha: f32) -> f32 {
        alpha
    }
}

/// Saturation compositor instance.
pub const SATURATION: SaturationCompositor = SaturationCompositor;

/// Saturation with a floor: any non-zero alpha is displayed as at least
/// `boost`, so single faint points in a dense cloud stay visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostCompositor {
    boost: f32,
}

impl BoostCompositor {
    /// Boost is clamped to [0, 1].
    pub fn new(boost: f32) -> Self {
        Self {
            boost: boost.clamp(0.0, 1.0),
        }
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }
}

impl Compositor for BoostCompositor {
    #[inline]
    fn scale_alpha(&self, alpha: f32) -> f32 {
        if alpha > 0.0 {
            self.boost + (1.0 - self.boost) * alpha
        } else {
            0.0
        }
    }
}

/// Compositor for a user-supplied boost level; 0 means plain saturation.
pub fn compositor_for_boost(boost: f32) -> Arc<dyn Compositor> {
    if boost > 0.0 {
        Arc::new(BoostCompositor::new(boost))
    } else {
        Arc::new(SATURATION)
    }
}

// ============================================================================
// Buffer
// ============================================================================

/// Per-cell layout inside `Buffer::cells`.
const ALPHA: usize = 0;
const WR: usize = 1;
const WG: usize = 2;
const WB: usize = 3;
const CELL: usize = 4;

/// A fixed number of independent accumulator cells.
#[derive(Debug, Clone)]
pub struct Buffer {
    compositor: Arc<dyn Compositor>,
    cells: Vec<f32>,
}

impl Buffer {
    /// Create `count` cleared cells presented through `compositor`.
    pub fn new(compositor: Arc<dyn Compositor>, count: usize) -> Self {
        Self {
            compositor,
            cells: vec![0.0; count * CELL],
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len() / CELL
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Accumulated alpha of cell `index`, never above 1.
    #[inline]
    pub fn alpha(&self, index: usize) -> f32 {
        self.cells[index * CELL + ALPHA]
    }

    /// Fold one straight-alpha sample into cell `index`.
    ///
    /// Returns `true` if the cell is saturated after the call, including
    /// when it already was and the sample was ignored.
    #[inline]
    pub fn add_sample(&mut self, index: usize, r: f32, g: f32, b: f32, alpha: f32) -> bool {
        let cell = &mut self.cells[index * CELL..(index + 1) * CELL];
        let weight = (1.0 - cell[ALPHA]).min(alpha);
        if weight > 0.0 {
            cell[ALPHA] += weight;
            cell[WR] += weight * r;
            cell[WG] += weight * g;
            cell[WB] += weight * b;
        }
        cell[ALPHA] >= 1.0
    }

    /// Fold in a packed 0xRRGGBB color with an explicit alpha.
    #[inline]
    pub fn add_rgb(&mut self, index: usize, rgb: u32, alpha: f32) -> bool {
        const S: f32 = 1.0 / 255.0;
        self.add_sample(
            index,
            ((rgb >> 16) & 0xff) as f32 * S,
            ((rgb >> 8) & 0xff) as f32 * S,
            (rgb & 0xff) as f32 * S,
            alpha,
        )
    }

    /// Fold in a packed 0xAARRGGBB color, alpha taken from the top byte.
    #[inline]
    pub fn add_argb(&mut self, index: usize, argb: u32) -> bool {
        self.add_rgb(index, argb, alpha_of(argb) as f32 / 255.0)
    }

    /// Straight-alpha 0xAARRGGBB for cell `index`, with the compositor's
    /// alpha scaling applied. An untouched cell gives 0.
    pub fn to_rgb_int(&self, index: usize) -> u32 {
        let cell = &self.cells[index * CELL..(index + 1) * CELL];
        let a = cell[ALPHA];
        if a <= 0.0 {
            return 0;
        }
        let scale = 1.0 / a;
        let alpha = self.compositor.scale_alpha(a.min(1.0));
        pack_argb(
            unit_to_byte(alpha),
            unit_to_byte(cell[WR] * scale),
            unit_to_byte(cell[WG] * scale),
            unit_to_byte(cell[WB] * scale),
        )
    }

    /// Reset cell `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.cells[index * CELL..(index + 1) * CELL].fill(0.0);
    }

    /// Reset every cell.
    pub fn clear_all(&mut self) {
        self.cells.fill(0.0);
    }
}

// ============================================================================
// Source-over onto opaque and transparent destinations
// ============================================================================

/// Blend a straight-alpha 0xAARRGGBB source over an opaque destination.
///
/// A fully transparent source returns `dst_rgb` untouched and a fully opaque
/// one returns the source color; the result is always flagged opaque
/// otherwise.
#[inline]
pub fn src_over_opaque(src_argb: u32, dst_rgb: u32) -> u32 {
    let sa = alpha_of(src_argb);
    if sa == 0 {
        return dst_rgb;
    }
    if sa == 0xff {
        return src_argb | OPAQUE_ALPHA;
    }
    let a = sa as f32 / 255.0;
    let ia = 1.0 - a;
    let mix = |shift: u32| {
        let s = ((src_argb >> shift) & 0xff) as f32;
        let d = ((dst_rgb >> shift) & 0xff) as f32;
        ((s * a + d * ia) + 0.5) as u32
    };
    pack_argb(0xff, mix(16), mix(8), mix(0))
}

/// Blend a straight-alpha source over a destination that may itself be
/// transparent. Painting one color over an empty pixel, or over a pixel
/// of the same color, preserves the RGB exactly.
#[inline]
pub fn src_over(src_argb: u32, dst_argb: u32) -> u32 {
    let sa = alpha_of(src_argb);
    if sa == 0 {
        return dst_argb;
    }
    let da = alpha_of(dst_argb);
    if sa == 0xff || da == 0 {
        return src_argb;
    }
    if da == 0xff {
        return src_over_opaque(src_argb, dst_argb);
    }
    let a = sa as f32 / 255.0;
    let b = da as f32 / 255.0 * (1.0 - a);
    let out_a = a + b;
    let mix = |shift: u32| {
        let s = ((src_argb >> shift) & 0xff) as f32;
        let d = ((dst_argb >> shift) & 0xff) as f32;
        (((s * a + d * b) / out_a) + 0.5) as u32
    };
    pack_argb(unit_to_byte(out_a), mix(16), mix(8), mix(0))
}

// ============================================================================
// Tests
// ============================================================================
