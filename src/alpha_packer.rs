//! 8-bit alpha quantization for packed pixel-stack samples.
//!
//! Linear packing is fine while every contribution is at least 1/255.
//! Large faint point clouds go well below that, so a logarithmic scale is
//! used instead, mapping `min_alpha` to 255 and 1 to 0 with constant
//! relative error in between.

use tracing::debug;

/// Smallest alpha the linear scale can represent without collapsing to 0.
pub const LINEAR_MIN_ALPHA: f32 = 1.0 / 255.0;

/// Alpha packing policy, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum AlphaPacker {
    /// `byte = ceil(255 * alpha)`.
    Linear,
    /// `byte = round(-ln(alpha) / scale)`, decoded through a lookup table.
    Log {
        min_alpha: f32,
        scale: f64,
        table: Box<[f32; 256]>,
    },
}

impl AlphaPacker {
    /// Packer that can represent every alpha down to `min_alpha`.
    pub fn new(min_alpha: f32) -> Self {
        if min_alpha.is_nan() || min_alpha >= LINEAR_MIN_ALPHA {
            return AlphaPacker::Linear;
        }
        let min_alpha = min_alpha.max(f32::MIN_POSITIVE);
        let scale = -(min_alpha as f64).ln() / 255.0;
        let mut table = Box::new([0f32; 256]);
        for (b, slot) in table.iter_mut().enumerate() {
            *slot = (-(b as f64) * scale).exp() as f32;
        }
        table[0] = 1.0;
        table[255] = min_alpha;
        debug!(min_alpha, scale, "using logarithmic alpha packing");
        AlphaPacker::Log {
            min_alpha,
            scale,
            table,
        }
    }

    pub fn is_logarithmic(&self) -> bool {
        matches!(self, AlphaPacker::Log { .. })
    }

    /// Quantize an alpha in (0, 1] to a byte.
    #[inline]
    pub fn pack(&self, alpha: f32) -> u8 {
        match self {
            AlphaPacker::Linear => (alpha * 255.0).ceil().clamp(0.0, 255.0) as u8,
            AlphaPacker::Log {
                min_alpha, scale, ..
            } => {
                if alpha >= 1.0 {
                    0
                } else if alpha <= *min_alpha {
                    255
                } else {
                    (-(alpha as f64).ln() / scale).round().clamp(0.0, 255.0) as u8
                }
            }
        }
    }

    /// Recover the alpha a byte stands for.
    #[inline]
    pub fn unpack(&self, byte: u8) -> f32 {
        match self {
            AlphaPacker::Linear => byte as f32 / 255.0,
            AlphaPacker::Log { table, .. } => table[byte as usize],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
