//! Picking the cheapest paper type that renders a set of layers correctly.
//!
//! | Layers                                      | 2D        | 3D         |
//! |---------------------------------------------|-----------|------------|
//! | all opaque (or none)                        | Over      | ZBuffer    |
//! | all one color, some transparent             | Mono      | Mono       |
//! | anything else                               | Composite | PixelStack |
//! | vector output                               | Paint     | Sorted     |

use std::sync::Arc;

use tracing::debug;

use crate::alpha_packer::LINEAR_MIN_ALPHA;
use crate::color::Color;
use crate::composite_paper::CompositePaperType2D;
use crate::compositor::Compositor;
use crate::mono_paper::MonoPaperType;
use crate::over_paper::OverPaperType2D;
use crate::paint_paper::PaintPaperType2D;
use crate::paper_type::{PaperType2D, PaperType3D};
use crate::pixel_stack_paper::PixelStackPaperType3D;
use crate::sorted_paper::SortedPaperType3D;
use crate::zbuffer_paper::ZBufferPaperType3D;

/// Rendering hints for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOpt {
    single_color: Option<Color>,
    opaque: bool,
}

impl LayerOpt {
    /// Fully opaque layer, colors unknown.
    pub const OPAQUE: LayerOpt = LayerOpt {
        single_color: None,
        opaque: true,
    };

    /// Layer with no known properties.
    pub const NO_SPECIAL: LayerOpt = LayerOpt {
        single_color: None,
        opaque: false,
    };

    pub fn new(single_color: Option<Color>, opaque: bool) -> Self {
        Self {
            single_color,
            opaque,
        }
    }

    /// Layer painted entirely in `color`, at varying opacity.
    pub fn single_color(color: Color) -> Self {
        Self::new(Some(color), false)
    }

    /// The one color this layer uses, if known.
    pub fn color(&self) -> Option<Color> {
        self.single_color
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }
}

/// Output medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    Bitmap,
    Vector,
}

/// Chooses paper types from layer hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperTypeSelector {
    min_alpha: f32,
}

impl Default for PaperTypeSelector {
    fn default() -> Self {
        Self {
            min_alpha: LINEAR_MIN_ALPHA,
        }
    }
}

impl PaperTypeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faintest per-sample alpha the 3D transparent paper must resolve.
    pub fn with_min_alpha(mut self, min_alpha: f32) -> Self {
        self.min_alpha = min_alpha;
        self
    }

    pub fn min_alpha(&self) -> f32 {
        self.min_alpha
    }

    /// Bitmap paper type for 2D layers.
    pub fn pixel_paper_type_2d(
        &self,
        opts: &[LayerOpt],
        compositor: Arc<dyn Compositor>,
    ) -> Arc<dyn PaperType2D> {
        let ptype: Arc<dyn PaperType2D> = if all_opaque(opts) {
            Arc::new(OverPaperType2D)
        } else if let Some(color) = common_color(opts) {
            Arc::new(MonoPaperType::new(color, compositor))
        } else {
            Arc::new(CompositePaperType2D::new(compositor))
        };
        debug!(layers = opts.len(), paper = %ptype.kind(), "selected 2D paper type");
        ptype
    }

    /// Bitmap paper type for 3D layers.
    pub fn pixel_paper_type_3d(
        &self,
        opts: &[LayerOpt],
        compositor: Arc<dyn Compositor>,
    ) -> Arc<dyn PaperType3D> {
        let ptype: Arc<dyn PaperType3D> = if all_opaque(opts) {
            Arc::new(ZBufferPaperType3D)
        } else if let Some(color) = common_color(opts) {
            Arc::new(MonoPaperType::new(color, compositor))
        } else {
            Arc::new(PixelStackPaperType3D::new(compositor, self.min_alpha))
        };
        debug!(layers = opts.len(), paper = %ptype.kind(), "selected 3D paper type");
        ptype
    }

    /// Vector paper type for 2D layers; the layer hints do not matter.
    pub fn vector_paper_type_2d(&self, _opts: &[LayerOpt]) -> Arc<dyn PaperType2D> {
        Arc::new(PaintPaperType2D)
    }

    /// Vector paper type for 3D layers; the layer hints do not matter.
    pub fn vector_paper_type_3d(&self, _opts: &[LayerOpt]) -> Arc<dyn PaperType3D> {
        Arc::new(SortedPaperType3D)
    }

    pub fn paper_type_2d(
        &self,
        medium: Medium,
        opts: &[LayerOpt],
        compositor: Arc<dyn Compositor>,
    ) -> Arc<dyn PaperType2D> {
        match medium {
            Medium::Bitmap => self.pixel_paper_type_2d(opts, compositor),
            Medium::Vector => self.vector_paper_type_2d(opts),
        }
    }

    pub fn paper_type_3d(
        &self,
        medium: Medium,
        opts: &[LayerOpt],
        compositor: Arc<dyn Compositor>,
    ) -> Arc<dyn PaperType3D> {
        match medium {
            Medium::Bitmap => self.pixel_paper_type_3d(opts, compositor),
            Medium::Vector => self.vector_paper_type_3d(opts),
        }
    }
}

fn all_opaque(opts: &[LayerOpt]) -> bool {
    opts.iter().all(LayerOpt::is_opaque)
}

/// The shared color if every layer declares one and they all have the
/// same RGB.
fn common_color(opts: &[LayerOpt]) -> Option<Color> {
    let first = opts.first()?.color()?;
    opts.iter()
        .all(|o| o.color().map(|c| c.rgb()) == Some(first.rgb()))
        .then_some(first)
}

// ============================================================================
// Tests
// ============================================================================
