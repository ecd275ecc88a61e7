//! Reference scatter scenes rendered through a chosen paper kind.

use std::any::Any;
use std::sync::Arc;

use plot_paper::basics::RectI;
use plot_paper::color::Color;
use plot_paper::composite_paper::CompositePaperType2D;
use plot_paper::compositor::compositor_for_boost;
use plot_paper::error::{RenderError, Result};
use plot_paper::marker::{MarkerGlyph, MarkerShape};
use plot_paper::mono_paper::MonoPaperType;
use plot_paper::over_paper::OverPaperType2D;
use plot_paper::paint_paper::PaintPaperType2D;
use plot_paper::paper::{
    DataIcon, DataStore, Drawing2D, Drawing3D, Paper2D, Paper3D, PaperKind, PlainSurface,
};
use plot_paper::paper_type::{PaperType2D, PaperType3D};
use plot_paper::pixel_stack_paper::PixelStackPaperType3D;
use plot_paper::sorted_paper::SortedPaperType3D;
use plot_paper::zbuffer_paper::ZBufferPaperType3D;
use tracing::info;

use crate::PixelBuffer;

/// Tunable scene inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    /// Opacity of every placed glyph.
    pub alpha: f32,
    /// Compositor boost; 0 disables.
    pub boost: f32,
    /// Faintest alpha the pixel stack must resolve.
    pub min_alpha: f32,
    /// Points per layer.
    pub points: usize,
    pub seed: u32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            boost: 0.0,
            min_alpha: 1.0 / 255.0,
            points: 2000,
            seed: 1,
        }
    }
}

/// Which placement interface a scene drives, and whether every layer
/// shares one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub deep: bool,
    pub single_color: bool,
}

impl Scene {
    /// A scene every kind in `kinds` can render, if one exists.
    ///
    /// Flat scenes are preferred unless some kind only takes 3D placement.
    /// A Mono kind forces a single-color scene.
    pub fn for_kinds(kinds: &[PaperKind]) -> Option<Scene> {
        let flat = kinds.iter().all(|k| k.supports_2d());
        let deep = kinds.iter().all(|k| k.supports_3d());
        let single_color = kinds.contains(&PaperKind::Mono);
        let needs_deep = kinds.iter().any(|k| !k.supports_2d());
        match (flat, deep) {
            (true, _) if !needs_deep => Some(Scene {
                deep: false,
                single_color,
            }),
            (_, true) => Some(Scene {
                deep: true,
                single_color,
            }),
            _ => None,
        }
    }
}

/// Layer colors for a scene.
fn palette(scene: Scene) -> [Color; 3] {
    if scene.single_color {
        [Color::new_opaque(30, 80, 200); 3]
    } else {
        [
            Color::new_opaque(220, 40, 40),
            Color::new_opaque(40, 170, 60),
            Color::new_opaque(40, 60, 220),
        ]
    }
}

// ============================================================================
// Scene data
// ============================================================================

struct Xorshift(u32);

impl Xorshift {
    fn next_unit(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0 as f64 / u32::MAX as f64
    }

    /// Roughly normal, mean 0 and unit spread.
    fn next_normal(&mut self) -> f64 {
        (0..4).map(|_| self.next_unit()).sum::<f64>() - 2.0
    }
}

/// A blob of points around a center, with depth along a diagonal.
fn blob(rng: &mut Xorshift, n: usize, center: (f64, f64), spread: f64) -> Vec<(f64, f64, f64)> {
    (0..n)
        .map(|_| {
            let x = center.0 + rng.next_normal() * spread;
            let y = center.1 + rng.next_normal() * spread;
            (x, y, x - y + rng.next_normal() * spread)
        })
        .collect()
}

struct CloudLayer {
    glyph: MarkerGlyph,
    color: Color,
    points: Vec<(f64, f64, f64)>,
}

impl Drawing2D for CloudLayer {
    fn paint_data(&self, _: &dyn Any, paper: &mut dyn Paper2D, _: &dyn DataStore) -> Result<()> {
        for &(x, y, _) in &self.points {
            paper.place_glyph(x, y, &self.glyph, self.color);
        }
        Ok(())
    }
}

impl Drawing3D for CloudLayer {
    fn paint_data(&self, _: &dyn Any, paper: &mut dyn Paper3D, _: &dyn DataStore) -> Result<()> {
        for &(x, y, z) in &self.points {
            paper.place_glyph(x, y, z, &self.glyph, self.color);
        }
        Ok(())
    }
}

fn layers(scene: Scene, width: u32, height: u32, params: &SceneParams) -> Vec<CloudLayer> {
    let mut rng = Xorshift(params.seed.max(1));
    let (w, h) = (width as f64, height as f64);
    let spread = w.min(h) / 8.0;
    let centers = [(w * 0.4, h * 0.4), (w * 0.6, h * 0.45), (w * 0.5, h * 0.6)];
    let shapes = [
        MarkerShape::FilledCircle,
        MarkerShape::OpenSquare,
        MarkerShape::Cross,
    ];
    palette(scene)
        .into_iter()
        .zip(centers)
        .zip(shapes)
        .map(|((color, center), shape)| CloudLayer {
            glyph: MarkerGlyph::new(shape, 2),
            color: color.with_alpha(params.alpha),
            points: blob(&mut rng, params.points, center, spread),
        })
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

fn paper_type_2d(kind: PaperKind, scene: Scene, params: &SceneParams) -> Option<Arc<dyn PaperType2D>> {
    let compositor = compositor_for_boost(params.boost);
    Some(match kind {
        PaperKind::Over => Arc::new(OverPaperType2D),
        PaperKind::Mono => Arc::new(MonoPaperType::new(palette(scene)[0], compositor)),
        PaperKind::Composite => Arc::new(CompositePaperType2D::new(compositor)),
        PaperKind::Paint => Arc::new(PaintPaperType2D),
        _ => return None,
    })
}

fn paper_type_3d(kind: PaperKind, scene: Scene, params: &SceneParams) -> Option<Arc<dyn PaperType3D>> {
    let compositor = compositor_for_boost(params.boost);
    Some(match kind {
        PaperKind::ZBuffer => Arc::new(ZBufferPaperType3D),
        PaperKind::Mono => Arc::new(MonoPaperType::new(palette(scene)[0], compositor)),
        PaperKind::PixelStack => Arc::new(PixelStackPaperType3D::new(compositor, params.min_alpha)),
        PaperKind::Sorted => Arc::new(SortedPaperType3D),
        _ => return None,
    })
}

/// Render `scene` through a paper of `kind` into an RGBA buffer.
pub fn render_scene(
    kind: PaperKind,
    scene: Scene,
    width: u32,
    height: u32,
    params: &SceneParams,
) -> Result<PixelBuffer> {
    let bounds = RectI::from_xywh(0, 0, width as i32, height as i32);
    let surface = PlainSurface::new(bounds, Color::WHITE);
    let layers = layers(scene, width, height, params);
    let plan = ();
    let plans: Vec<&dyn Any> = layers.iter().map(|_| &plan as &dyn Any).collect();
    let unsupported = || RenderError::Plan {
        layer: 0,
        reason: format!(
            "{} papers do not take {} placement",
            kind,
            if scene.deep { "3D" } else { "2D" }
        ),
    };

    let icon: DataIcon = if scene.deep {
        let ptype = paper_type_3d(kind, scene, params).ok_or_else(unsupported)?;
        let drawings: Vec<&dyn Drawing3D> = layers.iter().map(|l| l as &dyn Drawing3D).collect();
        ptype.create_data_icon(&surface, &drawings, &plans, &(), false)?
    } else {
        let ptype = paper_type_2d(kind, scene, params).ok_or_else(unsupported)?;
        let drawings: Vec<&dyn Drawing2D> = layers.iter().map(|l| l as &dyn Drawing2D).collect();
        ptype.create_data_icon(&surface, &drawings, &plans, &(), false)?
    };
    info!(paper = %kind, deep = scene.deep, width, height, "rendered scene");
    Ok(PixelBuffer::from_image(&icon.to_image()))
}

// ============================================================================
// Tests
// ============================================================================
