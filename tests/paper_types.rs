//! End-to-end render passes: selection, painting, flushing.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use plot_paper::basics::RectI;
use plot_paper::color::Color;
use plot_paper::compositor::{compositor_for_boost, Compositor, SATURATION};
use plot_paper::error::{RenderError, Result};
use plot_paper::glyph::ImageDecal;
use plot_paper::marker::{MarkerGlyph, MarkerShape};
use plot_paper::paper::{
    plan_as, DataIcon, DataStore, Drawing2D, Drawing3D, Paper2D, Paper3D, PaperKind,
    PlainSurface,
};
use plot_paper::paper_type::{PaperType, PaperType2D, PaperType3D};
use plot_paper::rgb_image::RgbImage;
use plot_paper::selector::{LayerOpt, Medium, PaperTypeSelector};

// ============================================================================
// Fixtures
// ============================================================================

/// Named columns of (x, y, z) points.
struct Table {
    columns: HashMap<&'static str, Vec<(f64, f64, f64)>>,
}

impl DataStore for Table {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Plots one table column with a marker in one color. The plan is the
/// column name.
struct Scatter {
    layer: usize,
    glyph: MarkerGlyph,
    color: Color,
}

impl Scatter {
    fn points<'a>(&self, plan: &dyn Any, store: &'a dyn DataStore) -> Result<&'a [(f64, f64, f64)]> {
        let column = *plan_as::<&'static str>(plan, self.layer)?;
        let table = store
            .as_any()
            .downcast_ref::<Table>()
            .ok_or_else(|| RenderError::data_store("not a table"))?;
        table
            .columns
            .get(column)
            .map(Vec::as_slice)
            .ok_or_else(|| RenderError::data_store(format!("no column {}", column)))
    }
}

impl Drawing2D for Scatter {
    fn paint_data(&self, plan: &dyn Any, paper: &mut dyn Paper2D, store: &dyn DataStore) -> Result<()> {
        for &(x, y, _) in self.points(plan, store)? {
            paper.place_glyph(x, y, &self.glyph, self.color);
        }
        Ok(())
    }
}

impl Drawing3D for Scatter {
    fn paint_data(&self, plan: &dyn Any, paper: &mut dyn Paper3D, store: &dyn DataStore) -> Result<()> {
        for &(x, y, z) in self.points(plan, store)? {
            paper.place_glyph(x, y, z, &self.glyph, self.color);
        }
        Ok(())
    }
}

/// Paints a fixed decal, ignoring its plan.
struct Backdrop(ImageDecal);

impl Drawing2D for Backdrop {
    fn paint_data(&self, _: &dyn Any, paper: &mut dyn Paper2D, _: &dyn DataStore) -> Result<()> {
        paper.place_decal(&self.0);
        Ok(())
    }
}

impl Drawing3D for Backdrop {
    fn paint_data(&self, _: &dyn Any, paper: &mut dyn Paper3D, _: &dyn DataStore) -> Result<()> {
        paper.place_decal(&self.0);
        Ok(())
    }
}

const W: i32 = 24;
const H: i32 = 16;

fn surface() -> PlainSurface {
    PlainSurface::new(RectI::from_xywh(100, 50, W, H), Color::WHITE)
}

/// A deterministic cloud of points inside the surface.
fn cloud(seed: u32, n: usize) -> Vec<(f64, f64, f64)> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f64 / u32::MAX as f64
    };
    (0..n)
        .map(|_| {
            (
                100.0 + next() * W as f64,
                50.0 + next() * H as f64,
                next() * 100.0 - 50.0,
            )
        })
        .collect()
}

fn table() -> Table {
    let mut columns = HashMap::new();
    columns.insert("a", cloud(1, 60));
    columns.insert("b", cloud(2, 60));
    columns.insert("c", cloud(3, 60));
    Table { columns }
}

fn scatter(layer: usize, color: Color) -> Scatter {
    Scatter {
        layer,
        glyph: MarkerGlyph::new(MarkerShape::FilledCircle, 1),
        color,
    }
}

static PLANS: [&str; 3] = ["a", "b", "c"];

fn plans(n: usize) -> Vec<&'static dyn Any> {
    PLANS[..n].iter().map(|p| p as &dyn Any).collect()
}

fn render_2d(ptype: &dyn PaperType2D, layers: &[Scatter], cached: bool) -> Result<DataIcon> {
    let drawings: Vec<&dyn Drawing2D> = layers.iter().map(|l| l as &dyn Drawing2D).collect();
    ptype.create_data_icon(&surface(), &drawings, &plans(layers.len()), &table(), cached)
}

fn render_3d(ptype: &dyn PaperType3D, layers: &[Scatter], cached: bool) -> Result<DataIcon> {
    let drawings: Vec<&dyn Drawing3D> = layers.iter().map(|l| l as &dyn Drawing3D).collect();
    ptype.create_data_icon(&surface(), &drawings, &plans(layers.len()), &table(), cached)
}

fn sat() -> Arc<dyn Compositor> {
    Arc::new(SATURATION)
}

// ============================================================================
// Selection through to pixels
// ============================================================================

#[test]
fn test_selected_types_render() {
    let sel = PaperTypeSelector::new();
    let opaque = [scatter(0, Color::RED), scatter(1, Color::BLUE)];
    let translucent = [
        scatter(0, Color::RED.with_alpha(0.4)),
        scatter(1, Color::BLUE.with_alpha(0.4)),
    ];
    let opaque_opts = [LayerOpt::OPAQUE, LayerOpt::OPAQUE];
    let mixed_opts = [LayerOpt::NO_SPECIAL, LayerOpt::NO_SPECIAL];

    let t = sel.pixel_paper_type_2d(&opaque_opts, sat());
    assert_eq!(t.kind(), PaperKind::Over);
    let icon = render_2d(t.as_ref(), &opaque, false).unwrap();
    assert!(icon.is_raster());
    assert_eq!(icon.bounds(), RectI::from_xywh(100, 50, W, H));

    let t = sel.pixel_paper_type_2d(&mixed_opts, sat());
    assert_eq!(t.kind(), PaperKind::Composite);
    render_2d(t.as_ref(), &translucent, false).unwrap();

    let t = sel.pixel_paper_type_3d(&mixed_opts, sat());
    assert_eq!(t.kind(), PaperKind::PixelStack);
    render_3d(t.as_ref(), &translucent, false).unwrap();

    let t = sel.paper_type_3d(Medium::Vector, &mixed_opts, sat());
    assert_eq!(t.kind(), PaperKind::Sorted);
    assert!(!render_3d(t.as_ref(), &translucent, false).unwrap().is_raster());
}

#[test]
fn test_opaque_2d_types_agree() {
    let sel = PaperTypeSelector::new();
    let layers = [
        scatter(0, Color::RED),
        scatter(1, Color::GREEN),
        scatter(2, Color::BLUE),
    ];
    let over = render_2d(&*sel.pixel_paper_type_2d(&[LayerOpt::OPAQUE; 3], sat()), &layers, false)
        .unwrap()
        .to_image();
    // Composite paints layers in reverse, but saturation lets the first
    // sample win, so later layers still end up on top.
    let composite = render_2d(&*sel.pixel_paper_type_2d(&[LayerOpt::NO_SPECIAL; 3], sat()), &layers, false)
        .unwrap()
        .to_image();
    let paint = render_2d(&*sel.vector_paper_type_2d(&[]), &layers, false)
        .unwrap()
        .to_image();
    assert_eq!(over, composite);
    assert_eq!(over, paint);
}

#[test]
fn test_opaque_3d_types_agree() {
    let sel = PaperTypeSelector::new();
    let layers = [
        scatter(0, Color::RED),
        scatter(1, Color::GREEN),
        scatter(2, Color::BLUE),
    ];
    let zbuffer = render_3d(&*sel.pixel_paper_type_3d(&[LayerOpt::OPAQUE; 3], sat()), &layers, false)
        .unwrap()
        .to_image();
    let stack = render_3d(&*sel.pixel_paper_type_3d(&[LayerOpt::NO_SPECIAL; 3], sat()), &layers, false)
        .unwrap()
        .to_image();
    let sorted = render_3d(&*sel.vector_paper_type_3d(&[]), &layers, false)
        .unwrap()
        .to_image();
    assert_eq!(zbuffer, stack);
    assert_eq!(zbuffer, sorted);
}

#[test]
fn test_mono_matches_composite_for_one_color() {
    let sel = PaperTypeSelector::new();
    let layers = [
        scatter(0, Color::BLUE.with_alpha(0.25)),
        scatter(1, Color::BLUE.with_alpha(0.5)),
    ];
    let opts = [
        LayerOpt::single_color(Color::BLUE),
        LayerOpt::single_color(Color::BLUE),
    ];
    let mono_type = sel.pixel_paper_type_2d(&opts, sat());
    assert_eq!(mono_type.kind(), PaperKind::Mono);
    let mono = render_2d(&*mono_type, &layers, false).unwrap().to_image();
    let composite = render_2d(&*sel.pixel_paper_type_2d(&[LayerOpt::NO_SPECIAL; 2], sat()), &layers, false)
        .unwrap()
        .to_image();
    assert_eq!(mono, composite);
}

#[test]
fn test_composite_later_layer_on_top() {
    let sel = PaperTypeSelector::new();
    let point = |layer, color| Scatter {
        layer,
        glyph: MarkerGlyph::point(),
        color,
    };
    // Both layers draw the same coordinates when they share a column.
    let mut columns = HashMap::new();
    columns.insert("a", vec![(103.0, 52.0, 0.0)]);
    columns.insert("b", vec![(103.0, 52.0, 0.0)]);
    let store = Table { columns };
    let layers = [point(0, Color::RED), point(1, Color::GREEN)];
    let drawings: Vec<&dyn Drawing2D> = layers.iter().map(|l| l as &dyn Drawing2D).collect();
    let t = sel.pixel_paper_type_2d(&[LayerOpt::NO_SPECIAL; 2], sat());
    let img = t
        .create_data_icon(&surface(), &drawings, &plans(2), &store, false)
        .unwrap()
        .to_image();
    assert_eq!(img.color(3, 2), Color::GREEN);
}

#[test]
fn test_boost_makes_faint_layer_visible() {
    let sel = PaperTypeSelector::new();
    let layers = [scatter(0, Color::BLACK.with_alpha(0.02))];
    let opts = [LayerOpt::NO_SPECIAL];
    let plain = render_2d(&*sel.pixel_paper_type_2d(&opts, sat()), &layers, false)
        .unwrap()
        .to_image();
    let boosted = render_2d(
        &*sel.pixel_paper_type_2d(&opts, compositor_for_boost(0.3)),
        &layers,
        false,
    )
    .unwrap()
    .to_image();
    let darkest = |img: &RgbImage| {
        img.pixels()
            .iter()
            .map(|&p| (p >> 16) & 0xff)
            .min()
            .unwrap_or(255)
    };
    assert!(darkest(&plain) > 200);
    assert!(darkest(&boosted) < 190);
}

#[test]
fn test_decal_layers() {
    let mut img = RgbImage::new_argb(W as usize, 1);
    img.fill(Color::GREEN.with_alpha(0.5).argb());
    let backdrop = Backdrop(ImageDecal::new(100, 50, img));
    let drawings: [&dyn Drawing3D; 1] = [&backdrop];
    let plan = ();
    let plans: [&dyn Any; 1] = [&plan];
    let sel = PaperTypeSelector::new();
    for t in [
        sel.pixel_paper_type_3d(&[LayerOpt::NO_SPECIAL], sat()),
        sel.pixel_paper_type_3d(&[LayerOpt::single_color(Color::GREEN)], sat()),
        sel.vector_paper_type_3d(&[]),
    ] {
        let out = t
            .create_data_icon(&surface(), &drawings, &plans, &table(), false)
            .unwrap()
            .to_image();
        let c = out.color(5, 0);
        assert_eq!(c.r, c.b, "{}: {:?}", t.kind(), c);
        assert!((c.r as i32 - 127).abs() <= 1, "{}: {:?}", t.kind(), c);
        assert_eq!(out.color(5, 1), Color::WHITE, "{}", t.kind());
    }
}

// ============================================================================
// Caching, errors, threads
// ============================================================================

#[test]
fn test_cached_vector_matches_replay() {
    let layers = [
        scatter(0, Color::RED.with_alpha(0.5)),
        scatter(1, Color::BLUE.with_alpha(0.7)),
    ];
    let sel = PaperTypeSelector::new();
    let t = sel.vector_paper_type_2d(&[]);
    let vector = render_2d(&*t, &layers, false).unwrap();
    let cached = render_2d(&*t, &layers, true).unwrap();
    assert!(!vector.is_raster());
    assert!(cached.is_raster());
    assert_eq!(cached.to_image(), vector.to_image());
}

#[test]
fn test_missing_column_aborts() {
    let layers = [scatter(0, Color::RED), scatter(1, Color::RED)];
    let drawings: Vec<&dyn Drawing2D> = layers.iter().map(|l| l as &dyn Drawing2D).collect();
    let bad = "nope";
    let plans: [&dyn Any; 2] = [&PLANS[0], &bad];
    let err = PaperTypeSelector::new()
        .pixel_paper_type_2d(&[LayerOpt::OPAQUE; 2], sat())
        .create_data_icon(&surface(), &drawings, &plans, &table(), false)
        .unwrap_err();
    match err {
        RenderError::DataStore(e) => assert!(e.to_string().contains("nope")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_mismatched_plans() {
    let layers = [scatter(0, Color::RED)];
    let drawings: Vec<&dyn Drawing3D> = layers.iter().map(|l| l as &dyn Drawing3D).collect();
    let err = PaperTypeSelector::new()
        .vector_paper_type_3d(&[])
        .create_data_icon(&surface(), &drawings, &plans(2), &table(), false)
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::PlanMismatch {
            drawings: 1,
            plans: 2
        }
    ));
}

#[test]
fn test_invalid_bounds() {
    let empty = PlainSurface::new(RectI::from_xywh(0, 0, 0, 10), Color::WHITE);
    let sel = PaperTypeSelector::new();
    let t = sel.pixel_paper_type_3d(&[LayerOpt::NO_SPECIAL], sat());
    assert!(matches!(
        t.create_paper(&empty),
        Err(RenderError::InvalidBounds { .. })
    ));
}

#[test]
fn test_parallel_renders_identical() {
    let sel = PaperTypeSelector::new().with_min_alpha(1e-3);
    let ptype = sel.pixel_paper_type_3d(&[LayerOpt::NO_SPECIAL; 3], sat());
    let reference = {
        let layers = [
            scatter(0, Color::RED.with_alpha(0.3)),
            scatter(1, Color::GREEN.with_alpha(0.002)),
            scatter(2, Color::BLUE.with_alpha(0.6)),
        ];
        render_3d(&*ptype, &layers, false).unwrap().to_image()
    };
    let images: Vec<RgbImage> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ptype = ptype.clone();
                s.spawn(move || {
                    let layers = [
                        scatter(0, Color::RED.with_alpha(0.3)),
                        scatter(1, Color::GREEN.with_alpha(0.002)),
                        scatter(2, Color::BLUE.with_alpha(0.6)),
                    ];
                    render_3d(&*ptype, &layers, false).unwrap().to_image()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for img in &images {
        assert_eq!(img, &reference);
    }
}
