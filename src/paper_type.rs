//! Paper types: strategies that create papers and drive a render pass.
//!
//! Each concrete family implements [`PaperType`] plus one or both of
//! [`PaperType2D`] / [`PaperType3D`]. The provided `create_data_icon`
//! methods run the whole pass: create the paper, let every drawing paint in
//! the type's fixed layer order, flush.

use std::any::Any;
use std::fmt;

use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::paper::{
    DataIcon, DataStore, Drawing2D, Drawing3D, LayerOrder, Paper, Paper2D, Paper3D, PaperKind,
    Surface,
};

/// Common description of a paper type.
pub trait PaperType: fmt::Debug + Send + Sync {
    fn kind(&self) -> PaperKind;

    /// True for raster output, false for vector output.
    fn is_bitmap(&self) -> bool {
        self.kind().is_bitmap()
    }

    /// Order in which drawings are asked to paint.
    fn layer_order(&self) -> LayerOrder {
        LayerOrder::Ascending
    }
}

/// Paper type for 2D plots.
pub trait PaperType2D: PaperType {
    /// Create a paper for `surface` with its background painted.
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper2D>>;

    /// Render `drawings` (with their parallel `plans`) into a data icon.
    ///
    /// With `cached` set, a vector result is rasterized once so repeated
    /// painting is cheap.
    fn create_data_icon(
        &self,
        surface: &dyn Surface,
        drawings: &[&dyn Drawing2D],
        plans: &[&dyn Any],
        data_store: &dyn DataStore,
        cached: bool,
    ) -> Result<DataIcon> {
        check_plans(drawings.len(), plans.len())?;
        let paper = self.create_paper(surface)?;
        paint_layers(
            self.kind(),
            self.layer_order(),
            paper,
            drawings.len(),
            cached,
            |layer, paper| drawings[layer].paint_data(plans[layer], paper, data_store),
        )
    }
}

/// Paper type for 3D plots.
pub trait PaperType3D: PaperType {
    /// Create a paper for `surface` with its background painted.
    fn create_paper(&self, surface: &dyn Surface) -> Result<Box<dyn Paper3D>>;

    /// Render `drawings` (with their parallel `plans`) into a data icon.
    ///
    /// With `cached` set, a vector result is rasterized once so repeated
    /// painting is cheap.
    fn create_data_icon(
        &self,
        surface: &dyn Surface,
        drawings: &[&dyn Drawing3D],
        plans: &[&dyn Any],
        data_store: &dyn DataStore,
        cached: bool,
    ) -> Result<DataIcon> {
        check_plans(drawings.len(), plans.len())?;
        let paper = self.create_paper(surface)?;
        paint_layers(
            self.kind(),
            self.layer_order(),
            paper,
            drawings.len(),
            cached,
            |layer, paper| drawings[layer].paint_data(plans[layer], paper, data_store),
        )
    }
}

fn check_plans(drawings: usize, plans: usize) -> Result<()> {
    if drawings == plans {
        Ok(())
    } else {
        Err(RenderError::PlanMismatch { drawings, plans })
    }
}

/// Paint every layer onto `paper` in `order`, then flush. `paint` paints
/// the layer with the given index.
///
/// The first failing layer aborts the pass and the paper is dropped.
fn paint_layers<P>(
    kind: PaperKind,
    order: LayerOrder,
    mut paper: Box<P>,
    layers: usize,
    cached: bool,
    mut paint: impl FnMut(usize, &mut P) -> Result<()>,
) -> Result<DataIcon>
where
    P: ?Sized + Paper,
{
    debug!(layers, paper = %kind, "painting data icon");
    for layer in order.indices(layers) {
        if let Err(err) = paint(layer, &mut *paper) {
            warn!(layer, paper = %kind, error = %err, "layer failed, abandoning render");
            return Err(err);
        }
    }
    let icon = paper.flush();
    Ok(if cached { icon.into_cached() } else { icon })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::RectI;
    use crate::color::Color;
    use crate::marker::MarkerGlyph;
    use crate::over_paper::OverPaperType2D;
    use crate::paper::{plan_as, PlainSurface};
    use std::cell::RefCell;

    /// Places one point per plan coordinate, remembering the order it ran in.
    struct PointLayer {
        id: usize,
        color: Color,
        log: RefCell<Vec<usize>>,
    }

    impl Drawing2D for PointLayer {
        fn paint_data(
            &self,
            plan: &dyn Any,
            paper: &mut dyn Paper2D,
            _data_store: &dyn DataStore,
        ) -> Result<()> {
            let points = plan_as::<Vec<(f64, f64)>>(plan, self.id)?;
            self.log.borrow_mut().push(self.id);
            let glyph = MarkerGlyph::point();
            for &(x, y) in points {
                paper.place_glyph(x, y, &glyph, self.color);
            }
            Ok(())
        }
    }

    fn surface() -> PlainSurface {
        PlainSurface::new(RectI::from_xywh(0, 0, 8, 8), Color::WHITE)
    }

    #[test]
    fn test_plan_mismatch() {
        let layer = PointLayer {
            id: 0,
            color: Color::RED,
            log: RefCell::new(Vec::new()),
        };
        let drawings: [&dyn Drawing2D; 1] = [&layer];
        let err = OverPaperType2D
            .create_data_icon(&surface(), &drawings, &[], &(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::PlanMismatch {
                drawings: 1,
                plans: 0
            }
        ));
        assert!(layer.log.borrow().is_empty());
    }

    #[test]
    fn test_wrong_plan_aborts() {
        let layer = PointLayer {
            id: 2,
            color: Color::RED,
            log: RefCell::new(Vec::new()),
        };
        let drawings: [&dyn Drawing2D; 1] = [&layer];
        let plan = "not points";
        let plans: [&dyn Any; 1] = [&plan];
        let err = OverPaperType2D
            .create_data_icon(&surface(), &drawings, &plans, &(), false)
            .unwrap_err();
        assert!(matches!(err, RenderError::Plan { layer: 2, .. }));
    }

    #[test]
    fn test_layers_painted_in_order() {
        let a = PointLayer {
            id: 0,
            color: Color::RED,
            log: RefCell::new(Vec::new()),
        };
        let b = PointLayer {
            id: 1,
            color: Color::BLUE,
            log: RefCell::new(Vec::new()),
        };
        let pts: Vec<(f64, f64)> = vec![(3.5, 4.2)];
        let drawings: [&dyn Drawing2D; 2] = [&a, &b];
        let plans: [&dyn Any; 2] = [&pts, &pts];
        let icon = OverPaperType2D
            .create_data_icon(&surface(), &drawings, &plans, &(), false)
            .unwrap();
        assert!(icon.is_raster());
        // Over is ascending: the later layer wins.
        assert_eq!(icon.to_image().color(3, 4), Color::BLUE);
        assert_eq!(icon.to_image().color(0, 0), Color::WHITE);
    }
}
