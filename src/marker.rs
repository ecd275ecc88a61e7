//! Standard scatter-plot marker glyphs.
//!
//! Each [`MarkerGlyph`] precomputes its coverage as an [`OffsetsGlyph`], so
//! placing a marker is a walk over a short offset list. Circles are traced
//! with Bresenham ellipse stepping over the first quadrant and mirrored.

use crate::basics::RectI;
use crate::glyph::{Glyph, OffsetsGlyph, Pixer};

/// Marker outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    Point,
    FilledSquare,
    OpenSquare,
    Cross,
    FilledCircle,
    OpenCircle,
}

impl MarkerShape {
    pub const ALL: [MarkerShape; 6] = [
        MarkerShape::Point,
        MarkerShape::FilledSquare,
        MarkerShape::OpenSquare,
        MarkerShape::Cross,
        MarkerShape::FilledCircle,
        MarkerShape::OpenCircle,
    ];
}

/// A marker shape at a given half-size, centred on its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGlyph {
    shape: MarkerShape,
    size: i32,
    offsets: OffsetsGlyph,
}

impl MarkerGlyph {
    /// `size` is the half-width in pixels; the marker spans
    /// `2 * size + 1` pixels. Size 0 is a single pixel for every shape.
    pub fn new(shape: MarkerShape, size: u16) -> Self {
        let size = size as i32;
        let offsets = if size == 0 {
            vec![(0, 0)]
        } else {
            match shape {
                MarkerShape::Point => vec![(0, 0)],
                MarkerShape::FilledSquare => filled_square(size),
                MarkerShape::OpenSquare => open_square(size),
                MarkerShape::Cross => cross(size),
                MarkerShape::FilledCircle => filled_circle(size),
                MarkerShape::OpenCircle => open_circle(size),
            }
        };
        Self {
            shape,
            size,
            offsets: OffsetsGlyph::new(offsets),
        }
    }

    /// Single-pixel point.
    pub fn point() -> Self {
        Self::new(MarkerShape::Point, 0)
    }

    pub fn shape(&self) -> MarkerShape {
        self.shape
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn bounds(&self) -> RectI {
        self.offsets.bounds()
    }

    /// Number of pixels the unclipped marker covers.
    pub fn pixel_count(&self) -> usize {
        self.offsets.offsets().len()
    }
}

impl Glyph for MarkerGlyph {
    fn pixer(&self, clip: &RectI) -> Option<Pixer<'_>> {
        self.offsets.pixer(clip)
    }
}

// ============================================================================
// Shape builders
// ============================================================================

fn filled_square(s: i32) -> Vec<(i32, i32)> {
    let mut v = Vec::with_capacity(((2 * s + 1) * (2 * s + 1)) as usize);
    for y in -s..=s {
        for x in -s..=s {
            v.push((x, y));
        }
    }
    v
}

fn open_square(s: i32) -> Vec<(i32, i32)> {
    let mut v = Vec::with_capacity((8 * s) as usize);
    for i in -s..=s {
        v.push((i, -s));
        v.push((i, s));
        v.push((-s, i));
        v.push((s, i));
    }
    v
}

fn cross(s: i32) -> Vec<(i32, i32)> {
    let mut v = Vec::with_capacity((4 * s + 2) as usize);
    for i in -s..=s {
        v.push((i, 0));
        v.push((0, i));
    }
    v
}

fn hline(v: &mut Vec<(i32, i32)>, x1: i32, x2: i32, y: i32) {
    v.extend((x1..=x2).map(|x| (x, y)));
}

fn filled_circle(r: i32) -> Vec<(i32, i32)> {
    let mut v = Vec::new();
    let mut ei = EllipseStepper::new(r, r);
    let mut dx = 0;
    let mut dy = -r;
    let mut dx0 = dx;
    let mut dy0 = dy;
    loop {
        ei.next();
        dx += ei.dx;
        dy += ei.dy;
        if dy != dy0 {
            hline(&mut v, -dx0, dx0, dy0);
            hline(&mut v, -dx0, dx0, -dy0);
        }
        dx0 = dx;
        dy0 = dy;
        if dy >= 0 {
            break;
        }
    }
    hline(&mut v, -dx0, dx0, dy0);
    v
}

fn open_circle(r: i32) -> Vec<(i32, i32)> {
    let mut v = vec![(0, -r), (0, r)];
    let mut ei = EllipseStepper::new(r, r);
    let mut dx = 0;
    let mut dy = -r;
    loop {
        ei.next();
        dx += ei.dx;
        dy += ei.dy;
        v.extend_from_slice(&[(dx, dy), (dx, -dy), (-dx, -dy), (-dx, dy)]);
        if dy >= 0 {
            break;
        }
    }
    v
}

// ============================================================================
// Bresenham ellipse stepping
// ============================================================================

/// Steps around the first quadrant of an ellipse, from (0, -ry) toward
/// (rx, 0), one pixel at a time. After each `next()` the `dx`/`dy` fields
/// hold the step just taken (0 or 1 each).
struct EllipseStepper {
    rx2: i32,
    ry2: i32,
    two_rx2: i32,
    two_ry2: i32,
    inc_x: i32,
    inc_y: i32,
    cur_f: i32,
    dx: i32,
    dy: i32,
}

impl EllipseStepper {
    fn new(rx: i32, ry: i32) -> Self {
        let rx2 = rx * rx;
        let ry2 = ry * ry;
        Self {
            rx2,
            ry2,
            two_rx2: rx2 << 1,
            two_ry2: ry2 << 1,
            inc_x: 0,
            inc_y: -ry * (rx2 << 1),
            cur_f: 0,
            dx: 0,
            dy: 0,
        }
    }

    fn next(&mut self) {
        let fx = self.cur_f + self.inc_x + self.ry2;
        let fy = self.cur_f + self.inc_y + self.rx2;
        let fxy = fx + self.inc_y + self.rx2;

        let (mx, my, mxy) = (fx.abs(), fy.abs(), fxy.abs());
        let step_x = mx <= my;
        let min_m = mx.min(my);

        if min_m > mxy {
            self.inc_x += self.two_ry2;
            self.inc_y += self.two_rx2;
            self.cur_f = fxy;
            self.dx = 1;
            self.dy = 1;
        } else if step_x {
            self.inc_x += self.two_ry2;
            self.cur_f = fx;
            self.dx = 1;
            self.dy = 0;
        } else {
            self.inc_y += self.two_rx2;
            self.cur_f = fy;
            self.dx = 0;
            self.dy = 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
