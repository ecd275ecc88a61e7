//! Foundation types: rounding helpers and the integer rectangle used for
//! plot bounds and clip regions.
//!
//! Rectangles use inclusive corners, so a rectangle covering a single pixel
//! has `x1 == x2` and `y1 == y2`.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Floor a double to the nearest integer toward negative infinity.
///
/// Graphics positions of glyphs are floored to find the pixel they land on.
/// Values beyond the `i32` range saturate; NaN gives 0.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    v.floor() as i32
}

/// Pixel a glyph placed at graphics position (gx, gy) is anchored to, or
/// `None` if either coordinate is NaN.
#[inline]
pub fn glyph_pixel(gx: f64, gy: f64) -> Option<(i32, i32)> {
    if gx.is_nan() || gy.is_nan() {
        return None;
    }
    Some((ifloor(gx), ifloor(gy)))
}

/// Round a unit-range float to an 8-bit channel value (round half up),
/// clamping out-of-range input.
#[inline]
pub fn unit_to_byte(v: f32) -> u32 {
    if v <= 0.0 {
        0
    } else if v >= 1.0 {
        255
    } else {
        (v * 255.0 + 0.5) as u32
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two inclusive corner points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if the result is a valid (non-empty) rectangle.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.is_valid()
    }

    /// Returns `true` if the rectangle is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    #[inline]
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns `true` if this rectangle overlaps with `r`.
    pub fn overlaps(&self, r: &Self) -> bool {
        !(r.x1 > self.x2 || r.x2 < self.x1 || r.y1 > self.y2 || r.y2 < self.y1)
    }
}

impl Rect<i32> {
    /// Rectangle from an origin and a size, the way plot bounds are
    /// usually quoted. A zero or negative size gives an empty rectangle.
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width - 1, y + height - 1)
    }

    /// Number of pixel columns covered (0 for an empty rectangle).
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1 + 1).max(0)
    }

    /// Number of pixel rows covered (0 for an empty rectangle).
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1 + 1).max(0)
    }

    /// This rectangle in coordinates relative to the point (x, y), or `None`
    /// if a corner would leave the `i32` range.
    pub fn relative_to(&self, x: i32, y: i32) -> Option<Self> {
        Some(Self::new(
            self.x1.checked_sub(x)?,
            self.y1.checked_sub(y)?,
            self.x2.checked_sub(x)?,
            self.y2.checked_sub(y)?,
        ))
    }

    /// Compute the intersection of two rectangles; may be empty.
    pub fn intersect(&self, r: &Self) -> Self {
        let mut out = *self;
        out.clip(r);
        out
    }
}

/// Rectangle with `i32` coordinates.
pub type RectI = Rect<i32>;

// ============================================================================
// Tests
// ============================================================================
