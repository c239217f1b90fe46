use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

/// An axis-aligned rectangle in screen coordinates, origin at the top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    /// A zero-area rectangle pinned at `point`.
    pub const fn zero_at(point: Point) -> Self { Self::new(point, Size::new(0.0, 0.0)) }

    pub fn min_x(&self) -> f64 { self.origin.x }

    pub fn min_y(&self) -> f64 { self.origin.y }

    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    pub fn mid(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn area(&self) -> f64 { self.size.width.max(0.0) * self.size.height.max(0.0) }

    /// True when either dimension is zero or negative.
    pub fn is_degenerate(&self) -> bool { self.size.width <= 0.0 || self.size.height <= 0.0 }

    /// Shrinks the rectangle by `amount` on all four sides. The result may be
    /// degenerate; callers check with [`Rect::is_degenerate`].
    pub fn inset(&self, amount: f64) -> Rect {
        Rect::from_xywh(
            self.origin.x + amount,
            self.origin.y + amount,
            self.size.width - 2.0 * amount,
            self.size.height - 2.0 * amount,
        )
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let h = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }
}

pub trait SameAs {
    fn same_as(&self, other: &Self) -> bool;
}

const TOLERANCE: f64 = 0.1;

impl SameAs for f64 {
    fn same_as(&self, other: &Self) -> bool { (self - other).abs() < TOLERANCE }
}

impl SameAs for Point {
    fn same_as(&self, other: &Self) -> bool { self.x.same_as(&other.x) && self.y.same_as(&other.y) }
}

impl SameAs for Size {
    fn same_as(&self, other: &Self) -> bool {
        self.width.same_as(&other.width) && self.height.same_as(&other.height)
    }
}

impl SameAs for Rect {
    fn same_as(&self, other: &Self) -> bool {
        self.origin.same_as(&other.origin) && self.size.same_as(&other.size)
    }
}
