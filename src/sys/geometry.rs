//! Plain geometry types shared by the engine and the platform layer.
//!
//! Rectangles are stored as origin + size. Whether `origin` is the top-left
//! or bottom-left corner depends on the coordinate space the caller is
//! working in; the types themselves do not care.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Size { width, height } }

    pub fn area(&self) -> f64 { self.width.max(0.0) * self.height.max(0.0) }
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self { Rect { origin, size } }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Point::new(x, y), Size::new(width, height))
    }

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

    pub fn area(&self) -> f64 { self.size.area() }

    /// Area shared by both rectangles, zero when they only touch or are disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let h = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    /// Squared distance from `point` to the closest point of this rectangle.
    pub fn distance_sq_to(&self, point: Point) -> f64 {
        let dx = (self.min_x() - point.x).max(0.0).max(point.x - self.max_x());
        let dy = (self.min_y() - point.y).max(0.0).max(point.y - self.max_y());
        dx * dx + dy * dy
    }

    /// Sum of the absolute differences of the four edges.
    pub fn edge_delta(&self, other: &Rect) -> f64 {
        (self.min_x() - other.min_x()).abs()
            + (self.max_x() - other.max_x()).abs()
            + (self.min_y() - other.min_y()).abs()
            + (self.max_y() - other.max_y()).abs()
    }
}

pub trait Round {
    fn round(&self) -> Self;
}

impl Round for Point {
    fn round(&self) -> Self { Point::new(self.x.round(), self.y.round()) }
}

impl Round for Size {
    fn round(&self) -> Self { Size::new(self.width.round(), self.height.round()) }
}

impl Round for Rect {
    fn round(&self) -> Self { Rect::new(self.origin.round(), self.size.round()) }
}

/// Approximate equality within a tolerance in points.
pub trait SameAs {
    fn same_as(&self, other: Self, tolerance: f64) -> bool;
}

impl SameAs for f64 {
    fn same_as(&self, other: f64, tolerance: f64) -> bool { (self - other).abs() <= tolerance }
}

impl SameAs for Point {
    fn same_as(&self, other: Point, tolerance: f64) -> bool {
        self.x.same_as(other.x, tolerance) && self.y.same_as(other.y, tolerance)
    }
}

impl SameAs for Size {
    fn same_as(&self, other: Size, tolerance: f64) -> bool {
        self.width.same_as(other.width, tolerance) && self.height.same_as(other.height, tolerance)
    }
}

impl SameAs for Rect {
    fn same_as(&self, other: Rect, tolerance: f64) -> bool {
        self.origin.same_as(other.origin, tolerance) && self.size.same_as(other.size, tolerance)
    }
}
