//! Pure placement math.

use crate::sys::geometry::{Point, Rect, Round, Size};

/// Origin that centers a window of `size` inside `usable`, rounded to whole
/// pixels.
///
/// An axis on which the window fits is clamped so the window stays inside
/// `usable`. An axis on which it does not fit is pinned to the usable
/// rectangle's minimum edge instead of being clamped into range, which is
/// impossible. Callers work in top-left coordinates so this keeps the title
/// bar reachable.
pub fn centered_origin(size: Size, usable: Rect) -> Point {
    let mid = usable.mid();
    let x = center_axis(mid.x, size.width, usable.min_x(), usable.max_x());
    let y = center_axis(mid.y, size.height, usable.min_y(), usable.max_y());
    Point::new(x, y).round()
}

fn center_axis(mid: f64, len: f64, min: f64, max: f64) -> f64 {
    if len > max - min {
        return min;
    }
    (mid - len / 2.0).clamp(min, max - len)
}

/// Clamps `origin` so a window of `size` lies within `bounds` on each axis.
/// When `bounds` is narrower than the window the two limits swap, so the
/// result always lies between them.
pub fn constrained_origin(origin: Point, size: Size, bounds: Rect) -> Point {
    Point::new(
        constrain_axis(origin.x, size.width, bounds.min_x(), bounds.max_x()),
        constrain_axis(origin.y, size.height, bounds.min_y(), bounds.max_y()),
    )
}

fn constrain_axis(value: f64, len: f64, min: f64, max: f64) -> f64 {
    let upper = max - len;
    let (lo, hi) = if upper < min { (upper, min) } else { (min, upper) };
    value.clamp(lo, hi)
}
