use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Point, Rect, Round, Size};

type CGDirectDisplayID = u32;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenId(CGDirectDisplayID);

impl ScreenId {
    pub fn new(id: u32) -> Self { ScreenId(id) }

    pub fn as_u32(&self) -> u32 { self.0 }
}

/// One attached display, in canonical coordinates (bottom-left origin,
/// anchored at the primary display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub id: Option<ScreenId>,
    pub frame: Rect,
    pub visible_frame: Rect,
}

/// Space reserved by the dock and menu bar on each edge of a display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Display {
    pub fn new(id: Option<ScreenId>, frame: Rect, visible_frame: Rect) -> Self {
        Display { id, frame, visible_frame }
    }

    /// Per-edge difference between `frame` and `visible_frame`. Edges are
    /// independent: the dock may sit on the left while the menu bar is on top.
    pub fn insets(&self) -> Insets {
        let (f, v) = (&self.frame, &self.visible_frame);
        Insets {
            left: (v.min_x() - f.min_x()).max(0.0),
            right: (f.max_x() - v.max_x()).max(0.0),
            top: (f.max_y() - v.max_y()).max(0.0),
            bottom: (v.min_y() - f.min_y()).max(0.0),
        }
    }

    /// The full frame shrunk by [`Display::insets`].
    pub fn usable_frame(&self) -> Rect {
        let insets = self.insets();
        let f = &self.frame;
        Rect::from_xywh(
            f.min_x() + insets.left,
            f.min_y() + insets.bottom,
            (f.size.width - insets.left - insets.right).max(0.0),
            (f.size.height - insets.top - insets.bottom).max(0.0),
        )
    }

    /// Whether `other` describes the same physical display. Falls back to
    /// comparing frames when either side has no display id.
    pub fn is_same_display(&self, other: &Display) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.frame == other.frame,
        }
    }
}

/// The primary display is the one whose frame sits at the origin. If none
/// does, the first enumerated display is used.
pub fn primary_display(displays: &[Display]) -> Option<&Display> {
    displays.iter().find(|d| d.frame.origin == Point::ZERO).or_else(|| displays.first())
}

/// Converts between bottom-left (Cocoa) and top-left (Quartz) global
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateConverter {
    /// Max y of the primary display's frame. The top-left origin sits here
    /// in bottom-left coordinates, and vice versa.
    screen_height: f64,
}

impl CoordinateConverter {
    pub fn from_height(height: f64) -> Self { Self { screen_height: height } }

    /// Returns `None` when there are no displays.
    pub fn from_displays(displays: &[Display]) -> Option<Self> {
        primary_display(displays).map(|primary| Self::from_height(primary.frame.max_y()))
    }

    pub fn screen_height(&self) -> f64 { self.screen_height }

    /// Flips a rectangle between the two global conventions. The operation
    /// is its own inverse.
    pub fn convert_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            Point::new(rect.origin.x, self.screen_height - rect.max_y()),
            rect.size,
        )
    }
}

/// The four ways a raw window position may be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CoordinateSpace {
    GlobalBottomLeft,
    GlobalTopLeft,
    LocalBottomLeft,
    LocalTopLeft,
}

impl CoordinateSpace {
    pub const ALL: [CoordinateSpace; 4] = [
        CoordinateSpace::GlobalBottomLeft,
        CoordinateSpace::GlobalTopLeft,
        CoordinateSpace::LocalBottomLeft,
        CoordinateSpace::LocalTopLeft,
    ];

    pub fn is_top_left(self) -> bool {
        matches!(self, CoordinateSpace::GlobalTopLeft | CoordinateSpace::LocalTopLeft)
    }

    pub fn is_local(self) -> bool {
        matches!(self, CoordinateSpace::LocalBottomLeft | CoordinateSpace::LocalTopLeft)
    }

    /// Reinterprets a raw origin as if it were expressed in this space
    /// relative to `display`, returning the rectangle in canonical coordinates.
    pub fn to_canonical(
        self,
        raw: Point,
        size: Size,
        display: &Display,
        converter: CoordinateConverter,
    ) -> Rect {
        let frame = &display.frame;
        let origin = match self {
            CoordinateSpace::GlobalBottomLeft => raw,
            CoordinateSpace::GlobalTopLeft => {
                Point::new(raw.x, converter.screen_height() - raw.y - size.height)
            }
            CoordinateSpace::LocalBottomLeft => {
                Point::new(frame.min_x() + raw.x, frame.min_y() + raw.y)
            }
            CoordinateSpace::LocalTopLeft => {
                Point::new(frame.min_x() + raw.x, frame.max_y() - raw.y - size.height)
            }
        };
        Rect::new(origin, size)
    }

    /// Inverse of [`CoordinateSpace::to_canonical`], rounded to whole pixels.
    pub fn from_canonical(
        self,
        rect: Rect,
        display: &Display,
        converter: CoordinateConverter,
    ) -> Point {
        let frame = &display.frame;
        let raw = match self {
            CoordinateSpace::GlobalBottomLeft => rect.origin,
            CoordinateSpace::GlobalTopLeft => Point::new(
                rect.origin.x,
                converter.screen_height() - rect.origin.y - rect.size.height,
            ),
            CoordinateSpace::LocalBottomLeft => {
                Point::new(rect.origin.x - frame.min_x(), rect.origin.y - frame.min_y())
            }
            CoordinateSpace::LocalTopLeft => Point::new(
                rect.origin.x - frame.min_x(),
                frame.max_y() - rect.origin.y - rect.size.height,
            ),
        };
        raw.round()
    }
}
