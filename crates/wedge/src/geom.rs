use serde::{Deserialize, Serialize};

/// Largest viewport side the layouts accept.
pub const MAX_VIEWPORT_SIDE: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    /// Finite, non-negative, and no side above [`MAX_VIEWPORT_SIDE`].
    pub fn is_usable_viewport(&self) -> bool {
        [self.width, self.height]
            .iter()
            .all(|side| (0.0..=MAX_VIEWPORT_SIDE).contains(side))
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Axis-aligned rectangle in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Square of side `side` centered on `center`.
    pub fn centered_square(center: Point, side: f64) -> Self {
        Self::new(center.x - side / 2.0, center.y - side / 2.0, side, side)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Half-open containment: left/top edges are inside, right/bottom are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True when the interiors overlap; rectangles sharing an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let n = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if n >= 360.0 { 0.0 } else { n }
}

/// Screen-space angle of `p` around `center` in degrees, normalized to `[0, 360)`.
/// 0° is the positive x axis and angles grow clockwise on screen.
pub fn angle_deg(center: Point, p: Point) -> f64 {
    let (dx, dy) = (p.x - center.x, p.y - center.y);
    normalize_deg(dy.atan2(dx).to_degrees())
}
