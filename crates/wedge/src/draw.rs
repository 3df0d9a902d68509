//! Surface-independent drawing.
//!
//! Layouts paint through [`Canvas`]. The [`DisplayList`] canvas records the
//! operations so that any 2D backend can replay them, and so that frames
//! can be inspected in tests or dumped as JSON.

use crate::geom::{Point, Rect};
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    /// Arc of the circle around `center`, clockwise from `start_deg` by `sweep_deg`.
    Arc {
        center: Point,
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.ops.push(PathOp::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.ops.push(PathOp::LineTo(p));
        self
    }

    pub fn arc(mut self, center: Point, radius: f64, start_deg: f64, sweep_deg: f64) -> Self {
        self.ops.push(PathOp::Arc {
            center,
            radius,
            start_deg,
            sweep_deg,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.ops.push(PathOp::Close);
        self
    }

    pub fn rect(r: Rect) -> Self {
        Self::new()
            .move_to(Point::new(r.x, r.y))
            .line_to(Point::new(r.right(), r.y))
            .line_to(Point::new(r.right(), r.bottom()))
            .line_to(Point::new(r.x, r.bottom()))
            .close()
    }
}

/// Opaque handle the canvas backend resolves to an image.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconKey(String);

crate::impl_string_newtype!(IconKey);

/// What a region shows. Resolved by the caller from its item provider and icon cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Content {
    Icon {
        key: IconKey,
        /// Intrinsic pixel size, if known.
        intrinsic: Option<(f64, f64)>,
    },
    Label(String),
    #[default]
    Empty,
}

pub trait Canvas {
    fn fill_path(&mut self, path: &Path, color: Srgba<f64>);
    fn stroke_path(&mut self, path: &Path, color: Srgba<f64>, width: f64);
    /// Pushes a clip; undone by the matching [`Canvas::restore`].
    fn clip(&mut self, path: &Path);
    fn restore(&mut self);
    fn icon(&mut self, key: &IconKey, dest: Rect);
    fn text(&mut self, text: &str, center: Point, size: f64, color: Srgba<f64>);
    fn polyline(&mut self, points: &[Point], color: Srgba<f64>, width: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Fill {
        path: Path,
        color: Srgba<f64>,
    },
    Stroke {
        path: Path,
        color: Srgba<f64>,
        width: f64,
    },
    Clip {
        path: Path,
    },
    Restore,
    Icon {
        key: IconKey,
        dest: Rect,
    },
    Text {
        text: String,
        center: Point,
        size: f64,
        color: Srgba<f64>,
    },
    Polyline {
        points: Vec<Point>,
        color: Srgba<f64>,
        width: f64,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn icons(&self) -> impl Iterator<Item = (&IconKey, &Rect)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Icon { key, dest } => Some((key, dest)),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    fn fill_path(&mut self, path: &Path, color: Srgba<f64>) {
        self.ops.push(DrawOp::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, color: Srgba<f64>, width: f64) {
        self.ops.push(DrawOp::Stroke {
            path: path.clone(),
            color,
            width,
        });
    }

    fn clip(&mut self, path: &Path) {
        self.ops.push(DrawOp::Clip { path: path.clone() });
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn icon(&mut self, key: &IconKey, dest: Rect) {
        self.ops.push(DrawOp::Icon {
            key: key.clone(),
            dest,
        });
    }

    fn text(&mut self, text: &str, center: Point, size: f64, color: Srgba<f64>) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            center,
            size,
            color,
        });
    }

    fn polyline(&mut self, points: &[Point], color: Srgba<f64>, width: f64) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub wedge: Srgba<f64>,
    pub tile: Srgba<f64>,
    pub border: Srgba<f64>,
    pub border_width: f64,
    pub label: Srgba<f64>,
    pub ink: Srgba<f64>,
    pub ink_width: f64,
    pub center_circle: Srgba<f64>,
    pub gauge: Srgba<f64>,
    pub gauge_fill: Srgba<f64>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            wedge: Srgba::new(0.0, 0.0, 0.0, 1.0),
            tile: Srgba::new(0.0, 0.0, 0.0, 1.0),
            border: Srgba::new(0.0, 0.0, 0.0, 1.0),
            border_width: 30.0,
            label: Srgba::new(1.0, 1.0, 1.0, 1.0),
            ink: Srgba::new(1.0, 1.0, 1.0, 0.9),
            ink_width: 12.0,
            center_circle: Srgba::new(0.2, 0.2, 0.2, 0.15),
            gauge: Srgba::new(1.0, 1.0, 1.0, 1.0),
            gauge_fill: Srgba::new(0.0, 1.0, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_list_serializes_tagged_ops() {
        let mut list = DisplayList::new();
        list.icon(&IconKey::from("firefox"), Rect::new(0.0, 0.0, 10.0, 10.0));
        list.restore();

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json[0]["op"], "icon");
        assert_eq!(json[0]["key"], "firefox");
        assert_eq!(json[0]["dest"]["width"], 10.0);
        assert_eq!(json[1]["op"], "restore");
    }

    #[test]
    fn test_rect_path_is_closed() {
        let path = Path::rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(path.ops.len(), 5);
        assert_eq!(path.ops[0], PathOp::MoveTo(Point::new(1.0, 2.0)));
        assert_eq!(path.ops[4], PathOp::Close);
    }
}
