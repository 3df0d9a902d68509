//! The twelve-wedge pie: two concentric rings of six slices.

use crate::draw::{Canvas, Content, Path, Theme};
use crate::geom::{Point, Rect, Size};
use crate::region::{Hit, Surface};
use crate::sector::Sector;
use crate::transition::RotationGroup;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

pub const WEDGES_PER_RING: usize = 6;
pub const WEDGE_COUNT: usize = WEDGES_PER_RING * 2;
pub const WEDGE_SWEEP_DEG: f64 = 60.0;
/// Wedge `i` starts at `BASE_ANGLES[i % 6] + ANGLE_OFFSET_DEG`.
pub const BASE_ANGLES: [f64; WEDGES_PER_RING] = [-120.0, -60.0, 0.0, 60.0, 120.0, 180.0];
pub const ANGLE_OFFSET_DEG: f64 = 30.0;
/// Wedge that opens the category list at home and goes back from an item set.
pub const SPECIAL_WEDGE: usize = 5;
pub const ICON_RADIUS_FRACTION: f64 = 0.7;
pub const ICON_SCALE: f64 = 0.7;
/// Wedges narrower than this share of the viewport width keep their center touchable.
pub const SMALL_WEDGE_FRACTION: f64 = 0.6;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Ring {
    #[strum(serialize = "Outer", serialize = "o")]
    Outer,
    #[strum(serialize = "Inner", serialize = "i")]
    Inner,
}

impl Ring {
    pub fn rotation_group(&self) -> RotationGroup {
        match self {
            Ring::Outer => RotationGroup::Clockwise,
            Ring::Inner => RotationGroup::CounterClockwise,
        }
    }
}

/// Angular position of a wedge within its ring, named after the slice it covers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[strum(serialize = "NorthEast", serialize = "ne", serialize = "0")]
    NorthEast,
    #[strum(serialize = "East", serialize = "e", serialize = "1")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se", serialize = "2")]
    SouthEast,
    #[strum(serialize = "SouthWest", serialize = "sw", serialize = "3")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w", serialize = "4")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw", serialize = "5")]
    NorthWest,
}

impl Position {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }
}

/// Wedge index for a ring/position pair.
pub fn wedge_index(ring: Ring, position: Position) -> usize {
    match ring {
        Ring::Outer => position.as_index(),
        Ring::Inner => WEDGES_PER_RING + position.as_index(),
    }
}

/// Item index shown by wedge `wedge` while an item set is displayed; the
/// special wedge shows none.
pub fn item_for_wedge(wedge: usize) -> Option<usize> {
    match wedge {
        SPECIAL_WEDGE => None,
        w if w < SPECIAL_WEDGE => Some(w),
        w if w < WEDGE_COUNT => Some(w - 1),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub index: usize,
    pub ring: Ring,
    pub sector: Sector,
    /// Square footprint of the wedge's view, centered on the dial.
    pub bounds: Rect,
    pub icon_radius_fraction: f64,
}

impl Wedge {
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn view_radius(&self) -> f64 {
        self.bounds.width / 2.0
    }

    /// Radius below which touches fall through to whatever sits under this wedge.
    pub fn exclusion_radius(&self, viewport: Size) -> f64 {
        let is_small = self.bounds.width < viewport.width * SMALL_WEDGE_FRACTION;
        if is_small { 0.0 } else { self.bounds.width / 4.0 }
    }

    pub fn hit_test(&self, touch: Point, viewport: Size) -> bool {
        self.bounds.contains(touch)
            && self
                .sector
                .hit_test(touch, self.center(), self.exclusion_radius(viewport))
    }

    fn outline(&self, border_width: f64) -> Path {
        // keep the border stroke inside the footprint
        let radius = (self.view_radius() - border_width / 2.0).max(0.0);
        self.sector.outline(self.center(), radius)
    }

    pub fn icon_rect(&self) -> Rect {
        let (dx, dy) = self
            .sector
            .icon_offset(self.view_radius(), self.icon_radius_fraction);
        let side = self.bounds.width * ICON_SCALE;
        Rect::centered_square(self.center().offset(dx, dy), side)
    }

    /// Copy of this wedge turned by `degrees` around the dial center.
    pub fn rotated(&self, degrees: f64) -> Self {
        Self {
            sector: Sector::clamped(
                self.sector.start_deg() + degrees,
                self.sector.sweep_deg(),
            ),
            ..self.clone()
        }
    }

    pub fn paint(&self, canvas: &mut dyn Canvas, content: &Content, theme: &Theme) {
        let outline = self.outline(theme.border_width);
        canvas.fill_path(&outline, theme.wedge);

        canvas.clip(&outline);
        let icon = self.icon_rect();
        match content {
            Content::Icon { key, .. } => canvas.icon(key, icon),
            Content::Label(label) => {
                canvas.text(label, icon.center(), icon.height / 6.0, theme.label)
            }
            Content::Empty => {}
        }
        canvas.restore();

        let center = self.center();
        let radius = (self.view_radius() - theme.border_width / 2.0).max(0.0);
        let start = self.sector.start_deg();
        let end = start + self.sector.sweep_deg();
        let rim = Path::new()
            .move_to(Sector::rim_point(center, radius, start))
            .arc(center, radius, start, self.sector.sweep_deg());
        canvas.stroke_path(&rim, theme.border, theme.border_width);
        for edge in [start, end] {
            let spoke = Path::new()
                .move_to(center)
                .line_to(Sector::rim_point(center, radius, edge));
            canvas.stroke_path(&spoke, theme.border, theme.border_width);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialGeometry {
    /// Outer ring footprint as a share of the viewport's shorter side.
    pub outer_fraction: f64,
    /// Inner ring footprint as a share of the viewport's shorter side.
    pub inner_fraction: f64,
}

impl Default for DialGeometry {
    fn default() -> Self {
        Self {
            outer_fraction: 1.0,
            inner_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialLayout {
    viewport: Size,
    wedges: Vec<Wedge>,
}

impl DialLayout {
    pub fn new(viewport: Size, geometry: DialGeometry) -> Self {
        let center = viewport.center();
        let side = viewport.min_side();
        let wedges = (0..WEDGE_COUNT)
            .map(|index| {
                let ring = if index < WEDGES_PER_RING {
                    Ring::Outer
                } else {
                    Ring::Inner
                };
                let fraction = match ring {
                    Ring::Outer => geometry.outer_fraction,
                    Ring::Inner => geometry.inner_fraction,
                };
                let start = BASE_ANGLES[index % WEDGES_PER_RING] + ANGLE_OFFSET_DEG;
                Wedge {
                    index,
                    ring,
                    sector: Sector::clamped(start, WEDGE_SWEEP_DEG),
                    bounds: Rect::centered_square(center, side * fraction),
                    icon_radius_fraction: ICON_RADIUS_FRACTION,
                }
            })
            .collect();
        Self { viewport, wedges }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn wedges(&self) -> &[Wedge] {
        &self.wedges
    }

    pub fn wedge(&self, index: usize) -> Option<&Wedge> {
        self.wedges.get(index)
    }

    /// Paints every wedge, turning each ring by its share of `rotation_deg`.
    pub fn paint_rotated(
        &self,
        canvas: &mut dyn Canvas,
        content: &dyn Fn(usize) -> Content,
        theme: &Theme,
        rotation_deg: f64,
    ) {
        // outer ring first; the inner ring is drawn on top of it
        for wedge in &self.wedges {
            let turned = wedge.rotated(wedge.ring.rotation_group().apply(rotation_deg));
            turned.paint(canvas, &content(wedge.index), theme);
        }
    }
}

impl Surface for DialLayout {
    fn hit_test(&self, point: Point) -> Option<Hit> {
        // topmost first: the inner ring covers the outer one
        self.wedges
            .iter()
            .rev()
            .find(|w| w.hit_test(point, self.viewport))
            .map(|w| Hit { slot: w.index })
    }

    fn paint(
        &self,
        canvas: &mut dyn Canvas,
        content: &dyn Fn(usize) -> Content,
        theme: &Theme,
        rotation_deg: f64,
    ) {
        self.paint_rotated(canvas, content, theme, rotation_deg);
    }
}
