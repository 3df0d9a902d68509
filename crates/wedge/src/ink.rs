//! Freehand capture: touch samples become strokes, strokes become ink samples.
//!
//! A gesture starts with the first accepted pointer-down and ends when its
//! last pointer lifts. Each lifted pointer closes one [`Stroke`]; the lift that
//! ends the gesture also closes the [`InkSample`] and hands back a
//! [`ClearTicket`] for the delayed trace clear.

use crate::geom::{Point, Size};
use serde::{Deserialize, Serialize};

pub type PointerId = u32;

pub const DEFAULT_CLEAR_DELAY_MS: i64 = 800;
pub const MIN_CLEAR_DELAY_MS: i64 = 500;
pub const MAX_CLEAR_DELAY_MS: i64 = 1000;
pub const DEFAULT_TOP_BAND_FRACTION: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    pub t_ms: i64,
}

impl StrokePoint {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    points: Vec<StrokePoint>,
}

impl Stroke {
    fn begin(p: Point, t_ms: i64) -> Self {
        let mut stroke = Self::default();
        stroke.push(p, t_ms);
        stroke
    }

    /// Timestamps never go backwards; a late sample takes the previous time.
    fn push(&mut self, p: Point, t_ms: i64) {
        let t_ms = self.points.last().map_or(t_ms, |last| t_ms.max(last.t_ms));
        self.points.push(StrokePoint {
            x: p.x,
            y: p.y,
            t_ms,
        });
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> Vec<Point> {
        self.points.iter().map(StrokePoint::position).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InkSample {
    pub strokes: Vec<Stroke>,
}

impl InkSample {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }
}

/// Regions where a pointer-down is left for other controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionZones {
    /// Radius of the circle around the viewport center.
    pub center_radius: f64,
    /// Share of the viewport height covered by the top band.
    pub top_band_fraction: f64,
}

impl Default for ExclusionZones {
    fn default() -> Self {
        Self {
            center_radius: 120.0,
            top_band_fraction: DEFAULT_TOP_BAND_FRACTION,
        }
    }
}

impl ExclusionZones {
    pub fn excludes(&self, p: Point, viewport: Size) -> bool {
        self.in_center(p, viewport) || self.in_top_band(p, viewport)
    }

    pub fn in_center(&self, p: Point, viewport: Size) -> bool {
        p.distance_to(viewport.center()) <= self.center_radius
    }

    pub fn in_top_band(&self, p: Point, viewport: Size) -> bool {
        p.y < viewport.height * self.top_band_fraction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Handled,
    NotHandled,
}

/// Permission to clear one finished sample; goes stale once a new gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearTicket {
    pub generation: u64,
    pub due_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpOutcome {
    /// The pointer was never ours.
    Ignored,
    /// Stroke closed; other pointers of the gesture are still down.
    StrokeClosed(Stroke),
    Finished {
        stroke: Stroke,
        sample: InkSample,
        clear: ClearTicket,
    },
}

#[derive(Debug)]
pub struct StrokeCapture {
    zones: ExclusionZones,
    viewport: Size,
    clear_delay_ms: i64,
    open: Vec<(PointerId, Stroke)>,
    sample: InkSample,
    generation: u64,
    pending_clear: Option<ClearTicket>,
}

impl StrokeCapture {
    pub fn new(zones: ExclusionZones, viewport: Size, clear_delay_ms: i64) -> Self {
        Self {
            zones,
            viewport,
            clear_delay_ms: clear_delay_ms.clamp(MIN_CLEAR_DELAY_MS, MAX_CLEAR_DELAY_MS),
            open: Vec::new(),
            sample: InkSample::default(),
            generation: 0,
            pending_clear: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_zones(&mut self, zones: ExclusionZones) {
        self.zones = zones;
    }

    pub fn zones(&self) -> ExclusionZones {
        self.zones
    }

    pub fn clear_delay_ms(&self) -> i64 {
        self.clear_delay_ms
    }

    pub fn is_capturing(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.open.iter().any(|(pid, _)| *pid == id)
    }

    pub fn pending_clear(&self) -> Option<ClearTicket> {
        self.pending_clear
    }

    pub fn pointer_down(&mut self, id: PointerId, p: Point, t_ms: i64) -> Claim {
        if self.zones.excludes(p, self.viewport) {
            return Claim::NotHandled;
        }
        if let Some(stroke) = self.stroke_mut(id) {
            // repeated down without an up: keep drawing the same stroke
            stroke.push(p, t_ms);
            return Claim::Handled;
        }
        if self.pending_clear.take().is_some() {
            self.generation += 1;
            self.sample = InkSample::default();
        }
        self.open.push((id, Stroke::begin(p, t_ms)));
        Claim::Handled
    }

    /// Returns whether the move belonged to an accepted gesture.
    pub fn pointer_move(&mut self, id: PointerId, p: Point, t_ms: i64) -> bool {
        match self.stroke_mut(id) {
            Some(stroke) => {
                stroke.push(p, t_ms);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self, id: PointerId, p: Point, t_ms: i64) -> UpOutcome {
        let Some(pos) = self.open.iter().position(|(pid, _)| *pid == id) else {
            return UpOutcome::Ignored;
        };
        let (_, mut stroke) = self.open.remove(pos);
        stroke.push(p, t_ms);
        self.sample.strokes.push(stroke.clone());

        if !self.open.is_empty() {
            return UpOutcome::StrokeClosed(stroke);
        }

        self.generation += 1;
        let clear = ClearTicket {
            generation: self.generation,
            due_at_ms: t_ms + self.clear_delay_ms,
        };
        self.pending_clear = Some(clear);
        log::debug!(
            "Ink sample closed: {} strokes, {} points",
            self.sample.strokes.len(),
            self.sample.point_count()
        );
        UpOutcome::Finished {
            stroke,
            sample: self.sample.clone(),
            clear,
        }
    }

    /// Clears the finished trace if `ticket` is still current.
    pub fn clear(&mut self, ticket: ClearTicket) -> bool {
        if self.pending_clear != Some(ticket) {
            return false;
        }
        self.pending_clear = None;
        self.sample = InkSample::default();
        true
    }

    /// Drops everything, including strokes still being drawn.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.open.clear();
        self.sample = InkSample::default();
        self.pending_clear = None;
    }

    /// Strokes to draw: finished ones of the current sample, then open ones.
    pub fn trace(&self) -> impl Iterator<Item = &Stroke> {
        self.sample
            .strokes
            .iter()
            .chain(self.open.iter().map(|(_, s)| s))
    }

    fn stroke_mut(&mut self, id: PointerId) -> Option<&mut Stroke> {
        self.open
            .iter_mut()
            .find(|(pid, _)| *pid == id)
            .map(|(_, s)| s)
    }
}
