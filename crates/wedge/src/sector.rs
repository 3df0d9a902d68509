use crate::draw::Path;
use crate::geom::{Point, angle_deg, normalize_deg};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest sweep `Sector::clamped` will produce.
pub const MIN_SWEEP_DEG: f64 = 1e-3;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SectorError {
    #[error("sector sweep must be in (0, 360], got {0}")]
    InvalidSweep(f64),
    #[error("sector start angle must be finite, got {0}")]
    InvalidStart(f64),
}

/// A circular slice: `start_deg` clockwise from the positive x axis, spanning `sweep_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    start_deg: f64,
    sweep_deg: f64,
}

impl Sector {
    pub fn new(start_deg: f64, sweep_deg: f64) -> Result<Self, SectorError> {
        if !start_deg.is_finite() {
            return Err(SectorError::InvalidStart(start_deg));
        }
        if !sweep_deg.is_finite() || sweep_deg <= 0.0 || sweep_deg > 360.0 {
            return Err(SectorError::InvalidSweep(sweep_deg));
        }
        Ok(Self {
            start_deg,
            sweep_deg,
        })
    }

    /// Like [`Sector::new`] but clamps instead of rejecting. Non-finite input
    /// collapses to a zero start and the minimum sweep.
    pub fn clamped(start_deg: f64, sweep_deg: f64) -> Self {
        let start_deg = if start_deg.is_finite() { start_deg } else { 0.0 };
        let sweep_deg = if sweep_deg.is_finite() {
            sweep_deg.clamp(MIN_SWEEP_DEG, 360.0)
        } else {
            MIN_SWEEP_DEG
        };
        Self {
            start_deg,
            sweep_deg,
        }
    }

    pub fn start_deg(&self) -> f64 {
        self.start_deg
    }

    pub fn sweep_deg(&self) -> f64 {
        self.sweep_deg
    }

    pub fn mid_deg(&self) -> f64 {
        self.start_deg + self.sweep_deg / 2.0
    }

    /// Closed-interval membership `[start, start + sweep]` on normalized angles,
    /// wrapping through 0° when the end reaches 360°.
    pub fn contains_angle(&self, deg: f64) -> bool {
        let touch = normalize_deg(deg);
        let start = normalize_deg(self.start_deg);
        let end = start + self.sweep_deg;
        if end < 360.0 {
            touch >= start && touch <= end
        } else {
            touch >= start || touch <= end - 360.0
        }
    }

    /// Offset from the dial center to where this sector's icon sits.
    pub fn icon_offset(&self, view_radius: f64, radius_fraction: f64) -> (f64, f64) {
        let mid = self.mid_deg().to_radians();
        let distance = view_radius * radius_fraction;
        (mid.cos() * distance, mid.sin() * distance)
    }

    /// Whether a touch belongs to this sector. Touches strictly closer than
    /// `exclusion_radius` to the center are left to whatever lies underneath.
    pub fn hit_test(&self, touch: Point, center: Point, exclusion_radius: f64) -> bool {
        if touch.distance_to(center) < exclusion_radius {
            return false;
        }
        self.contains_angle(angle_deg(center, touch))
    }

    /// Pie-slice outline used for fill and clip.
    pub fn outline(&self, center: Point, radius: f64) -> Path {
        Path::new()
            .move_to(center)
            .arc(center, radius, self.start_deg, self.sweep_deg)
            .line_to(center)
            .close()
    }

    /// Point on the rim at `deg`.
    pub fn rim_point(center: Point, radius: f64, deg: f64) -> Point {
        let rad = deg.to_radians();
        center.offset(radius * rad.cos(), radius * rad.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(deg: f64) -> Point {
        let rad = deg.to_radians();
        Point::new(100.0 * rad.cos(), 100.0 * rad.sin())
    }

    #[test]
    fn test_rejects_invalid_sweep() {
        assert_eq!(Sector::new(0.0, 0.0), Err(SectorError::InvalidSweep(0.0)));
        assert_eq!(Sector::new(0.0, -5.0), Err(SectorError::InvalidSweep(-5.0)));
        assert_eq!(Sector::new(0.0, 360.5), Err(SectorError::InvalidSweep(360.5)));
        assert!(matches!(
            Sector::new(0.0, f64::NAN),
            Err(SectorError::InvalidSweep(_))
        ));
        assert!(matches!(
            Sector::new(f64::INFINITY, 30.0),
            Err(SectorError::InvalidStart(_))
        ));
        assert!(Sector::new(0.0, 360.0).is_ok());
    }

    #[test]
    fn test_clamped_is_deterministic() {
        assert_eq!(Sector::clamped(10.0, 720.0).sweep_deg(), 360.0);
        assert_eq!(Sector::clamped(10.0, -1.0).sweep_deg(), MIN_SWEEP_DEG);
        let nan = Sector::clamped(f64::NAN, f64::NAN);
        assert_eq!(nan.start_deg(), 0.0);
        assert_eq!(nan.sweep_deg(), MIN_SWEEP_DEG);
    }

    #[test]
    fn test_closed_interval_boundaries() {
        let s = Sector::new(0.0, 60.0).unwrap();
        assert!(s.contains_angle(0.0));
        assert!(s.contains_angle(60.0));
        assert!(s.contains_angle(30.0));
        assert!(!s.contains_angle(60.0001));
        assert!(!s.contains_angle(359.9));
    }

    #[test]
    fn test_wraparound() {
        let s = Sector::new(350.0, 30.0).unwrap();
        assert!(s.contains_angle(355.0));
        assert!(s.contains_angle(15.0));
        assert!(s.contains_angle(0.0));
        assert!(!s.contains_angle(345.0));
        assert!(!s.contains_angle(20.5));
        assert!(!s.contains_angle(21.0));
        // the wrapped end is a closed boundary like any other
        assert!(s.contains_angle(20.0));
    }

    #[test]
    fn test_end_exactly_at_360_includes_zero() {
        let s = Sector::new(300.0, 60.0).unwrap();
        assert!(s.contains_angle(0.0));
        assert!(s.contains_angle(300.0));
        assert!(!s.contains_angle(0.5));
    }

    #[test]
    fn test_negative_start_is_normalized() {
        // first outer wedge of the dial: -90 .. -30
        let s = Sector::new(-90.0, 60.0).unwrap();
        assert!(s.contains_angle(270.0));
        assert!(s.contains_angle(300.0));
        assert!(s.contains_angle(330.0));
        assert!(!s.contains_angle(0.0));
    }

    #[test]
    fn test_full_circle_contains_everything() {
        let s = Sector::new(123.0, 360.0).unwrap();
        for deg in [0.0, 90.0, 122.9, 123.0, 270.0, 359.99] {
            assert!(s.contains_angle(deg), "{deg}");
        }
    }

    #[test]
    fn test_hit_test_center_exclusion() {
        let s = Sector::new(0.0, 60.0).unwrap();
        let center = Point::default();
        assert!(s.hit_test(at(30.0), center, 50.0));
        assert!(!s.hit_test(Point::new(10.0, 5.0), center, 50.0));
        assert!(s.hit_test(Point::new(10.0, 5.0), center, 0.0));
        assert!(!s.hit_test(at(90.0), center, 0.0));
    }

    #[test]
    fn test_icon_offset_at_mid_angle() {
        let s = Sector::new(-90.0, 60.0).unwrap();
        let (dx, dy) = s.icon_offset(100.0, 0.7);
        let mid = (-60.0f64).to_radians();
        assert!((dx - 70.0 * mid.cos()).abs() < 1e-9);
        assert!((dy - 70.0 * mid.sin()).abs() < 1e-9);
        assert!(dy < 0.0, "upper-right wedge icon sits above the center");
    }

    #[test]
    fn test_outline_shape() {
        let s = Sector::new(30.0, 60.0).unwrap();
        let path = s.outline(Point::new(5.0, 5.0), 10.0);
        use crate::draw::PathOp;
        assert_eq!(path.ops[0], PathOp::MoveTo(Point::new(5.0, 5.0)));
        assert!(matches!(
            path.ops[1],
            PathOp::Arc { start_deg, sweep_deg, .. } if start_deg == 30.0 && sweep_deg == 60.0
        ));
        assert_eq!(path.ops[3], PathOp::Close);
    }
}
