use crate::draw::{Canvas, Path, Theme};
use crate::geom::Rect;

const TIP_HEIGHT_FRACTION: f64 = 0.1;
const TIP_WIDTH_FRACTION: f64 = 0.4;
const OUTLINE_WIDTH: f64 = 4.0;

/// Battery indicator geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryGauge {
    level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeShapes {
    pub body: Rect,
    pub tip: Rect,
    pub fill: Option<Rect>,
}

impl BatteryGauge {
    /// `level` is a percentage; anything above 100 is clamped.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(100) as u8,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Shapes inside `frame`: a body under a centered tip, filled from the bottom.
    pub fn shapes(&self, frame: Rect) -> GaugeShapes {
        let pad = OUTLINE_WIDTH;
        let tip_height = frame.height * TIP_HEIGHT_FRACTION;
        let body = Rect::from_ltrb(
            frame.x + pad,
            frame.y + tip_height + pad,
            frame.right() - pad,
            frame.bottom() - pad,
        );
        let tip_width = frame.width * TIP_WIDTH_FRACTION;
        let mid = frame.x + frame.width / 2.0;
        let tip = Rect::from_ltrb(
            mid - tip_width / 2.0,
            frame.y + pad,
            mid + tip_width / 2.0,
            frame.y + tip_height + pad,
        );
        let fill = (self.level > 0).then(|| {
            let fill_height = (body.height - 2.0 * pad) * (self.level as f64 / 100.0);
            Rect::from_ltrb(
                body.x + pad * 2.0,
                body.bottom() - pad * 2.0 - fill_height,
                body.right() - pad * 2.0,
                body.bottom() - pad * 2.0,
            )
        });
        GaugeShapes { body, tip, fill }
    }

    pub fn paint(&self, canvas: &mut dyn Canvas, frame: Rect, theme: &Theme) {
        let shapes = self.shapes(frame);
        canvas.stroke_path(&Path::rect(shapes.body), theme.gauge, OUTLINE_WIDTH);
        canvas.stroke_path(&Path::rect(shapes.tip), theme.gauge, OUTLINE_WIDTH);
        if let Some(fill) = shapes.fill {
            canvas.fill_path(&Path::rect(fill), theme.gauge_fill);
        }
    }
}
