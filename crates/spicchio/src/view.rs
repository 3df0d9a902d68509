//! Paints the launcher into a [`Canvas`].

use crate::launcher::Launcher;
use serde::Serialize;
use wedge::draw::{Canvas, DisplayList, Path};
use wedge::geom::{Point, Rect, Size};
use wedge::sector::Sector;

/// Gauge height as a share of the top band.
const GAUGE_BAND_FRACTION: f64 = 0.5;
const GAUGE_ASPECT: f64 = 0.5;
const GAUGE_MARGIN: f64 = 24.0;
const TITLE_BAND_FRACTION: f64 = 0.3;

/// Back to front: layout, title, center circle, battery, ink.
pub fn draw(launcher: &Launcher, canvas: &mut dyn Canvas) {
    let theme = launcher.theme();
    let viewport = launcher.viewport();
    let band = top_band(launcher);

    launcher.layout().surface().paint(
        canvas,
        &|slot| launcher.content_for(slot),
        theme,
        launcher.rotation_deg(),
    );

    if let Some(title) = launcher.title() {
        canvas.text(
            &title,
            band.center(),
            band.height * TITLE_BAND_FRACTION,
            theme.label,
        );
    }

    let center = viewport.center();
    let radius = launcher.zones().center_radius;
    if radius > 0.0 {
        let circle = Path::new()
            .move_to(Sector::rim_point(center, radius, 0.0))
            .arc(center, radius, 0.0, 360.0)
            .close();
        canvas.fill_path(&circle, theme.center_circle);
    }

    if let Some(gauge) = launcher.battery() {
        gauge.paint(canvas, gauge_frame(viewport, band), theme);
    }

    for stroke in launcher.ink_trace() {
        canvas.polyline(&stroke.positions(), theme.ink, theme.ink_width);
    }
}

fn top_band(launcher: &Launcher) -> Rect {
    let viewport = launcher.viewport();
    Rect::new(
        0.0,
        0.0,
        viewport.width,
        viewport.height * launcher.zones().top_band_fraction,
    )
}

fn gauge_frame(viewport: Size, band: Rect) -> Rect {
    let height = band.height * GAUGE_BAND_FRACTION;
    let width = height * GAUGE_ASPECT;
    let origin = Point::new(
        viewport.width - width - GAUGE_MARGIN,
        (band.height - height) / 2.0,
    );
    Rect::new(origin.x, origin.y, width, height)
}

#[derive(Serialize)]
struct FrameDump {
    mode: String,
    view: String,
    title: Option<String>,
    viewport: Size,
    rotation_deg: f64,
    ops: DisplayList,
}

/// The current frame as JSON, for clients that render it themselves.
pub fn frame_json(launcher: &Launcher) -> Result<String, serde_json::Error> {
    let mut ops = DisplayList::new();
    draw(launcher, &mut ops);
    serde_json::to_string(&FrameDump {
        mode: launcher.mode().to_string(),
        view: launcher.view().to_string(),
        title: launcher.title(),
        viewport: launcher.viewport(),
        rotation_deg: launcher.rotation_deg(),
        ops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppEntry, AppId, Catalog, ExecCommand};
    use crate::events::AppEvent;
    use crate::icons::IconCache;
    use crate::launcher::LauncherOptions;
    use crate::settings::MemoryStore;
    use std::sync::Arc;
    use wedge::draw::DrawOp;

    fn launcher() -> Launcher {
        let apps = vec![AppEntry {
            id: AppId::from("term"),
            label: "Terminal".to_string(),
            exec: ExecCommand::from("xterm"),
            icon: None,
            category: None,
        }];
        Launcher::new(
            LauncherOptions {
                viewport: Size::new(1000.0, 2000.0),
                seed: Some(1),
                ..LauncherOptions::default()
            },
            Box::new(Catalog::new(
                apps,
                Vec::new(),
                Vec::new(),
                [(0, AppId::from("term"))],
            )),
            Box::new(MemoryStore::new()),
            Arc::new(IconCache::new()),
        )
    }

    #[test]
    fn test_dial_frame_labels_bound_wedges() {
        let l = launcher();
        let mut list = DisplayList::new();
        draw(&l, &mut list);

        let labels: Vec<_> = list
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["Terminal"]);
        // no battery reading yet, no ink
        assert!(
            !list
                .ops()
                .iter()
                .any(|op| matches!(op, DrawOp::Polyline { .. }))
        );
    }

    #[test]
    fn test_battery_is_drawn_once_known() {
        let mut l = launcher();
        let mut before = DisplayList::new();
        draw(&l, &mut before);

        l.handle(AppEvent::Battery(40), 0);
        let mut after = DisplayList::new();
        draw(&l, &mut after);
        // outline, tip, fill
        assert_eq!(after.ops().len(), before.ops().len() + 3);
    }

    #[test]
    fn test_frame_json_carries_state() {
        let l = launcher();
        let json: serde_json::Value = serde_json::from_str(&frame_json(&l).unwrap()).unwrap();
        assert_eq!(json["mode"], "dial");
        assert_eq!(json["view"], "home");
        assert!(json["title"].is_null());
        assert!(json["ops"].as_array().is_some_and(|ops| !ops.is_empty()));
    }
}
