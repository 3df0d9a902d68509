use proptest::prelude::*;
use wedge::geom::{Point, Rect, Size, angle_deg};
use wedge::grid::{GridPacker, LargeIndexSet, Tile};
use wedge::ink::{Claim, ExclusionZones, StrokeCapture, UpOutcome};
use wedge::sector::Sector;
use wedge::transition::{Frame, TransitionController};

// --- STRATEGIES ---

prop_compose! {
    fn arb_touch()(
        x in -500.0..500.0f64,
        y in -500.0..500.0f64,
    ) -> Point {
        Point::new(x, y)
    }
}

prop_compose! {
    fn arb_landscape()(
        height in 200.0..1200.0f64,
        aspect in 1.05..3.0f64,
    ) -> Size {
        Size::new(height * aspect, height)
    }
}

prop_compose! {
    fn arb_large_set()(
        extra in proptest::collection::btree_set(0usize..40, 0..6)
    ) -> LargeIndexSet {
        LargeIndexSet::from_indices(extra)
    }
}

fn overlapping(tiles: &[Tile]) -> Option<(usize, usize)> {
    tiles.iter().enumerate().find_map(|(i, a)| {
        tiles[i + 1..]
            .iter()
            .find(|b| a.bounds.intersects(&b.bounds))
            .map(|b| (a.item_index, b.item_index))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_hit_test_matches_angle_range(touch in arb_touch()) {
        let sector = Sector::new(0.0, 60.0).unwrap();
        let center = Point::default();
        let angle = angle_deg(center, touch);
        prop_assert_eq!(
            sector.hit_test(touch, center, 0.0),
            (0.0..=60.0).contains(&angle)
        );
    }

    #[test]
    fn test_wraparound_matches_union(touch in arb_touch()) {
        let sector = Sector::new(350.0, 30.0).unwrap();
        let angle = angle_deg(Point::default(), touch);
        prop_assert_eq!(
            sector.contains_angle(angle),
            angle >= 350.0 || angle <= 20.0
        );
    }

    #[test]
    fn test_exclusion_radius_always_wins(touch in arb_touch(), radius in 1.0..400.0f64) {
        let sector = Sector::new(0.0, 360.0).unwrap();
        let center = Point::default();
        prop_assert_eq!(
            sector.hit_test(touch, center, radius),
            touch.distance_to(center) >= radius
        );
    }

    #[test]
    fn test_any_sector_config_is_safe(start in any::<f64>(), sweep in any::<f64>()) {
        // either rejected or valid; clamping never yields an unusable sector
        if let Ok(s) = Sector::new(start, sweep) {
            prop_assert!(s.sweep_deg() > 0.0 && s.sweep_deg() <= 360.0);
        }
        let c = Sector::clamped(start, sweep);
        prop_assert!(c.sweep_deg() > 0.0 && c.sweep_deg() <= 360.0);
        prop_assert!(c.start_deg().is_finite());
        let _ = c.contains_angle(start);
    }

    #[test]
    fn test_landscape_packing_never_overlaps(
        viewport in arb_landscape(),
        count in 0usize..60,
        large in arb_large_set(),
    ) {
        let layout = GridPacker::default().pack(viewport, count, &large);
        prop_assert_eq!(overlapping(layout.tiles()), None);
        let frame = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        for tile in layout.tiles() {
            prop_assert!(tile.bounds.x >= frame.x - 1e-9);
            prop_assert!(tile.bounds.right() <= frame.right() + 1e-9);
            prop_assert!(tile.bounds.bottom() <= frame.bottom() + 1e-9);
        }
    }

    #[test]
    fn test_packing_is_deterministic(
        viewport in arb_landscape(),
        count in 0usize..60,
        large in arb_large_set(),
    ) {
        let packer = GridPacker::default();
        prop_assert_eq!(
            packer.pack(viewport, count, &large),
            packer.pack(viewport, count, &large)
        );
    }

    #[test]
    fn test_placed_items_are_a_prefix(
        viewport in arb_landscape(),
        count in 0usize..80,
        large in arb_large_set(),
    ) {
        let layout = GridPacker::default().pack(viewport, count, &large);
        let placed: Vec<usize> = layout.tiles().iter().map(|t| t.item_index).collect();
        let expected: Vec<usize> = (0..placed.len()).collect();
        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn test_portrait_tile_count(len in 0usize..30, width in 100.0..1000.0f64, extra in 0.0..1000.0f64) {
        let viewport = Size::new(width, width + extra);
        let layout = GridPacker::default().pack(viewport, len, &LargeIndexSet::default());
        prop_assert_eq!(layout.tiles().len(), len.min(12));
        prop_assert_eq!(overlapping(layout.tiles()), None);
        if len > 4 {
            let large: Vec<usize> = layout
                .tiles()
                .iter()
                .filter(|t| t.is_large)
                .map(|t| t.item_index)
                .collect();
            prop_assert_eq!(large, vec![4]);
        }
    }

    #[test]
    fn test_transition_keeps_first_target(first in any::<u8>(), second in any::<u8>(), at in 0i64..399) {
        let mut t = TransitionController::new(400);
        prop_assert!(t.start(first, 0));
        prop_assert!(!t.start(second, at));
        prop_assert_eq!(t.tick(400), Frame::Completed(first));
        prop_assert_eq!(t.tick(800), Frame::Idle);
    }

    #[test]
    fn test_center_down_never_captures(angle in 0.0..360.0f64, dist in 0.0..99.0f64) {
        let viewport = Size::new(1000.0, 2000.0);
        let zones = ExclusionZones { center_radius: 100.0, top_band_fraction: 0.15 };
        let mut capture = StrokeCapture::new(zones, viewport, 800);
        let rad = angle.to_radians();
        let down = viewport.center().offset(dist * rad.cos(), dist * rad.sin());
        prop_assert_eq!(capture.pointer_down(0, down, 0), Claim::NotHandled);
        prop_assert!(!capture.pointer_move(0, Point::new(100.0, 1800.0), 5));
        prop_assert_eq!(capture.pointer_up(0, Point::new(100.0, 1800.0), 10), UpOutcome::Ignored);
        prop_assert_eq!(capture.trace().count(), 0);
    }
}

#[test]
fn test_landscape_capacity_exact() {
    // 8×4 cells, no large requests beyond item 4 which fits at (0, 4)
    let viewport = Size::new(2000.0, 1000.0);
    let layout = GridPacker::default().pack(viewport, 50, &LargeIndexSet::default());
    // 32 cells, item 4 takes 4 of them
    assert_eq!(layout.tiles().len(), 29);
}
