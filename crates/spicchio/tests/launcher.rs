use spicchio::catalog::{
    self, AppEntry, AppId, Catalog, CategoryId, CategoryView, ExecCommand, Item, LinkEntry,
    LinkUrl,
};
use spicchio::events::{AppEvent, PointerEvent, PointerPhase};
use spicchio::icons::IconCache;
use spicchio::launcher::{Effect, Launcher, LauncherOptions, Layout, Mode};
use spicchio::protocol;
use spicchio::settings::{JsonFileStore, MemoryStore, SettingsStore};
use std::sync::Arc;
use wedge::dial::SPECIAL_WEDGE;
use wedge::geom::{Point, Size};
use wedge::ink::{InkSample, PointerId};
use wedge::recognizer::{Candidate, Recognizer, RecognizerError, recognize_or_empty};

const PORTRAIT: Size = Size {
    width: 1000.0,
    height: 2000.0,
};

fn app(n: usize) -> AppEntry {
    let label = format!("{}app{}", ["Mail", "Notes", "Tetris"][n % 3], n);
    AppEntry {
        id: AppId::new(format!("app{}", n)),
        exec: ExecCommand::new(format!("run-{}", n)),
        icon: None,
        category: Some(CategoryId::new((n % 3) as i32)),
        label,
    }
}

fn options(viewport: Size) -> LauncherOptions {
    LauncherOptions {
        viewport,
        seed: Some(42),
        ..LauncherOptions::default()
    }
}

fn launcher_with(apps: usize, settings: Box<dyn SettingsStore>, viewport: Size) -> Launcher {
    Launcher::new(
        options(viewport),
        Box::new(Catalog::new(
            (0..apps).map(app).collect(),
            Vec::new(),
            Vec::new(),
            [],
        )),
        settings,
        Arc::new(IconCache::new()),
    )
}

fn send(l: &mut Launcher, line: &str, now_ms: i64) -> Vec<Effect> {
    let event = protocol::parse(line)
        .unwrap()
        .into_event(now_ms)
        .expect("command without an event");
    l.handle(event, now_ms)
}

fn pointer(
    l: &mut Launcher,
    phase: PointerPhase,
    id: PointerId,
    p: (f64, f64),
    t: i64,
) -> Vec<Effect> {
    l.handle(
        AppEvent::Pointer(PointerEvent {
            phase,
            id,
            point: Point::new(p.0, p.1),
            t_ms: t,
        }),
        t,
    )
}

struct Fixed(&'static str);

impl Recognizer for Fixed {
    fn recognize(&self, _sample: &InkSample) -> Result<Vec<Candidate>, RecognizerError> {
        Ok(vec![Candidate::new(self.0, Some(0.8))])
    }
}

#[test]
fn test_first_start_seeds_home_slots() {
    let l = launcher_with(15, Box::new(MemoryStore::new()), PORTRAIT);
    assert_eq!(l.mode(), Mode::Dial);
    assert_eq!(l.items().len(), 11);
    assert!(l.resolver().home_slot(SPECIAL_WEDGE).is_none());
    assert_eq!(l.item_at(SPECIAL_WEDGE), Some(Item::Special));
}

#[test]
fn test_settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("settings.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut l = launcher_with(3, Box::new(store), PORTRAIT);
        send(&mut l, "bind outer:e app2", 0);
        send(&mut l, "toggle", 0);
        send(&mut l, "rename 1 Writing", 0);
    }

    let store = JsonFileStore::open(&path).unwrap();
    let l = launcher_with(3, Box::new(store), PORTRAIT);
    assert_eq!(l.mode(), Mode::Collage);
    assert_eq!(
        l.resolver().home_slot(1).map(|a| a.id.as_str()),
        Some("app2")
    );
    assert_eq!(l.resolver().category_name(CategoryId::new(1)), "Writing");
}

#[test]
fn test_shared_link_opens_from_the_collage() {
    let mut l = launcher_with(2, Box::new(MemoryStore::new()), PORTRAIT);
    send(&mut l, "toggle", 0);
    send(&mut l, "share example.org", 0);
    send(&mut l, "category links", 0);
    assert_eq!(l.view(), CategoryView::Category(CategoryId::LINKS));
    assert_eq!(l.items().len(), 1);

    // second tile of the portrait template, right of the special one
    pointer(&mut l, PointerPhase::Down, 0, (375.0, 625.0), 100);
    let effects = pointer(&mut l, PointerPhase::Up, 0, (375.0, 625.0), 150);
    assert_eq!(effects, vec![Effect::OpenLink(LinkUrl::from("example.org"))]);

    // special tile goes home
    pointer(&mut l, PointerPhase::Down, 0, (125.0, 625.0), 200);
    pointer(&mut l, PointerPhase::Up, 0, (125.0, 625.0), 250);
    assert_eq!(l.view(), CategoryView::Home);
}

#[test]
fn test_unshared_link_leaves_its_category_and_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut l = launcher_with(2, Box::new(JsonFileStore::open(&path).unwrap()), PORTRAIT);
    send(&mut l, "toggle", 0);
    send(&mut l, "share example.org", 0);
    send(&mut l, "share news.example", 0);
    send(&mut l, "assign link example.org 5", 0);
    send(&mut l, "category 5", 0);
    assert_eq!(l.items(), &[Item::Link(LinkEntry::new(LinkUrl::from("example.org")))]);

    assert_eq!(send(&mut l, "unshare example.org", 0), vec![Effect::Redraw]);
    assert!(l.items().is_empty());
    assert!(send(&mut l, "unshare example.org", 0).is_empty());

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.get("link_cat_example.org").is_none());
    assert_eq!(
        catalog::stored_links(&store),
        vec![LinkUrl::from("news.example")]
    );
}

#[test]
fn test_drawing_an_initial_filters_the_dial() {
    let mut l = launcher_with(9, Box::new(MemoryStore::new()), PORTRAIT);

    // two fingers below the dial make one sample
    assert_eq!(
        pointer(&mut l, PointerPhase::Down, 0, (100.0, 1600.0), 0),
        vec![Effect::Redraw]
    );
    pointer(&mut l, PointerPhase::Down, 1, (600.0, 1600.0), 5);
    pointer(&mut l, PointerPhase::Move, 0, (120.0, 1700.0), 10);
    pointer(&mut l, PointerPhase::Move, 1, (620.0, 1700.0), 10);
    assert_eq!(
        pointer(&mut l, PointerPhase::Up, 0, (140.0, 1800.0), 20),
        vec![Effect::Redraw]
    );
    let effects = pointer(&mut l, PointerPhase::Up, 1, (640.0, 1800.0), 30);
    let Some(Effect::Recognize(sample)) = effects.first() else {
        panic!("expected a recognition request, got {:?}", effects);
    };
    assert_eq!(sample.strokes.len(), 2);
    assert_eq!(l.ink_trace().count(), 2);

    let recognition = recognize_or_empty(&Fixed("n"), sample);
    let effects = l.handle(AppEvent::Recognized(recognition), 40);
    assert!(effects.contains(&Effect::Animate { duration_ms: 400 }));
    l.handle(AppEvent::Tick, 500);

    assert_eq!(l.view(), CategoryView::Initial('n'));
    assert_eq!(l.items().len(), 3);
    assert!(
        l.items()
            .iter()
            .all(|item| item.label().is_some_and(|label| label.starts_with("Notes")))
    );
}

#[test]
fn test_short_press_in_the_top_band_does_nothing() {
    let mut l = launcher_with(3, Box::new(MemoryStore::new()), PORTRAIT);
    assert!(pointer(&mut l, PointerPhase::Down, 0, (500.0, 100.0), 0).is_empty());
    assert!(pointer(&mut l, PointerPhase::Up, 0, (500.0, 100.0), 10).is_empty());
    assert_eq!(l.mode(), Mode::Dial);
    assert_eq!(l.ink_trace().count(), 0);
}

#[test]
fn test_landscape_collage_fills_the_grid() {
    let mut l = launcher_with(60, Box::new(MemoryStore::new()), Size::new(2000.0, 1000.0));
    send(&mut l, "toggle", 0);
    send(&mut l, "category all", 0);
    assert_eq!(l.items().len(), 60);

    let Layout::Grid(grid) = l.layout() else {
        panic!("expected a grid");
    };
    // 4 rows of 250px cells, 8 columns
    let cells: usize = grid
        .tiles()
        .iter()
        .map(|t| if t.is_large { 4 } else { 1 })
        .sum();
    assert!(cells <= 32);
    assert!(grid.tiles().len() < 61);
    for (i, tile) in grid.tiles().iter().enumerate() {
        assert_eq!(tile.item_index, i);
        if tile.is_large {
            assert!(l.large_tiles().contains(i));
        }
    }
}
