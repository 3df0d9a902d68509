//! The launcher's state machine.
//!
//! Everything that changes what is on screen goes through [`Launcher::handle`],
//! which returns the side effects the runtime has to carry out. The launcher
//! itself never blocks, spawns, or sleeps.

use crate::catalog::{
    self, AppEntry, AppId, CategoryId, CategoryView, Item, ItemProvider, LinkUrl, Resolver,
};
use crate::config::Config;
use crate::events::{AppEvent, Assignee, PointerEvent, PointerPhase};
use crate::icons::{self, IconCache};
use crate::settings::{SettingsStore, keys};
use fastrand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use strum::Display as StrumDisplay;
use wedge::dial::{DialGeometry, DialLayout, SPECIAL_WEDGE, WEDGE_COUNT, item_for_wedge};
use wedge::draw::{Content, Theme};
use wedge::gauge::BatteryGauge;
use wedge::geom::Size;
use wedge::grid::{GridLayout, GridPacker, LargeIndexSet};
use wedge::ink::{
    Claim, ClearTicket, ExclusionZones, InkSample, PointerId, Stroke, StrokeCapture, UpOutcome,
};
use wedge::recognizer::Recognition;
use wedge::region::{Hit, Surface};
use wedge::transition::{Frame, TransitionController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Dial,
    Collage,
}

/// Work the runtime does on the launcher's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Launch(AppEntry),
    OpenLink(LinkUrl),
    /// Offer the category list, sorted by id, with display names.
    ShowCategories(Vec<(CategoryId, String)>),
    /// Ask which app goes into home wedge `slot`.
    PickSlot(usize),
    Recognize(InkSample),
    /// Send `AppEvent::ClearInk(ticket)` back after `after_ms`.
    ScheduleClear { ticket: ClearTicket, after_ms: i64 },
    /// Send `AppEvent::Tick` every frame until the twist has run `duration_ms`.
    Animate { duration_ms: i64 },
    /// Center tap at home.
    Dismiss,
    Redraw,
}

#[derive(Debug, Clone)]
pub enum Layout {
    Dial(DialLayout),
    Grid(GridLayout),
}

impl Layout {
    pub fn surface(&self) -> &dyn Surface {
        match self {
            Layout::Dial(dial) => dial,
            Layout::Grid(grid) => grid,
        }
    }
}

/// Knobs taken from [`Config`].
#[derive(Debug, Clone)]
pub struct LauncherOptions {
    pub viewport: Size,
    pub dial: DialGeometry,
    pub packer: GridPacker,
    pub zones: ExclusionZones,
    pub clear_delay_ms: i64,
    pub long_press_ms: i64,
    pub transition_ms: i64,
    pub theme: Theme,
    pub seed: Option<u64>,
}

impl LauncherOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            viewport: config.viewport(),
            dial: config.dial.geometry(),
            packer: GridPacker {
                landscape_rows: config.collage.landscape_rows,
            },
            zones: config.ink.zones(),
            clear_delay_ms: config.ink.clear_delay_ms,
            long_press_ms: config.input.long_press_ms,
            transition_ms: config.transition.duration_ms,
            theme: config.theme.theme(),
            seed: config.collage.seed,
        }
    }
}

impl Default for LauncherOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A pointer that went down on a control rather than into the ink layer.
#[derive(Debug, Clone, Copy)]
struct Press {
    down_at_ms: i64,
    center: bool,
    top_band: bool,
    hit: Option<Hit>,
}

pub struct Launcher {
    options: LauncherOptions,
    provider: Box<dyn ItemProvider>,
    settings: Box<dyn SettingsStore>,
    icons: Arc<IconCache>,
    mode: Mode,
    view: CategoryView,
    /// Items of `view`, without the special item.
    items: Vec<Item>,
    large: LargeIndexSet,
    rng: Rng,
    layout: Layout,
    transition: TransitionController<CategoryView>,
    ink: StrokeCapture,
    presses: HashMap<PointerId, Press>,
    battery: Option<BatteryGauge>,
}

impl Launcher {
    pub fn new(
        options: LauncherOptions,
        provider: Box<dyn ItemProvider>,
        mut settings: Box<dyn SettingsStore>,
        icons: Arc<IconCache>,
    ) -> Self {
        let mut rng = options.seed.map_or_else(Rng::new, Rng::with_seed);
        if let Err(e) = catalog::seed_home_slots(provider.as_ref(), settings.as_mut(), &mut rng) {
            log::error!("Failed to seed home slots: {}", e);
        }
        let mode = if settings.get_bool(keys::COLLAGE_MODE).unwrap_or(false) {
            Mode::Collage
        } else {
            Mode::Dial
        };

        let mut launcher = Self {
            layout: Layout::Dial(DialLayout::new(options.viewport, options.dial)),
            transition: TransitionController::new(options.transition_ms),
            ink: StrokeCapture::new(options.zones, options.viewport, options.clear_delay_ms),
            options,
            provider,
            settings,
            icons,
            mode,
            view: CategoryView::Home,
            items: Vec::new(),
            large: LargeIndexSet::default(),
            rng,
            presses: HashMap::new(),
            battery: None,
        };
        launcher.apply_view(CategoryView::Home);
        launcher
    }

    /// Swaps in a reloaded configuration. The view and the current viewport
    /// survive; strokes in progress do not.
    pub fn reconfigure(&mut self, mut options: LauncherOptions, provider: Box<dyn ItemProvider>) {
        options.viewport = self.options.viewport;
        self.finish_transition();
        self.transition = TransitionController::new(options.transition_ms);
        self.ink = StrokeCapture::new(options.zones, options.viewport, options.clear_delay_ms);
        self.presses.clear();
        self.options = options;
        self.provider = provider;
        self.icons.clear();
        self.apply_view(self.view);
    }

    pub fn handle(&mut self, event: AppEvent, now_ms: i64) -> Vec<Effect> {
        match event {
            AppEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down => self.pointer_down(pointer),
                PointerPhase::Move => self.pointer_move(pointer),
                PointerPhase::Up => self.pointer_up(pointer, now_ms),
            },
            AppEvent::Resize(size) => self.resize(size),
            AppEvent::Tick => self.tick(now_ms),
            AppEvent::ToggleMode => self.toggle_mode(),
            AppEvent::Back => self.back(now_ms),
            AppEvent::Bind { slot, app } => self.bind(slot, app),
            AppEvent::ShowCategory(id) => self.navigate(CategoryView::Category(id), now_ms),
            AppEvent::Share(url) => self.share(url),
            AppEvent::Unshare(url) => self.unshare(url),
            AppEvent::Assign { target, category } => self.assign(target, category),
            AppEvent::Rename { category, name } => self.rename(category, name),
            AppEvent::Recognized(recognition) => self.recognized(&recognition, now_ms),
            AppEvent::ClearInk(ticket) => {
                if self.ink.clear(ticket) {
                    vec![Effect::Redraw]
                } else {
                    Vec::new()
                }
            }
            AppEvent::Battery(level) => {
                self.battery = Some(BatteryGauge::new(level));
                vec![Effect::Redraw]
            }
            AppEvent::Frame(_) | AppEvent::ConfigReload => {
                log::debug!("{:?} is handled by the main loop", event);
                Vec::new()
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> CategoryView {
        self.view
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> Size {
        self.options.viewport
    }

    pub fn theme(&self) -> &Theme {
        &self.options.theme
    }

    pub fn zones(&self) -> ExclusionZones {
        self.options.zones
    }

    pub fn large_tiles(&self) -> &LargeIndexSet {
        &self.large
    }

    pub fn is_rotating(&self) -> bool {
        self.transition.is_rotating()
    }

    pub fn rotation_deg(&self) -> f64 {
        self.transition.degrees()
    }

    pub fn ink_trace(&self) -> impl Iterator<Item = &Stroke> {
        self.ink.trace()
    }

    pub fn battery(&self) -> Option<&BatteryGauge> {
        self.battery.as_ref()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.provider.as_ref(), self.settings.as_ref())
    }

    /// Heading for the current item set; none at home.
    pub fn title(&self) -> Option<String> {
        match self.view {
            CategoryView::Home => None,
            CategoryView::Category(id) => Some(self.resolver().category_name(id)),
            CategoryView::Initial(c) => Some(c.to_uppercase().collect()),
        }
    }

    /// The item a dial wedge or collage tile shows.
    pub fn item_at(&self, slot: usize) -> Option<Item> {
        match self.mode {
            Mode::Dial if slot == SPECIAL_WEDGE => Some(Item::Special),
            Mode::Dial => match self.view {
                CategoryView::Home => self
                    .resolver()
                    .home_slot(slot)
                    .map(|app| Item::App(app.clone())),
                _ => item_for_wedge(slot).and_then(|i| self.items.get(i).cloned()),
            },
            Mode::Collage if slot == 0 => Some(Item::Special),
            Mode::Collage => self.items.get(slot - 1).cloned(),
        }
    }

    pub fn content_for(&self, slot: usize) -> Content {
        match self.item_at(slot) {
            Some(Item::App(app)) => icons::app_content(&app, &self.icons),
            Some(Item::Link(link)) => Content::Label(link.label().to_string()),
            Some(Item::Special) | None => Content::Empty,
        }
    }

    fn pointer_down(&mut self, pointer: PointerEvent) -> Vec<Effect> {
        if self.transition.is_rotating() {
            log::debug!("Ignoring pointer {} while twisting", pointer.id);
            return Vec::new();
        }
        let viewport = self.options.viewport;
        let center = self.options.zones.in_center(pointer.point, viewport);
        let top_band = self.options.zones.in_top_band(pointer.point, viewport);
        let hit = if center {
            None
        } else {
            self.layout.surface().hit_test(pointer.point)
        };

        if center || top_band || hit.is_some() {
            self.presses.insert(
                pointer.id,
                Press {
                    down_at_ms: pointer.t_ms,
                    center,
                    top_band,
                    hit,
                },
            );
            return Vec::new();
        }

        match self.ink.pointer_down(pointer.id, pointer.point, pointer.t_ms) {
            Claim::Handled => vec![Effect::Redraw],
            Claim::NotHandled => Vec::new(),
        }
    }

    fn pointer_move(&mut self, pointer: PointerEvent) -> Vec<Effect> {
        if self
            .ink
            .pointer_move(pointer.id, pointer.point, pointer.t_ms)
        {
            vec![Effect::Redraw]
        } else {
            Vec::new()
        }
    }

    fn pointer_up(&mut self, pointer: PointerEvent, now_ms: i64) -> Vec<Effect> {
        if let Some(press) = self.presses.remove(&pointer.id) {
            return self.release(press, pointer, now_ms);
        }

        match self.ink.pointer_up(pointer.id, pointer.point, pointer.t_ms) {
            UpOutcome::Ignored => Vec::new(),
            UpOutcome::StrokeClosed(_) => vec![Effect::Redraw],
            UpOutcome::Finished { sample, clear, .. } => vec![
                Effect::Recognize(sample),
                Effect::ScheduleClear {
                    ticket: clear,
                    after_ms: self.ink.clear_delay_ms(),
                },
                Effect::Redraw,
            ],
        }
    }

    fn release(&mut self, press: Press, pointer: PointerEvent, now_ms: i64) -> Vec<Effect> {
        if self.transition.is_rotating() {
            return Vec::new();
        }
        let long = pointer.t_ms - press.down_at_ms >= self.options.long_press_ms;
        let viewport = self.options.viewport;

        if press.center {
            return if self.options.zones.in_center(pointer.point, viewport) {
                self.center_tap(now_ms)
            } else {
                Vec::new()
            };
        }
        if press.top_band && long {
            return self.toggle_mode();
        }

        let Some(hit) = press.hit else {
            return Vec::new();
        };
        // slid off the control before lifting
        if self.layout.surface().hit_test(pointer.point) != Some(hit) {
            return Vec::new();
        }
        if long && self.is_bindable(hit.slot) {
            log::info!("Picking an app for slot {}", hit.slot + 1);
            return vec![Effect::PickSlot(hit.slot)];
        }
        self.tap(hit.slot, now_ms)
    }

    fn is_bindable(&self, slot: usize) -> bool {
        self.mode == Mode::Dial
            && self.view == CategoryView::Home
            && slot != SPECIAL_WEDGE
            && slot < WEDGE_COUNT
    }

    fn tap(&mut self, slot: usize, now_ms: i64) -> Vec<Effect> {
        match self.item_at(slot) {
            Some(Item::Special) => self.special(now_ms),
            Some(Item::App(app)) if self.view == CategoryView::Home => {
                let category = self.resolver().app_category(&app);
                self.navigate(CategoryView::Category(category), now_ms)
            }
            Some(Item::App(app)) => {
                log::info!("Launching {}", app.label);
                vec![Effect::Launch(app)]
            }
            Some(Item::Link(link)) => {
                log::info!("Opening {}", link.url);
                vec![Effect::OpenLink(link.url)]
            }
            None => {
                log::debug!("Nothing at {} slot {}", self.mode, slot);
                Vec::new()
            }
        }
    }

    fn special(&mut self, now_ms: i64) -> Vec<Effect> {
        if self.view != CategoryView::Home {
            return self.navigate(CategoryView::Home, now_ms);
        }
        let resolver = self.resolver();
        let categories = resolver
            .categories()
            .into_iter()
            .map(|id| (id, resolver.category_name(id)))
            .collect();
        vec![Effect::ShowCategories(categories)]
    }

    fn center_tap(&mut self, now_ms: i64) -> Vec<Effect> {
        if self.view == CategoryView::Home {
            vec![Effect::Dismiss]
        } else {
            self.navigate(CategoryView::Home, now_ms)
        }
    }

    fn back(&mut self, now_ms: i64) -> Vec<Effect> {
        if self.view == CategoryView::Home {
            Vec::new()
        } else {
            self.navigate(CategoryView::Home, now_ms)
        }
    }

    fn recognized(&mut self, recognition: &Recognition, now_ms: i64) -> Vec<Effect> {
        match recognition.top_char() {
            Some(c) => {
                log::info!("Recognized '{}'", c);
                self.navigate(CategoryView::Initial(c), now_ms)
            }
            None => {
                log::debug!("Recognizer had nothing for the last sample");
                Vec::new()
            }
        }
    }

    /// Collages switch immediately; the dial twists there first.
    fn navigate(&mut self, target: CategoryView, now_ms: i64) -> Vec<Effect> {
        match self.mode {
            Mode::Collage => {
                self.apply_view(target);
                vec![Effect::Redraw]
            }
            Mode::Dial => {
                if !self.transition.start(target, now_ms) {
                    log::debug!("Already twisting; dropping {}", target);
                    return Vec::new();
                }
                log::debug!("Twisting to {}", target);
                vec![
                    Effect::Animate {
                        duration_ms: self.options.transition_ms,
                    },
                    Effect::Redraw,
                ]
            }
        }
    }

    fn tick(&mut self, now_ms: i64) -> Vec<Effect> {
        match self.transition.tick(now_ms) {
            Frame::Idle => Vec::new(),
            Frame::Rotating { .. } => vec![Effect::Redraw],
            Frame::Completed(view) => {
                self.apply_view(view);
                vec![Effect::Redraw]
            }
        }
    }

    fn finish_transition(&mut self) {
        if let Frame::Completed(view) = self.transition.advance(1.0) {
            self.view = view;
        }
    }

    /// Shows `view` right away: new items, new large tiles, new layout.
    fn apply_view(&mut self, view: CategoryView) {
        let items = self.resolver().items(&view);
        self.view = view;
        self.items = items;
        self.large = LargeIndexSet::choose(self.items.len() + 1, &mut self.rng);
        self.relayout();
    }

    fn refresh(&mut self) -> Vec<Effect> {
        // a running twist picks up the change when it lands
        if !self.transition.is_rotating() {
            self.apply_view(self.view);
        }
        vec![Effect::Redraw]
    }

    fn relayout(&mut self) {
        let viewport = self.options.viewport;
        self.layout = match self.mode {
            Mode::Dial => Layout::Dial(DialLayout::new(viewport, self.options.dial)),
            Mode::Collage => Layout::Grid(self.options.packer.pack(
                viewport,
                self.items.len() + 1,
                &self.large,
            )),
        };
    }

    fn resize(&mut self, size: Size) -> Vec<Effect> {
        if size == self.options.viewport {
            return Vec::new();
        }
        log::debug!("Viewport {}x{}", size.width, size.height);
        self.options.viewport = size;
        self.ink.set_viewport(size);
        self.presses.clear();
        self.relayout();
        vec![Effect::Redraw]
    }

    fn toggle_mode(&mut self) -> Vec<Effect> {
        self.finish_transition();
        self.mode = match self.mode {
            Mode::Dial => Mode::Collage,
            Mode::Collage => Mode::Dial,
        };
        log::info!("Switched to {} mode", self.mode);
        self.store(
            keys::COLLAGE_MODE,
            &(self.mode == Mode::Collage).to_string(),
        );
        self.presses.clear();
        self.apply_view(self.view);
        vec![Effect::Redraw]
    }

    fn bind(&mut self, slot: usize, app: AppId) -> Vec<Effect> {
        if slot == SPECIAL_WEDGE || slot >= WEDGE_COUNT {
            log::warn!("Slot {} cannot hold an app", slot + 1);
            return Vec::new();
        }
        if self.resolver().app(&app).is_none() {
            log::warn!("Unknown app '{}'", app);
            return Vec::new();
        }
        self.store(&keys::slot(slot), &app);
        self.refresh()
    }

    fn share(&mut self, url: LinkUrl) -> Vec<Effect> {
        match catalog::share_link(self.settings.as_mut(), url.clone()) {
            Ok(true) => {
                log::info!("Saved link {}", url);
                self.refresh()
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                log::error!("Failed to save link {}: {}", url, e);
                Vec::new()
            }
        }
    }

    fn unshare(&mut self, url: LinkUrl) -> Vec<Effect> {
        match catalog::remove_link(self.settings.as_mut(), &url) {
            Ok(true) => {
                log::info!("Removed link {}", url);
                self.refresh()
            }
            Ok(false) => {
                log::warn!("No shared link {}", url);
                Vec::new()
            }
            Err(e) => {
                log::error!("Failed to remove link {}: {}", url, e);
                Vec::new()
            }
        }
    }

    fn assign(&mut self, target: Assignee, category: CategoryId) -> Vec<Effect> {
        let key = match &target {
            Assignee::App(id) => keys::app_category(id),
            Assignee::Link(url) => keys::link_category(url),
        };
        self.store(&key, &category.id().to_string());
        self.refresh()
    }

    fn rename(&mut self, category: CategoryId, name: String) -> Vec<Effect> {
        if !category.is_renamable() {
            log::warn!("Category {} cannot be renamed", category);
            return Vec::new();
        }
        self.store(&keys::category_name(category.id()), &name);
        vec![Effect::Redraw]
    }

    /// Settings failures are logged; the launcher keeps going with what it has.
    fn store(&mut self, key: &str, value: &str) {
        if let Err(e) = self.settings.set(key, value) {
            log::error!("Failed to save '{}': {}", key, e);
        }
    }
}
