//! What the launcher can show: apps and links from config, categorized
//! through the settings store.

use crate::settings::{SettingsError, SettingsStore, keys};
use derive_more::{AsRef, Deref, Display, From, Into};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::str::FromStr;
use wedge::dial::{SPECIAL_WEDGE, WEDGE_COUNT};

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct AppId(String);

wedge::impl_string_newtype!(AppId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ExecCommand(String);

wedge::impl_string_newtype!(ExecCommand);

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct LinkUrl(String);

wedge::impl_string_newtype!(LinkUrl);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct CategoryId(i32);

impl CategoryId {
    /// Every app and link.
    pub const ALL: Self = Self(-2);
    pub const OTHER: Self = Self(-1);
    /// Default home of links.
    pub const LINKS: Self = Self(999);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> i32 {
        self.0
    }

    pub fn is_renamable(&self) -> bool {
        *self != Self::ALL && *self != Self::LINKS
    }

    pub fn default_name(&self) -> &'static str {
        match self.0 {
            -2 => "All",
            999 => "Links",
            0 => "Games",
            1 => "Audio",
            2 => "Video",
            3 => "Images",
            4 => "Social",
            5 => "News",
            6 => "Maps",
            7 => "Productivity",
            _ => "Other",
        }
    }
}

impl FromStr for CategoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::ALL),
            "links" => Ok(Self::LINKS),
            "other" => Ok(Self::OTHER),
            n => n.parse().map(Self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    pub id: AppId,
    pub label: String,
    pub exec: ExecCommand,
    #[serde(default)]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub url: LinkUrl,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

impl LinkEntry {
    pub fn new(url: LinkUrl) -> Self {
        Self {
            url,
            title: None,
            category: None,
        }
    }

    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Categories at home, back everywhere else.
    Special,
    App(AppEntry),
    Link(LinkEntry),
}

impl Item {
    pub fn label(&self) -> Option<&str> {
        match self {
            Item::Special => None,
            Item::App(app) => Some(&app.label),
            Item::Link(link) => Some(link.label()),
        }
    }
}

/// The item set on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum CategoryView {
    #[default]
    #[display("home")]
    Home,
    #[display("category {_0}")]
    Category(CategoryId),
    #[display("initial '{_0}'")]
    Initial(char),
}

/// Registry of launchable things.
pub trait ItemProvider: Send {
    fn apps(&self) -> &[AppEntry];
    fn links(&self) -> &[LinkEntry];

    fn category_name(&self, _id: CategoryId) -> Option<&str> {
        None
    }

    /// Binding used for a home slot the settings say nothing about.
    fn default_slot(&self, _slot: usize) -> Option<&AppId> {
        None
    }
}

/// Provider backed by the `[[apps]]`, `[[links]]`, `[[categories]]`, and
/// `[[slots]]` config tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    apps: Vec<AppEntry>,
    links: Vec<LinkEntry>,
    names: HashMap<CategoryId, String>,
    slots: HashMap<usize, AppId>,
}

impl Catalog {
    pub fn new(
        apps: Vec<AppEntry>,
        links: Vec<LinkEntry>,
        categories: Vec<CategoryEntry>,
        slots: impl IntoIterator<Item = (usize, AppId)>,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let apps = apps
            .into_iter()
            .filter(|app| {
                let fresh = seen.insert(app.id.clone());
                if !fresh {
                    log::warn!("Duplicate app id '{}' ignored", app.id);
                }
                fresh
            })
            .collect();
        Self {
            apps,
            links,
            names: categories.into_iter().map(|c| (c.id, c.name)).collect(),
            slots: slots.into_iter().collect(),
        }
    }
}

impl ItemProvider for Catalog {
    fn apps(&self) -> &[AppEntry] {
        &self.apps
    }

    fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    fn default_slot(&self, slot: usize) -> Option<&AppId> {
        self.slots.get(&slot)
    }
}

/// Read-only view joining a provider with user overrides from settings.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    pub provider: &'a dyn ItemProvider,
    pub settings: &'a dyn SettingsStore,
}

impl<'a> Resolver<'a> {
    pub fn new(provider: &'a dyn ItemProvider, settings: &'a dyn SettingsStore) -> Self {
        Self { provider, settings }
    }

    pub fn app(&self, id: &AppId) -> Option<&'a AppEntry> {
        self.provider.apps().iter().find(|a| &a.id == id)
    }

    pub fn app_category(&self, app: &AppEntry) -> CategoryId {
        self.settings
            .get_i32(&keys::app_category(&app.id))
            .map(CategoryId)
            .or(app.category)
            .unwrap_or(CategoryId::OTHER)
    }

    pub fn link_category(&self, link: &LinkEntry) -> CategoryId {
        self.settings
            .get_i32(&keys::link_category(&link.url))
            .map(CategoryId)
            .or(link.category)
            .unwrap_or(CategoryId::LINKS)
    }

    /// Configured links followed by shared ones not already configured.
    pub fn links(&self) -> Vec<LinkEntry> {
        let mut links = self.provider.links().to_vec();
        for url in stored_links(self.settings) {
            if !links.iter().any(|l| l.url == url) {
                links.push(LinkEntry::new(url));
            }
        }
        links
    }

    pub fn category_name(&self, id: CategoryId) -> String {
        id.is_renamable()
            .then(|| self.settings.get(&keys::category_name(id.id())))
            .flatten()
            .or_else(|| self.provider.category_name(id).map(str::to_string))
            .unwrap_or_else(|| id.default_name().to_string())
    }

    /// Categories in use, plus links and all, sorted by id.
    pub fn categories(&self) -> Vec<CategoryId> {
        let mut ids: BTreeSet<CategoryId> = self
            .provider
            .apps()
            .iter()
            .map(|a| self.app_category(a))
            .collect();
        ids.extend(self.links().iter().map(|l| self.link_category(l)));
        ids.insert(CategoryId::LINKS);
        ids.insert(CategoryId::ALL);
        ids.into_iter().collect()
    }

    /// App bound to home slot `slot`; the special slot is never bound.
    pub fn home_slot(&self, slot: usize) -> Option<&'a AppEntry> {
        if slot == SPECIAL_WEDGE || slot >= WEDGE_COUNT {
            return None;
        }
        match self.settings.get(&keys::slot(slot)) {
            Some(id) => self.app(&AppId::new(id)),
            None => self.provider.default_slot(slot).and_then(|id| self.app(id)),
        }
    }

    /// Items of `view` in display order, without the special item.
    pub fn items(&self, view: &CategoryView) -> Vec<Item> {
        match *view {
            CategoryView::Home => (0..WEDGE_COUNT)
                .filter_map(|slot| self.home_slot(slot))
                .map(|app| Item::App(app.clone()))
                .collect(),
            CategoryView::Category(id) => self.collect(
                |app| id == CategoryId::ALL || self.app_category(app) == id,
                |link| id == CategoryId::ALL || self.link_category(link) == id,
            ),
            CategoryView::Initial(c) => self.collect(
                |app| starts_with(&app.label, c),
                |link| starts_with(link.label(), c),
            ),
        }
    }

    /// Apps by lower-cased label, then links by url.
    fn collect(
        &self,
        app_filter: impl Fn(&AppEntry) -> bool,
        link_filter: impl Fn(&LinkEntry) -> bool,
    ) -> Vec<Item> {
        let mut apps: Vec<&AppEntry> = self
            .provider
            .apps()
            .iter()
            .filter(|a| app_filter(a))
            .collect();
        apps.sort_by_cached_key(|a| a.label.to_lowercase());

        let mut links: Vec<LinkEntry> = self.links().into_iter().filter(&link_filter).collect();
        links.sort_by(|a, b| a.url.cmp(&b.url));

        apps.into_iter()
            .map(|a| Item::App(a.clone()))
            .chain(links.into_iter().map(Item::Link))
            .collect()
    }
}

fn starts_with(label: &str, initial: char) -> bool {
    label
        .chars()
        .find(|c| !c.is_whitespace())
        .is_some_and(|first| first.to_lowercase().eq(initial.to_lowercase()))
}

/// Links shared at runtime, newest first.
pub fn stored_links(settings: &dyn SettingsStore) -> Vec<LinkUrl> {
    let Some(raw) = settings.get(keys::LINKS) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed stored links: {}", e);
        Vec::new()
    })
}

/// Adds `url` in front of the stored links. Returns false if it was already there.
pub fn share_link(settings: &mut dyn SettingsStore, url: LinkUrl) -> Result<bool, SettingsError> {
    let mut links = stored_links(settings);
    if links.contains(&url) {
        return Ok(false);
    }
    links.insert(0, url);
    settings.set(keys::LINKS, &serde_json::to_string(&links)?)?;
    Ok(true)
}

/// Drops `url` from the stored links along with its category override.
/// Returns false if it was not stored; configured links stay.
pub fn remove_link(settings: &mut dyn SettingsStore, url: &LinkUrl) -> Result<bool, SettingsError> {
    let mut links = stored_links(settings);
    let before = links.len();
    links.retain(|l| l != url);
    if links.len() == before {
        return Ok(false);
    }
    if links.is_empty() {
        settings.remove(keys::LINKS)?;
    } else {
        settings.set(keys::LINKS, &serde_json::to_string(&links)?)?;
    }
    settings.remove(&keys::link_category(url))?;
    Ok(true)
}

/// Fills the home slots from a shuffled app list when nothing was ever bound.
/// The special slot stays empty.
pub fn seed_home_slots(
    provider: &dyn ItemProvider,
    settings: &mut dyn SettingsStore,
    rng: &mut Rng,
) -> Result<bool, SettingsError> {
    let untouched = keys::slots().all(|k| settings.get(&k).is_none())
        && (0..WEDGE_COUNT).all(|s| provider.default_slot(s).is_none());
    if !untouched || provider.apps().is_empty() {
        return Ok(false);
    }

    let mut shuffled: Vec<&AppEntry> = provider.apps().iter().collect();
    rng.shuffle(&mut shuffled);
    for (slot, app) in (0..WEDGE_COUNT).zip(shuffled) {
        if slot != SPECIAL_WEDGE {
            settings.set(&keys::slot(slot), &app.id)?;
        }
    }
    log::info!("Seeded home slots from {} apps", provider.apps().len());
    Ok(true)
}
