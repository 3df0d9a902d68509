use crate::catalog::{AppEntry, AppId, Catalog, CategoryEntry, LinkEntry};
use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DisplayFromStr, SerializeDisplay, serde_as};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use wedge::dial::{DialGeometry, Position, Ring, SPECIAL_WEDGE, wedge_index};
use wedge::draw::Theme;
use wedge::geom::Size;
use wedge::ink::{ExclusionZones, MAX_CLEAR_DELAY_MS, MIN_CLEAR_DELAY_MS};

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid color '{0}': expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

/// Color written as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, DeserializeFromStr, SerializeDisplay)]
pub struct HexColor(pub Srgba<f64>);

impl FromStr for HexColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        let (rgb, alpha) = match hex.len() {
            6 => (hex, 255),
            8 if hex.is_ascii() => (
                &hex[..6],
                u8::from_str_radix(&hex[6..], 16).map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };
        let rgb = palette::Srgb::<u8>::from_str(rgb).map_err(|_| invalid())?;
        Ok(Self(Srgba::new(
            rgb.red as f64 / 255.0,
            rgb.green as f64 / 255.0,
            rgb.blue as f64 / 255.0,
            alpha as f64 / 255.0,
        )))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0.into_format::<u8, u8>();
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            c.red, c.green, c.blue, c.alpha
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 2340.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    pub outer_fraction: f64,
    pub inner_fraction: f64,
}

impl Default for DialConfig {
    fn default() -> Self {
        let geometry = DialGeometry::default();
        Self {
            outer_fraction: geometry.outer_fraction,
            inner_fraction: geometry.inner_fraction,
        }
    }
}

impl DialConfig {
    pub fn geometry(&self) -> DialGeometry {
        DialGeometry {
            outer_fraction: self.outer_fraction,
            inner_fraction: self.inner_fraction,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollageConfig {
    pub landscape_rows: usize,
    pub seed: Option<u64>,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            landscape_rows: wedge::grid::LANDSCAPE_ROWS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InkConfig {
    pub clear_delay_ms: i64,
    pub center_radius: f64,
    pub top_band_fraction: f64,
}

impl Default for InkConfig {
    fn default() -> Self {
        let zones = ExclusionZones::default();
        Self {
            clear_delay_ms: wedge::ink::DEFAULT_CLEAR_DELAY_MS,
            center_radius: zones.center_radius,
            top_band_fraction: zones.top_band_fraction,
        }
    }
}

impl InkConfig {
    pub fn zones(&self) -> ExclusionZones {
        ExclusionZones {
            center_radius: self.center_radius,
            top_band_fraction: self.top_band_fraction,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub long_press_ms: i64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { long_press_ms: 500 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: i64,
    /// Tick interval while a twist is running.
    pub frame_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: wedge::transition::DEFAULT_DURATION_MS,
            frame_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub wedge: HexColor,
    pub tile: HexColor,
    pub border: HexColor,
    pub border_width: f64,
    pub label: HexColor,
    pub ink: HexColor,
    pub ink_width: f64,
    pub center_circle: HexColor,
    pub gauge: HexColor,
    pub gauge_fill: HexColor,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::from(&Theme::default())
    }
}

impl From<&Theme> for ThemeConfig {
    fn from(theme: &Theme) -> Self {
        Self {
            wedge: HexColor(theme.wedge),
            tile: HexColor(theme.tile),
            border: HexColor(theme.border),
            border_width: theme.border_width,
            label: HexColor(theme.label),
            ink: HexColor(theme.ink),
            ink_width: theme.ink_width,
            center_circle: HexColor(theme.center_circle),
            gauge: HexColor(theme.gauge),
            gauge_fill: HexColor(theme.gauge_fill),
        }
    }
}

impl ThemeConfig {
    pub fn theme(&self) -> Theme {
        Theme {
            wedge: self.wedge.0,
            tile: self.tile.0,
            border: self.border.0,
            border_width: self.border_width,
            label: self.label.0,
            ink: self.ink.0,
            ink_width: self.ink_width,
            center_circle: self.center_circle.0,
            gauge: self.gauge.0,
            gauge_fill: self.gauge_fill.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub socket: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/tmp/spicchio.sock"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RecognizerConfig {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub path: Option<PathBuf>,
    pub poll_secs: u64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("/sys/class/power_supply/BAT0/capacity")),
            poll_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub settings: Option<PathBuf>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlotConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub ring: Ring,
    #[serde_as(as = "DisplayFromStr")]
    pub position: Position,
    pub app: AppId,
}

impl SlotConfig {
    pub fn wedge(&self) -> usize {
        wedge_index(self.ring, self.position)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub viewport: ViewportConfig,
    pub dial: DialConfig,
    pub collage: CollageConfig,
    pub ink: InkConfig,
    pub input: InputConfig,
    pub transition: TransitionConfig,
    pub theme: ThemeConfig,
    pub server: ServerConfig,
    pub recognizer: RecognizerConfig,
    pub battery: BatteryConfig,
    pub storage: StorageConfig,
    pub apps: Vec<AppEntry>,
    pub links: Vec<LinkEntry>,
    pub categories: Vec<CategoryEntry>,
    pub slots: Vec<SlotConfig>,
}

impl Config {
    pub fn viewport(&self) -> Size {
        Size::new(self.viewport.width, self.viewport.height)
    }

    /// Clamps out-of-range values, warning about each one.
    pub fn validated(mut self) -> Self {
        let delay = self
            .ink
            .clear_delay_ms
            .clamp(MIN_CLEAR_DELAY_MS, MAX_CLEAR_DELAY_MS);
        if delay != self.ink.clear_delay_ms {
            log::warn!(
                "ink.clear_delay_ms {} out of range, using {}",
                self.ink.clear_delay_ms,
                delay
            );
            self.ink.clear_delay_ms = delay;
        }

        for (name, value) in [
            ("dial.outer_fraction", &mut self.dial.outer_fraction),
            ("dial.inner_fraction", &mut self.dial.inner_fraction),
            ("ink.top_band_fraction", &mut self.ink.top_band_fraction),
        ] {
            let clamped = if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            };
            if clamped != *value {
                log::warn!("{} {} out of range, using {}", name, value, clamped);
                *value = clamped;
            }
        }

        if !self.viewport().is_usable_viewport() || self.viewport().is_empty() {
            let fallback = ViewportConfig::default();
            log::warn!(
                "viewport {}x{} out of range, using {}x{}",
                self.viewport.width,
                self.viewport.height,
                fallback.width,
                fallback.height
            );
            self.viewport = fallback;
        }

        if self.collage.landscape_rows == 0 {
            log::warn!("collage.landscape_rows must be positive, using 1");
            self.collage.landscape_rows = 1;
        }
        if self.transition.duration_ms <= 0 {
            log::warn!("transition.duration_ms must be positive, using 1");
            self.transition.duration_ms = 1;
        }
        if self.transition.frame_ms == 0 {
            self.transition.frame_ms = 1;
        }

        self.slots.retain(|slot| {
            let keep = slot.wedge() != SPECIAL_WEDGE;
            if !keep {
                log::warn!(
                    "Slot {} {} is reserved for categories; '{}' ignored",
                    slot.ring,
                    slot.position,
                    slot.app
                );
            }
            keep
        });
        self
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.apps.clone(),
            self.links.clone(),
            self.categories.clone(),
            self.slots.iter().map(|s| (s.wedge(), s.app.clone())),
        )
    }

    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.settings {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("settings.json")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "spicchio", "spicchio").ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Built-in defaults, then `path` if it exists, then `SPICCHIO_*` variables
/// (`SPICCHIO_INK__CLEAR_DELAY_MS=900`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ))
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix("SPICCHIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize::<Config>()?.validated())
}

/// Falls back to defaults when the file is unreadable, so a typo never
/// leaves the launcher without a screen.
pub fn load_or_default(path: &Path) -> Config {
    match load_config_from(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config from {}: {}", path.display(), e);
            Config::default()
        }
    }
}

pub fn write_default_config(path: &Path) -> std::io::Result<bool> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if path.exists() {
        return Ok(false);
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

/// Pause after a change before reloading; editors save in several steps.
const RELOAD_SETTLE: Duration = Duration::from_millis(150);

/// Whether a watch event should make the daemon reload its config file.
fn triggers_reload(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends `AppEvent::ConfigReload` once per burst of changes to `config_path`.
/// The parent directory is watched so that editors replacing the file are seen.
pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        log::error!("Config path {} has no directory to watch", config_path.display());
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch {}: {}", config_dir.display(), e);
        return;
    }
    log::info!("Watching {} for changes", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if triggers_reload(&event, &config_path) => {
                tokio::time::sleep(RELOAD_SETTLE).await;
                let coalesced = std::iter::from_fn(|| bridge_rx.try_recv().ok()).count();
                log::debug!(
                    "{} changed ({:?}, {} more events)",
                    config_path.display(),
                    event.kind,
                    coalesced
                );
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error on {}: {}", config_dir.display(), e),
        }
    }
}
