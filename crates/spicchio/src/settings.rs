use fs_err as fs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keys the launcher reads and writes.
pub mod keys {
    use wedge::dial::WEDGE_COUNT;

    pub const COLLAGE_MODE: &str = "is_collage_mode";
    pub const LINKS: &str = "links_list";

    /// Binding of home slot `slot` (0-based).
    pub fn slot(slot: usize) -> String {
        format!("icon_{}_pkg", slot + 1)
    }

    pub fn slots() -> impl Iterator<Item = String> {
        (0..WEDGE_COUNT).map(slot)
    }

    pub fn category_name(id: i32) -> String {
        format!("cat_{}", id)
    }

    pub fn app_category(app: &str) -> String {
        format!("app_cat_{}", app)
    }

    pub fn link_category(url: &str) -> String {
        format!("link_cat_{}", url)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Last-write-wins string store.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Loads `path` if it exists; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        log::debug!("Loaded {} settings from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
