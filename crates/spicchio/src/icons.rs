use crate::catalog::AppEntry;
use std::path::{Path, PathBuf};
use wedge::cache::ReadThroughCache;
use wedge::draw::{Content, IconKey};

/// What the disk said about an icon file, looked up once per path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IconInfo {
    Missing,
    /// Exists, but the size could not be read.
    Unsized,
    Sized(f64, f64),
}

pub type IconCache = ReadThroughCache<PathBuf, IconInfo>;

pub fn probe(path: &Path) -> IconInfo {
    if !path.exists() {
        return IconInfo::Missing;
    }
    match image::image_dimensions(path) {
        Ok((w, h)) => IconInfo::Sized(w as f64, h as f64),
        Err(e) => {
            log::debug!("Could not size icon {}: {}", path.display(), e);
            IconInfo::Unsized
        }
    }
}

/// The app's icon if its file is there, its label otherwise.
pub fn app_content(app: &AppEntry, cache: &IconCache) -> Content {
    let Some(path) = &app.icon else {
        return Content::Label(app.label.clone());
    };
    let info = cache
        .get_or_load(path, |p| Some(probe(p)))
        .unwrap_or(IconInfo::Missing);
    let intrinsic = match info {
        IconInfo::Missing => return Content::Label(app.label.clone()),
        IconInfo::Unsized => None,
        IconInfo::Sized(w, h) => Some((w, h)),
    };
    Content::Icon {
        key: IconKey::new(path.to_string_lossy()),
        intrinsic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppId, ExecCommand};

    fn app(icon: Option<PathBuf>) -> AppEntry {
        AppEntry {
            id: AppId::from("viewer"),
            label: "Viewer".to_string(),
            exec: ExecCommand::from("viewer"),
            icon,
            category: None,
        }
    }

    #[test]
    fn test_missing_icon_falls_back_to_label() {
        let cache = IconCache::new();
        assert_eq!(
            app_content(&app(None), &cache),
            Content::Label("Viewer".to_string())
        );
        let gone = app(Some(PathBuf::from("/nonexistent/viewer.png")));
        assert_eq!(
            app_content(&gone, &cache),
            Content::Label("Viewer".to_string())
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unreadable_icon_keeps_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.png");
        fs_err::write(&path, b"not a png").unwrap();

        let cache = IconCache::new();
        let content = app_content(&app(Some(path.clone())), &cache);
        assert_eq!(
            content,
            Content::Icon {
                key: IconKey::new(path.to_string_lossy()),
                intrinsic: None,
            }
        );
        assert_eq!(cache.get(&path), Some(IconInfo::Unsized));
    }
}
