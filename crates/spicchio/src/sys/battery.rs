use crate::events::AppEvent;
use async_channel::Sender;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatteryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Unexpected capacity '{0}'")]
    Parse(String),
}

/// Charge percentage from a sysfs `capacity` file.
pub fn read_capacity(path: &Path) -> Result<u32, BatteryError> {
    let raw = fs_err::read_to_string(path)?;
    let value = raw.trim();
    value
        .parse()
        .map_err(|_| BatteryError::Parse(value.to_string()))
}

/// Reports the level now and then every `every`, until the receiver is gone.
pub async fn run_battery_poller(path: PathBuf, every: Duration, tx: Sender<AppEvent>) {
    let mut interval = tokio::time::interval(every);
    let mut last = None;
    loop {
        interval.tick().await;
        match read_capacity(&path) {
            Ok(level) if last == Some(level) => {}
            Ok(level) => {
                last = Some(level);
                if tx.send(AppEvent::Battery(level)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                log::warn!("Battery poller stopped: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capacity");

        fs_err::write(&path, "87\n").unwrap();
        assert_eq!(read_capacity(&path).unwrap(), 87);

        fs_err::write(&path, "Full").unwrap();
        assert!(matches!(read_capacity(&path), Err(BatteryError::Parse(v)) if v == "Full"));

        assert!(matches!(
            read_capacity(&dir.path().join("missing")),
            Err(BatteryError::Io(_))
        ));
    }
}
