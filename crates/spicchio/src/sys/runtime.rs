use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::launcher::Effect;
use crate::sys::{battery, launch, recognizer, server};
use async_channel::Sender;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use wedge::recognizer::{Recognizer, recognize_or_empty};

/// Milliseconds since startup; the one time base for the launcher.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }
}

/// Background tasks plus the executor for effects the launcher asks for.
pub struct Services {
    rt: Runtime,
    tx: Sender<AppEvent>,
    recognizer: Arc<dyn Recognizer>,
    frame: Duration,
}

impl Services {
    /// Starts the socket server, the config watcher, and the battery poller.
    pub fn start(
        config: &Config,
        config_path: PathBuf,
        tx: Sender<AppEvent>,
        clock: Clock,
    ) -> std::io::Result<Self> {
        let rt = Runtime::new()?;

        rt.spawn(server::run_server(
            config.server.socket.clone(),
            tx.clone(),
            clock,
        ));
        rt.spawn(config::run_async_watcher(config_path, tx.clone()));
        if let Some(path) = config.battery.path.clone() {
            let every = Duration::from_secs(config.battery.poll_secs.max(1));
            rt.spawn(battery::run_battery_poller(path, every, tx.clone()));
        }

        Ok(Self {
            rt,
            tx,
            recognizer: recognizer::from_config(&config.recognizer),
            frame: Duration::from_millis(config.transition.frame_ms),
        })
    }

    /// Picks up a reloaded config. The server and poller keep their settings
    /// until restart.
    pub fn reconfigure(&mut self, config: &Config) {
        self.recognizer = recognizer::from_config(&config.recognizer);
        self.frame = Duration::from_millis(config.transition.frame_ms);
    }

    pub fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::Launch(app) => {
                if let Err(e) = launch::spawn_exec(&app.exec) {
                    log::error!("Failed to launch '{}': {}", app.label, e);
                }
            }
            Effect::OpenLink(url) => {
                if let Err(e) = launch::open_link(&url) {
                    log::error!("Failed to open '{}': {}", url, e);
                }
            }
            Effect::Recognize(sample) => {
                let recognizer = Arc::clone(&self.recognizer);
                let tx = self.tx.clone();
                self.rt.spawn(async move {
                    let recognition = tokio::task::spawn_blocking(move || {
                        recognize_or_empty(recognizer.as_ref(), &sample)
                    })
                    .await;
                    match recognition {
                        Ok(r) => {
                            let _ = tx.send(AppEvent::Recognized(r)).await;
                        }
                        Err(e) => log::error!("Recognizer task failed: {}", e),
                    }
                });
            }
            Effect::ScheduleClear { ticket, after_ms } => {
                let tx = self.tx.clone();
                let delay = Duration::from_millis(after_ms.max(0) as u64);
                self.rt.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(AppEvent::ClearInk(ticket)).await;
                });
            }
            Effect::Animate { duration_ms } => {
                let tx = self.tx.clone();
                let frame = self.frame;
                // one frame past the end so the last tick lands the twist
                let total = Duration::from_millis(duration_ms.max(0) as u64) + frame;
                self.rt.spawn(async move {
                    let start = Instant::now();
                    let mut interval = tokio::time::interval(frame);
                    loop {
                        interval.tick().await;
                        if tx.send(AppEvent::Tick).await.is_err() || start.elapsed() >= total {
                            break;
                        }
                    }
                });
            }
            Effect::ShowCategories(categories) => {
                let listing: Vec<String> = categories
                    .iter()
                    .map(|(id, name)| format!("{}={}", id, name))
                    .collect();
                log::info!("Categories: {}", listing.join(", "));
            }
            Effect::PickSlot(slot) => {
                log::info!(
                    "Slot {} is open; bind it with `spicchio send bind {} <app>`",
                    slot + 1,
                    slot + 1
                );
            }
            Effect::Dismiss => log::info!("Dismissed"),
            // clients pull frames
            Effect::Redraw => {}
        }
    }
}
