//! Editor tuning knobs, persisted as TOML so testers can adjust timings
//! without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// When false the render backend is skipped and maps are marked ready
    /// immediately after loading.
    pub use_backend_rendering: bool,
    /// Hard cap on one backend render attempt.
    pub preload_timeout_ms: u64,
    /// Fallback that force-dismisses the loading overlay if the first view
    /// render never reports back.
    pub initial_render_timeout_ms: u64,
    /// How long "Map ready!" stays visible before the overlay closes.
    pub ready_dismiss_ms: u64,
    /// Pause between the render outcome and the ready signal.
    pub map_ready_delay_ms: u64,
    /// Minimum overlay time so short loads do not flash.
    pub overlay_min_ms: u64,
    /// Lifetime of the "map saved" notice.
    pub saved_notice_ms: u64,
    /// Command poll interval of the session worker.
    pub poll_interval_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            use_backend_rendering: true,
            preload_timeout_ms: 30_000,
            initial_render_timeout_ms: 10_000,
            ready_dismiss_ms: 1_000,
            map_ready_delay_ms: 500,
            overlay_min_ms: 100,
            saved_notice_ms: 5_000,
            poll_interval_ms: 10,
        }
    }
}

impl EditorSettings {
    pub fn load(path: &Path) -> Self {
        match load_toml(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("SETTINGS: falling back to defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        std::fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn preload_timeout(&self) -> Duration {
        Duration::from_millis(self.preload_timeout_ms)
    }

    pub fn initial_render_timeout(&self) -> Duration {
        Duration::from_millis(self.initial_render_timeout_ms)
    }

    pub fn ready_dismiss(&self) -> Duration {
        Duration::from_millis(self.ready_dismiss_ms)
    }

    pub fn map_ready_delay(&self) -> Duration {
        Duration::from_millis(self.map_ready_delay_ms)
    }

    pub fn overlay_min(&self) -> Duration {
        Duration::from_millis(self.overlay_min_ms)
    }

    pub fn saved_notice(&self) -> Duration {
        Duration::from_millis(self.saved_notice_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}
