//! Loading overlay state: two progress counters and the three flags the UI
//! needs to decide what to draw.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One progress counter with its banner text. `current`/`total` are tile
/// counts during preload and a 0-100 percentage during rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Progress {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub message: String,
}

impl Progress {
    pub fn new(current: u32, total: u32, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
        }
    }
}

/// Snapshot of the map loading pipeline, shared between the session worker
/// and the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingTracker {
    /// True from the moment a map starts loading until the overlay is
    /// dismissed.
    pub is_loading: bool,
    /// Set once per load when the map becomes usable. Never cleared until
    /// the next load starts.
    pub is_map_ready: bool,
    /// True while the backend reports render progress.
    pub is_rendering: bool,
    /// Tile preload progress.
    pub loading: Progress,
    /// Full-map render progress.
    pub render: Progress,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self {
            is_loading: true,
            is_map_ready: false,
            is_rendering: false,
            loading: Progress::new(0, 0, "Loading map..."),
            render: Progress::default(),
        }
    }

    /// Puts the tracker back into its initial "Loading map..." state. Called
    /// when a map load starts.
    pub fn reset_loading_state(&mut self) {
        *self = Self::new();
    }

    pub fn update_loading_progress(&mut self, progress: Progress) {
        self.loading = progress;
    }

    /// Render progress implies an active render, so the flag is forced on
    /// even if no render was announced beforehand.
    pub fn update_render_progress(&mut self, progress: Progress) {
        self.render = progress;
        self.is_rendering = true;
    }

    pub fn set_render_complete(&mut self) {
        self.render = Progress::new(100, 100, "Map rendering completed");
        self.is_rendering = false;
    }

    pub fn set_render_error(&mut self) {
        self.render = Progress::new(0, 0, "Map rendering failed");
        self.is_rendering = false;
    }

    /// Marks the map usable. Returns true only on the first call of the
    /// current load; repeat calls change nothing.
    pub fn set_map_ready(&mut self) -> bool {
        if self.is_map_ready {
            return false;
        }
        self.is_map_ready = true;
        true
    }

    /// Dismisses the loading overlay. The ready flag stays up.
    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedTracker = Arc<Mutex<LoadingTracker>>;

pub fn shared_tracker() -> SharedTracker {
    Arc::new(Mutex::new(LoadingTracker::new()))
}
