//! Boundary to the process that actually renders maps.
//!
//! The editor never talks to a renderer directly. It asks a backend to
//! render and gets back a [`RenderSubscription`] scoped to that one
//! attempt; notices from older attempts cannot leak in because each
//! attempt owns its channel.

use std::future::Future;

use tokio::sync::mpsc;

use crate::models::map::RenderRequest;

/// Everything a render backend can report for one attempt. Progress
/// payloads stay JSON-encoded [`Progress`](crate::editor::loading::Progress)
/// strings, exactly as they cross the process boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNotice {
    /// Tile preload progress, counted in tiles.
    PreloadProgress(String),
    /// All tiles preloaded; the backend continues with the full render.
    PreloadFinished { total: u32 },
    /// Full-map render progress, a 0-100 percentage.
    RenderProgress(String),
    /// Terminal: render finished. `image_data` is the encoded map image,
    /// possibly empty for backends that deliver pixels elsewhere.
    Finished { image_data: String, message: String },
    /// Terminal: render failed.
    Failed { error: String, message: String },
}

/// Live handle on one render attempt. Dropping the receiver detaches from
/// the attempt; the backend side just loses its audience.
pub struct RenderSubscription {
    /// Backend-assigned attempt number, for log correlation.
    pub attempt: u64,
    pub notices: mpsc::Receiver<RenderNotice>,
}

pub trait RenderBackend: Send + Sync {
    /// Asks the backend to preload `tile_ids` and render the map described
    /// by `request`. An `Err` means the attempt was never started.
    fn request_render(
        &self,
        tile_ids: Vec<String>,
        request: RenderRequest,
    ) -> impl Future<Output = Result<RenderSubscription, String>> + Send;

    /// Loads a single tile into the backend cache. Used by the local
    /// fallback when `request_render` is rejected.
    fn load_tile(&self, tile_id: &str) -> impl Future<Output = Result<(), String>> + Send;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// Scripted backend for driving the preload pipeline in tests.
    pub(crate) struct FakeBackend {
        pub accept: bool,
        pub reject_message: String,
        /// Keep the notice sender alive so the channel never closes and
        /// the attempt looks stuck.
        pub stall: bool,
        pub script: Mutex<Vec<RenderNotice>>,
        pub failing_tiles: Vec<String>,
        pub attempts: AtomicU64,
        pub requests: Mutex<Vec<RenderRequest>>,
        pub requested_ids: Mutex<Vec<Vec<String>>>,
        pub loaded_tiles: Mutex<Vec<String>>,
        held: Mutex<Vec<mpsc::Sender<RenderNotice>>>,
    }

    impl FakeBackend {
        pub fn accepting(script: Vec<RenderNotice>) -> Self {
            Self {
                script: Mutex::new(script),
                ..Self::idle()
            }
        }

        pub fn rejecting(message: &str) -> Self {
            Self {
                accept: false,
                reject_message: message.to_string(),
                ..Self::idle()
            }
        }

        pub fn stalled() -> Self {
            Self {
                stall: true,
                ..Self::idle()
            }
        }

        pub fn idle() -> Self {
            Self {
                accept: true,
                reject_message: String::new(),
                stall: false,
                script: Mutex::new(Vec::new()),
                failing_tiles: Vec::new(),
                attempts: AtomicU64::new(0),
                requests: Mutex::new(Vec::new()),
                requested_ids: Mutex::new(Vec::new()),
                loaded_tiles: Mutex::new(Vec::new()),
                held: Mutex::new(Vec::new()),
            }
        }
    }

    impl RenderBackend for FakeBackend {
        async fn request_render(
            &self,
            tile_ids: Vec<String>,
            request: RenderRequest,
        ) -> Result<RenderSubscription, String> {
            self.requested_ids.lock().unwrap().push(tile_ids);
            self.requests.lock().unwrap().push(request);
            if !self.accept {
                return Err(self.reject_message.clone());
            }

            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let script: Vec<RenderNotice> = self.script.lock().unwrap().drain(..).collect();
            let (tx, rx) = mpsc::channel(script.len().max(1));
            for notice in script {
                let _ = tx.try_send(notice);
            }
            if self.stall {
                self.held.lock().unwrap().push(tx);
            }
            Ok(RenderSubscription {
                attempt,
                notices: rx,
            })
        }

        async fn load_tile(&self, tile_id: &str) -> Result<(), String> {
            self.loaded_tiles.lock().unwrap().push(tile_id.to_string());
            if self.failing_tiles.iter().any(|t| t == tile_id) {
                Err(format!("failed to load tile {tile_id}"))
            } else {
                Ok(())
            }
        }
    }
}
