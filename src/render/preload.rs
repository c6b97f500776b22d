//! Tile preload and render orchestration for one map load.
//!
//! One call drives one backend attempt from request to terminal outcome.
//! The attempt's notice channel is raced against a single deadline inside
//! `select!`, so exactly one of "terminal notice" or "timeout" wins and
//! the attempt can never finish twice.

use crossbeam_channel::Sender;
use tokio::time::sleep;

use crate::editor::loading::{Progress, SharedTracker};
use crate::models::map::{MapLayer, RenderRequest, distinct_tile_ids, layers_have_tiles};
use crate::models::settings::EditorSettings;
use crate::render::backend::{RenderBackend, RenderNotice};
use crate::shared::messages::EditorEvent;

/// How one preload run ended. Only used for logging and tests; the UI
/// observes the tracker instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Backend rendering is disabled; the map was marked ready untouched.
    Skipped,
    /// The backend delivered a finished render.
    Rendered,
    /// The backend reported a render failure.
    RenderFailed,
    /// No terminal notice arrived before the deadline.
    TimedOut,
    /// The render request was rejected and tiles were loaded one by one.
    LocalFallback,
}

/// Builds the render payload for the current layer stack. The checkerboard
/// only shows through on maps without a single tile.
pub fn build_render_request(
    width: i32,
    height: i32,
    tile_size: i32,
    layers: Vec<MapLayer>,
) -> RenderRequest {
    let show_checkerboard = !layers_have_tiles(&layers);
    RenderRequest {
        width,
        height,
        tile_size,
        layers,
        show_grid: false,
        show_checkerboard,
    }
}

/// Preloads the tiles of `request` and waits for the render outcome,
/// updating `tracker` along the way. Marks the map ready on every path
/// except the local fallback, which has no render to wait for and leaves
/// readiness to the caller's later signals.
pub async fn preload_tile_images<B: RenderBackend>(
    backend: &B,
    request: RenderRequest,
    tracker: &SharedTracker,
    events: &Sender<EditorEvent>,
    settings: &EditorSettings,
) -> PreloadOutcome {
    let tile_ids = distinct_tile_ids(&request.layers);
    let total = tile_ids.len() as u32;

    if !settings.use_backend_rendering {
        log::info!("PRELOAD: backend rendering disabled, skipping preload");
        mark_ready(tracker, events);
        return PreloadOutcome::Skipped;
    }

    log::info!(
        "PRELOAD: starting, {} unique tiles, checkerboard={}",
        total,
        request.show_checkerboard
    );
    tracker
        .lock()
        .unwrap()
        .update_loading_progress(Progress::new(0, total, "Starting tile preloading..."));

    let mut subscription = match backend.request_render(tile_ids.clone(), request).await {
        Ok(subscription) => subscription,
        Err(message) => {
            log::error!("PRELOAD: render request rejected: {}", message);
            preload_tiles_local(backend, &tile_ids, tracker).await;
            return PreloadOutcome::LocalFallback;
        }
    };
    log::info!("PRELOAD: render attempt {} accepted", subscription.attempt);

    let deadline = sleep(settings.preload_timeout());
    tokio::pin!(deadline);
    let mut channel_closed = false;

    loop {
        tokio::select! {
            _ = &mut deadline => {
                log::warn!(
                    "PRELOAD: attempt {} timed out, forcing completion",
                    subscription.attempt
                );
                tracker.lock().unwrap().update_loading_progress(Progress::new(
                    total,
                    total,
                    "Tile preloading completed (timeout)",
                ));
                mark_ready(tracker, events);
                return PreloadOutcome::TimedOut;
            }
            notice = subscription.notices.recv(), if !channel_closed => match notice {
                Some(RenderNotice::PreloadProgress(payload)) => {
                    if let Some(progress) = parse_progress(&payload) {
                        tracker.lock().unwrap().update_loading_progress(progress);
                    }
                }
                Some(RenderNotice::PreloadFinished { total: preloaded }) => {
                    tracker.lock().unwrap().update_loading_progress(Progress::new(
                        preloaded,
                        preloaded,
                        "Tile preloading completed, starting map rendering...",
                    ));
                }
                Some(RenderNotice::RenderProgress(payload)) => {
                    if let Some(progress) = parse_progress(&payload) {
                        tracker.lock().unwrap().update_render_progress(progress);
                    }
                }
                Some(RenderNotice::Finished { image_data, message }) => {
                    log::info!(
                        "PRELOAD: attempt {} finished: {}",
                        subscription.attempt,
                        message
                    );
                    {
                        let mut state = tracker.lock().unwrap();
                        state.update_loading_progress(Progress::new(
                            total,
                            total,
                            "Map rendering completed",
                        ));
                        state.set_render_complete();
                    }
                    if !image_data.is_empty() {
                        let _ = events.send(EditorEvent::MapRendered { image_data });
                    }
                    mark_ready(tracker, events);
                    return PreloadOutcome::Rendered;
                }
                Some(RenderNotice::Failed { error, message }) => {
                    log::error!(
                        "PRELOAD: attempt {} failed: {} ({})",
                        subscription.attempt,
                        error,
                        message
                    );
                    {
                        let mut state = tracker.lock().unwrap();
                        state.update_loading_progress(Progress::new(0, 0, "Map rendering failed"));
                        state.set_render_error();
                    }
                    mark_ready(tracker, events);
                    return PreloadOutcome::RenderFailed;
                }
                None => {
                    // Backend went away without a terminal notice. Leave the
                    // deadline to settle the attempt.
                    log::warn!(
                        "PRELOAD: attempt {} notice channel closed early",
                        subscription.attempt
                    );
                    channel_closed = true;
                }
            }
        }
    }
}

/// Marks the map ready exactly once per load and tells the UI.
pub(crate) fn mark_ready(tracker: &SharedTracker, events: &Sender<EditorEvent>) {
    let newly_ready = tracker.lock().unwrap().set_map_ready();
    if newly_ready {
        log::info!("PRELOAD: map ready");
        let _ = events.send(EditorEvent::MapReady);
    }
}

/// Loads tiles one by one through the backend cache. Individual failures
/// are logged and skipped. The map is not marked ready here; a render
/// completion signal still has to arrive separately.
async fn preload_tiles_local<B: RenderBackend>(
    backend: &B,
    tile_ids: &[String],
    tracker: &SharedTracker,
) {
    let total = tile_ids.len() as u32;
    log::info!("PRELOAD: falling back to local tile loading, {} tiles", total);

    let mut loaded = 0u32;
    for tile_id in tile_ids {
        if let Err(message) = backend.load_tile(tile_id).await {
            log::warn!("PRELOAD: error preloading tile {}: {}", tile_id, message);
        }
        loaded += 1;
        tracker.lock().unwrap().update_loading_progress(Progress::new(
            loaded,
            total,
            format!("Preloading tiles... ({loaded}/{total})"),
        ));
    }

    tracker.lock().unwrap().update_loading_progress(Progress::new(
        total,
        total,
        "Tile preloading completed, rendering map...",
    ));
}

fn parse_progress(payload: &str) -> Option<Progress> {
    match serde_json::from_str(payload) {
        Ok(progress) => Some(progress),
        Err(e) => {
            log::warn!("PRELOAD: unreadable progress payload: {}", e);
            None
        }
    }
}
