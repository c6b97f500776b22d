//! One open map and the operations the UI drives it with.
//!
//! The session owns the layer history and the map header, talks to the
//! store and the render backend, and reports progress through the shared
//! tracker, the shared save state, and the event channel. All methods run
//! on the session worker thread.

use std::time::Duration;

use crossbeam_channel::Sender;
use tokio::time::sleep;

use crate::editor::edits;
use crate::editor::history::LayerHistory;
use crate::editor::loading::{Progress, SharedTracker};
use crate::models::document::{
    DocumentProperties, Encounter, FishingEncounter, MapDocument, MapEncounters, MapSummary,
    SummaryEncounter, document_path,
};
use crate::models::map::{MapLayer, StampSelection, layers_have_tiles};
use crate::models::settings::EditorSettings;
use crate::render::backend::RenderBackend;
use crate::render::preload::{build_render_request, mark_ready, preload_tile_images};
use crate::shared::messages::{EditorEvent, LayerView, MapSettingsUpdate};
use crate::storage::loader::{load_map_layers, resolve_active_layer};
use crate::storage::saver::{SharedSaveState, persist_map};
use crate::storage::store::MapStore;

/// Header fields of the open map, editable from the settings panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMeta {
    pub id: i64,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
    pub map_type: String,
    pub tileset_path: String,
    pub bg_music: String,
    pub description: String,
}

impl MapMeta {
    /// Placeholder header for a map without a usable index entry.
    pub fn untitled(id: i64) -> Self {
        Self {
            id,
            name: "Untitled Map".into(),
            width: 20,
            height: 20,
            tile_size: 16,
            map_type: "Overworld".into(),
            tileset_path: String::new(),
            bg_music: String::new(),
            description: String::new(),
        }
    }

    /// Header from an index entry, with the editor fallbacks for blank
    /// fields.
    pub fn from_summary(summary: &MapSummary) -> Self {
        let properties = summary.properties.first();
        Self {
            id: summary.id,
            name: non_empty(&summary.name, "Untitled Map"),
            width: if summary.width > 0 { summary.width } else { 20 },
            height: if summary.height > 0 { summary.height } else { 20 },
            tile_size: 16,
            map_type: properties
                .map(|p| non_empty(&p.type_of_map, "Overworld"))
                .unwrap_or_else(|| "Overworld".into()),
            tileset_path: properties
                .map(|p| p.tileset_image_path.clone())
                .unwrap_or_default(),
            bg_music: properties.map(|p| p.bg_music.clone()).unwrap_or_default(),
            description: properties
                .map(|p| p.description.clone())
                .unwrap_or_default(),
        }
    }

    /// Applies a partial settings update; `None` fields keep their value.
    pub fn apply(&mut self, update: MapSettingsUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(width) = update.width {
            self.width = width;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(tile_size) = update.tile_size {
            self.tile_size = tile_size;
        }
        if let Some(map_type) = update.map_type {
            self.map_type = map_type;
        }
        if let Some(music) = update.music {
            self.bg_music = music;
        }
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// One open map: its layer history, header, and load/save flow.
pub struct MapSession<B, S> {
    backend: B,
    store: S,
    settings: EditorSettings,
    tracker: SharedTracker,
    save_state: SharedSaveState,
    events: Sender<EditorEvent>,
    history: LayerHistory,
    active_layer_id: i32,
    meta: MapMeta,
    /// Index entry as of the last successful load or save. `None` until a
    /// map is opened.
    summary: Option<MapSummary>,
}

impl<B: RenderBackend, S: MapStore> MapSession<B, S> {
    pub fn new(
        backend: B,
        store: S,
        settings: EditorSettings,
        tracker: SharedTracker,
        save_state: SharedSaveState,
        events: Sender<EditorEvent>,
    ) -> Self {
        Self {
            backend,
            store,
            settings,
            tracker,
            save_state,
            events,
            history: LayerHistory::new(),
            active_layer_id: 1,
            meta: MapMeta::untitled(0),
            summary: None,
        }
    }

    /// Opens the map with `id` and drives the whole loading sequence: index
    /// lookup, document read, history seeding, tile preload, ready signal.
    ///
    /// Every failure collapses to an editable map. A missing index entry or
    /// an unreadable document seeds a single empty base layer instead of
    /// aborting the load.
    pub async fn open_map(&mut self, id: i64) {
        log::info!("SESSION: loading map {}", id);
        self.history.reset();
        self.active_layer_id = 1;
        self.summary = None;
        self.tracker.lock().unwrap().reset_loading_state();

        let summary = match self.store.map_summary(id).await {
            Ok(summary) => {
                self.tracker.lock().unwrap().update_loading_progress(Progress::new(
                    0,
                    0,
                    format!("Loading {}...", summary.name),
                ));
                Some(summary)
            }
            Err(e) => {
                log::error!("SESSION: error loading map {}: {}", id, e);
                self.tracker.lock().unwrap().update_loading_progress(Progress::new(
                    0,
                    0,
                    format!("Error loading map: {}", e),
                ));
                None
            }
        };

        // Keep the overlay visible even when the load is instant.
        sleep(self.settings.overlay_min()).await;

        match &summary {
            Some(summary) => {
                self.meta = MapMeta::from_summary(summary);
                match load_map_layers(&self.store, summary).await {
                    Some(loaded) => {
                        self.active_layer_id =
                            resolve_active_layer(&loaded.layers, &loaded.active_layer_name);
                        let has_tiles = layers_have_tiles(&loaded.layers);
                        self.history.seed(loaded.layers);
                        // A map with tiles becomes the first undo entry; an
                        // empty one stays out of history.
                        if has_tiles {
                            self.history.record_current();
                        }
                    }
                    None => self.history.seed(vec![MapLayer::base()]),
                }
            }
            None => {
                self.meta = MapMeta::untitled(id);
                self.history.seed(vec![MapLayer::base()]);
            }
        }
        self.summary = summary;

        let request = build_render_request(
            self.meta.width,
            self.meta.height,
            self.meta.tile_size,
            self.history.layers().to_vec(),
        );
        preload_tile_images(
            &self.backend,
            request,
            &self.tracker,
            &self.events,
            &self.settings,
        )
        .await;

        // The ready signal trails the preload outcome so the overlay does
        // not flash. This also marks the local-fallback path ready, which
        // has no render completion of its own.
        sleep(self.settings.map_ready_delay()).await;
        mark_ready(&self.tracker, &self.events);
        self.spawn_initial_render_fallback();

        let _ = self.events.send(EditorEvent::MapOpened { id });
    }

    /// The view drew its first frame; show "Map ready!" briefly, then drop
    /// the overlay.
    pub fn initial_render_ready(&self) {
        let tracker = self.tracker.clone();
        let hold = self.settings.ready_dismiss();
        tokio::spawn(async move {
            dismiss_overlay(tracker, hold).await;
        });
    }

    /// Forces the overlay down when the first view render never reports
    /// back. Does nothing when the overlay was already dismissed or the
    /// load it belonged to is gone.
    fn spawn_initial_render_fallback(&self) {
        let tracker = self.tracker.clone();
        let timeout = self.settings.initial_render_timeout();
        let hold = self.settings.ready_dismiss();
        tokio::spawn(async move {
            sleep(timeout).await;
            let stalled = {
                let state = tracker.lock().unwrap();
                state.is_map_ready && state.is_loading
            };
            if stalled {
                log::warn!("SESSION: initial render timeout reached, forcing completion");
                dismiss_overlay(tracker, hold).await;
            }
        });
    }

    /// Writes the open map back to the store: a rename first when the map
    /// name changed, then the JSON document, then the index entry. The
    /// saved notice is shown only when both writes land.
    pub async fn save(&mut self) {
        if self.save_state.lock().unwrap().is_saving {
            log::warn!("SESSION: save already in progress, skipping");
            return;
        }
        self.save_state.lock().unwrap().begin_save();

        let old_path = self
            .summary
            .as_ref()
            .map(|s| s.file_path().to_string())
            .unwrap_or_default();
        // Without an index entry the path can only come from the name.
        let renamed = self
            .summary
            .as_ref()
            .map(|s| s.name != self.meta.name)
            .unwrap_or(true);
        let new_path = if renamed {
            document_path(&self.meta.name)
        } else {
            old_path.clone()
        };
        if new_path.is_empty() {
            log::error!("SESSION: cannot save, map file path is missing");
            self.save_state.lock().unwrap().end_save();
            let _ = self.events.send(EditorEvent::SaveFinished { success: false });
            return;
        }

        let document = self.build_document();
        let updated_summary = self.build_summary(&new_path);

        let success = persist_map(
            &self.store,
            &old_path,
            &new_path,
            renamed,
            &document,
            &updated_summary,
        )
        .await;

        if success {
            log::info!("SESSION: map saved to {}", new_path);
            self.summary = Some(updated_summary);
            let epoch = self.save_state.lock().unwrap().record_saved();
            self.spawn_notice_expiry(epoch);
        }
        self.save_state.lock().unwrap().end_save();
        let _ = self.events.send(EditorEvent::SaveFinished { success });
    }

    fn spawn_notice_expiry(&self, epoch: u64) {
        let save_state = self.save_state.clone();
        let lifetime = self.settings.saved_notice();
        tokio::spawn(async move {
            sleep(lifetime).await;
            save_state.lock().unwrap().expire_notice(epoch);
        });
    }

    /// Replaces the layer stack with an edited copy, recorded as one undo
    /// entry.
    pub fn apply_layers(&mut self, layers: Vec<MapLayer>) {
        self.history.set_layers(layers);
        self.save_state.lock().unwrap().mark_unsaved();
    }

    /// Paints the selection onto the active layer with its top-left cell
    /// at `(x, y)`. Returns false when the stamp was rejected and nothing
    /// changed.
    pub fn stamp(&mut self, selection: &StampSelection, x: i32, y: i32) -> bool {
        match edits::stamp(
            self.history.layers(),
            self.active_layer_id,
            selection,
            x,
            y,
            self.meta.width,
            self.meta.height,
        ) {
            Some(layers) => {
                self.apply_layers(layers);
                true
            }
            None => false,
        }
    }

    /// Clears a region of the active layer.
    pub fn erase(&mut self, x: i32, y: i32, width: i32, height: i32) -> bool {
        match edits::erase(
            self.history.layers(),
            self.active_layer_id,
            x,
            y,
            width,
            height,
            self.meta.width,
            self.meta.height,
        ) {
            Some(layers) => {
                self.apply_layers(layers);
                true
            }
            None => false,
        }
    }

    /// Undo moves the history cursor only; the unsaved flag stays because
    /// the stack may or may not step back onto the saved state.
    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Resets the map to a single empty base layer, as an undoable edit.
    pub fn clear_map(&mut self) {
        self.history.clear_map();
        self.save_state.lock().unwrap().mark_unsaved();
    }

    pub fn set_active_layer(&mut self, id: i32) {
        self.active_layer_id = id;
    }

    pub fn update_settings(&mut self, update: MapSettingsUpdate) {
        self.meta.apply(update);
        self.save_state.lock().unwrap().mark_unsaved();
    }

    /// Layer snapshot pushed to the UI after every change.
    pub fn layer_view(&self) -> LayerView {
        LayerView {
            layers: self.history.layers().to_vec(),
            active_layer_id: self.active_layer_id,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Sends the current layer snapshot to the UI.
    pub fn push_layers(&self) {
        let _ = self
            .events
            .send(EditorEvent::LayersChanged(self.layer_view()));
    }

    pub fn meta(&self) -> &MapMeta {
        &self.meta
    }

    pub fn active_layer_id(&self) -> i32 {
        self.active_layer_id
    }

    fn build_document(&self) -> MapDocument {
        let selected_layer = self
            .history
            .layers()
            .iter()
            .find(|l| l.id == self.active_layer_id)
            .map(|l| l.name.clone())
            .unwrap_or_default();

        MapDocument {
            id: self.meta.id,
            name: self.meta.name.clone(),
            width: self.meta.width,
            height: self.meta.height,
            tile_size: self.meta.tile_size,
            map_type: self.meta.map_type.clone(),
            tileset_path: self.meta.tileset_path.clone(),
            layers: self.history.layers().to_vec(),
            currently_selected_layer: selected_layer,
            map_encounters: self.build_encounters(),
            properties: DocumentProperties {
                music: self.meta.bg_music.clone(),
            },
        }
    }

    /// Document encounter tables from the index entry. The index's water
    /// list feeds the document's diving list.
    fn build_encounters(&self) -> MapEncounters {
        let Some(summary) = &self.summary else {
            return MapEncounters::default();
        };
        MapEncounters {
            grass: summary.grass_encounters.iter().map(doc_encounter).collect(),
            fishing: summary
                .fishing_encounters
                .iter()
                .map(doc_fishing_encounter)
                .collect(),
            cave: summary.cave_encounters.iter().map(doc_encounter).collect(),
            diving: summary.water_encounters.iter().map(doc_encounter).collect(),
        }
    }

    /// Updated index entry for this map, carrying over whatever the last
    /// entry had and overwriting the header fields.
    fn build_summary(&self, file_path: &str) -> MapSummary {
        let mut summary = self.summary.clone().unwrap_or_default();
        summary.id = self.meta.id;
        summary.name = self.meta.name.clone();
        summary.width = self.meta.width;
        summary.height = self.meta.height;

        let mut properties = summary.properties.first().cloned().unwrap_or_default();
        properties.file_path = file_path.to_string();
        properties.type_of_map = self.meta.map_type.clone();
        properties.tileset_image_path = self.meta.tileset_path.clone();
        properties.bg_music = self.meta.bg_music.clone();
        properties.description = self.meta.description.clone();
        summary.properties = vec![properties];
        summary
    }
}

/// Shows "Map ready!" for a moment, then hides the loading overlay. Skips
/// entirely when the overlay is already down, so a stale fallback timer
/// cannot resurface it.
async fn dismiss_overlay(tracker: SharedTracker, hold: Duration) {
    {
        let mut state = tracker.lock().unwrap();
        if !state.is_loading {
            return;
        }
        state.update_loading_progress(Progress::new(0, 0, "Map ready!"));
    }
    sleep(hold).await;
    tracker.lock().unwrap().finish_loading();
}

fn doc_encounter(encounter: &SummaryEncounter) -> Encounter {
    Encounter {
        name: encounter.name.clone(),
        id: encounter.id,
        min_level: encounter.min_level,
        max_level: encounter.max_level,
        rarity: encounter.rarity,
        shiny: encounter.shiny,
        time_of_day_to_catch: non_empty(&encounter.time_of_day_to_catch, "Morning"),
    }
}

fn doc_fishing_encounter(encounter: &SummaryEncounter) -> FishingEncounter {
    FishingEncounter {
        name: encounter.name.clone(),
        id: encounter.id,
        min_level: encounter.min_level,
        max_level: encounter.max_level,
        rarity: encounter.rarity,
        shiny: encounter.shiny,
        time_of_day_to_catch: non_empty(&encounter.time_of_day_to_catch, "Morning"),
        highest_rod: encounter
            .highest_rod
            .as_deref()
            .filter(|rod| !rod.is_empty())
            .unwrap_or("Old Rod")
            .to_string(),
    }
}
