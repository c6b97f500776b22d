//! Undo/redo history for the layer stack.
//!
//! Snapshots are immutable `Arc<[MapLayer]>` entries in an append-only log;
//! undo and redo only move a cursor, they never mutate layer data. The live
//! layer set is tracked next to the log so that seeding a freshly opened map
//! does not pollute its history.

use std::sync::Arc;

use crate::models::map::MapLayer;

/// One immutable snapshot of the full layer stack.
pub type LayerSet = Arc<[MapLayer]>;

pub struct LayerHistory {
    current: LayerSet,
    log: Vec<LayerSet>,
    cursor: usize,
}

impl LayerHistory {
    /// Starts with a single empty snapshot so the first real edit is
    /// undoable back to an empty map.
    pub fn new() -> Self {
        let empty: LayerSet = Vec::new().into();
        Self {
            current: empty.clone(),
            log: vec![empty],
            cursor: 0,
        }
    }

    /// Drops all history and returns to the seeded state. Used when a new
    /// map is opened in the same session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Replaces the live layer set without recording it. Opening a map goes
    /// through here so an unedited map cannot be undone into nothing.
    pub fn seed(&mut self, layers: Vec<MapLayer>) {
        self.current = layers.into();
    }

    /// Records the live layer set as a new history entry. Any redo entries
    /// past the cursor are discarded first.
    pub fn record_current(&mut self) {
        let snapshot = self.current.clone();
        self.log.truncate(self.cursor + 1);
        self.log.push(snapshot);
        self.cursor = self.log.len() - 1;
    }

    /// Replaces the live layer set and records it in one step.
    pub fn set_layers(&mut self, layers: Vec<MapLayer>) {
        self.seed(layers);
        self.record_current();
    }

    /// Resets the map to a single empty base layer, as a recorded edit so
    /// it can be undone.
    pub fn clear_map(&mut self) {
        self.set_layers(vec![MapLayer::base()]);
    }

    /// Steps back one entry. Returns false without changing anything when
    /// already at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.current = self.log[self.cursor].clone();
        true
    }

    /// Steps forward one entry. Returns false without changing anything
    /// when already at the newest entry.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.log.len() {
            return false;
        }
        self.cursor += 1;
        self.current = self.log[self.cursor].clone();
        true
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.current
    }

    /// Cheap shared handle to the live snapshot, for handing to the render
    /// pipeline without copying tiles.
    pub fn snapshot(&self) -> LayerSet {
        self.current.clone()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.log.len()
    }
}

impl Default for LayerHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::map::MapTile;

    fn layers(name: &str, tile_count: usize) -> Vec<MapLayer> {
        let tiles = (0..tile_count)
            .map(|i| MapTile::new(i as i32, 0, format!("{name}_{i}")))
            .collect();
        vec![MapLayer {
            id: 1,
            name: name.to_string(),
            tiles,
            ..MapLayer::default()
        }]
    }

    #[test]
    fn starts_seeded_with_one_empty_entry() {
        let history = LayerHistory::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.layers().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_then_redo_restores_the_same_snapshot() {
        let mut history = LayerHistory::new();
        history.set_layers(layers("a", 1));
        history.set_layers(layers("b", 2));
        let before = history.snapshot();

        assert!(history.undo());
        assert_eq!(history.layers()[0].name, "a");
        assert!(history.redo());

        // The identical arena entry comes back, not a copy of it.
        assert!(Arc::ptr_eq(&before, &history.snapshot()));
    }

    #[test]
    fn edge_undo_and_redo_are_rejected_without_changes() {
        let mut history = LayerHistory::new();
        history.set_layers(layers("a", 1));

        assert!(!history.redo());
        assert_eq!(history.cursor(), 1);

        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.cursor(), 0);
        assert!(history.layers().is_empty());
    }

    #[test]
    fn recording_after_undo_discards_the_redo_branch() {
        let mut history = LayerHistory::new();
        history.set_layers(layers("a", 1));
        history.set_layers(layers("b", 1));
        history.set_layers(layers("c", 1));
        assert_eq!(history.len(), 4);

        assert!(history.undo());
        assert!(history.undo());
        assert_eq!(history.layers()[0].name, "a");

        history.set_layers(layers("d", 1));
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());

        assert!(history.undo());
        assert_eq!(history.layers()[0].name, "a");
        assert!(history.redo());
        assert_eq!(history.layers()[0].name, "d");
    }

    #[test]
    fn clear_map_is_a_recorded_edit() {
        let mut history = LayerHistory::new();
        history.set_layers(layers("a", 3));
        history.clear_map();

        assert_eq!(history.layers().len(), 1);
        assert_eq!(history.layers()[0].name, "Base Layer");
        assert!(history.layers()[0].tiles.is_empty());

        assert!(history.undo());
        assert_eq!(history.layers()[0].name, "a");
        assert_eq!(history.layers()[0].tiles.len(), 3);
    }

    #[test]
    fn seeding_does_not_create_history() {
        let mut history = LayerHistory::new();
        history.seed(layers("loaded", 2));

        assert_eq!(history.len(), 1);
        assert_eq!(history.layers()[0].name, "loaded");
        assert!(!history.can_undo());

        history.record_current();
        assert_eq!(history.len(), 2);
        assert!(history.can_undo());
        assert!(history.undo());
        assert!(history.layers().is_empty());
    }
}
