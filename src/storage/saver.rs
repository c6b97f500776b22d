//! Save pipeline: optional rename, document write, index update, and the
//! transient "saved" notice state.

use std::sync::{Arc, Mutex};

use crate::models::document::{MapDocument, MapSummary};
use crate::storage::store::MapStore;

/// Save-related UI state, shared between the session worker and the UI
/// thread.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveState {
    /// A save is in flight; a second one must not start.
    pub is_saving: bool,
    /// The "map saved" notice is currently visible.
    pub show_saved_message: bool,
    pub has_unsaved_changes: bool,
    save_epoch: u64,
}

impl SaveState {
    pub fn mark_unsaved(&mut self) {
        self.has_unsaved_changes = true;
    }

    pub fn begin_save(&mut self) {
        self.is_saving = true;
    }

    pub fn end_save(&mut self) {
        self.is_saving = false;
    }

    /// Records a successful save, shows the notice, and returns the epoch
    /// its expiry timer must present to hide it again.
    pub fn record_saved(&mut self) -> u64 {
        self.has_unsaved_changes = false;
        self.show_saved_message = true;
        self.save_epoch += 1;
        self.save_epoch
    }

    /// Hides the notice unless a newer save refreshed it since `epoch`.
    pub fn expire_notice(&mut self, epoch: u64) {
        if self.save_epoch == epoch {
            self.show_saved_message = false;
        }
    }
}

pub type SharedSaveState = Arc<Mutex<SaveState>>;

pub fn shared_save_state() -> SharedSaveState {
    Arc::new(Mutex::new(SaveState::default()))
}

/// Writes one map to the store: rename first when the map changed name,
/// then the JSON document, then the index entry.
///
/// A failed rename is logged and the save continues against the new path.
/// Document and index writes are both always attempted; the save only
/// counts as successful when both land.
pub async fn persist_map<S: MapStore>(
    store: &S,
    old_path: &str,
    new_path: &str,
    renamed: bool,
    document: &MapDocument,
    summary: &MapSummary,
) -> bool {
    if new_path.is_empty() {
        log::error!("STORE: no JSON file path for map {}", summary.id);
        return false;
    }

    if renamed && !old_path.is_empty() && old_path != new_path {
        match store.rename_document(old_path, new_path).await {
            Ok(message) => log::info!("STORE: {}", message),
            Err(e) => log::error!("STORE: failed to rename map file: {}", e),
        }
    }

    let document_ok = match store.write_document(new_path, document).await {
        Ok(message) => {
            log::info!("STORE: {}", message);
            true
        }
        Err(e) => {
            log::error!("STORE: error saving map: {}", e);
            false
        }
    };

    let summary_ok = match store.update_summary(summary).await {
        Ok(message) => {
            log::info!("STORE: {}", message);
            true
        }
        Err(e) => {
            log::error!("STORE: error updating map index: {}", e);
            false
        }
    };

    document_ok && summary_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::SummaryProperties;
    use crate::storage::store::memory::MemoryStore;

    fn summary(id: i64, name: &str, path: &str) -> MapSummary {
        MapSummary {
            id,
            name: name.into(),
            properties: vec![SummaryProperties {
                file_path: path.into(),
                ..SummaryProperties::default()
            }],
            ..MapSummary::default()
        }
    }

    #[tokio::test]
    async fn save_without_rename_writes_document_and_index() {
        let store = MemoryStore::with_map(
            summary(1, "Route 1", "maps/route1.json"),
            "maps/route1.json",
            MapDocument::default(),
        );
        let document = MapDocument {
            name: "Route 1".into(),
            width: 30,
            ..MapDocument::default()
        };
        let updated = MapSummary {
            width: 30,
            ..summary(1, "Route 1", "maps/route1.json")
        };

        let ok = persist_map(
            &store,
            "maps/route1.json",
            "maps/route1.json",
            false,
            &document,
            &updated,
        )
        .await;

        assert!(ok);
        assert!(store.renames.lock().unwrap().is_empty());
        assert_eq!(
            store.documents.lock().unwrap()["maps/route1.json"].width,
            30
        );
        assert_eq!(store.summaries.lock().unwrap()[0].width, 30);
    }

    #[tokio::test]
    async fn rename_failure_does_not_abort_the_save() {
        let mut store = MemoryStore::with_map(
            summary(1, "Old", "maps/old.json"),
            "maps/old.json",
            MapDocument::default(),
        );
        store.fail_rename = true;

        let ok = persist_map(
            &store,
            "maps/old.json",
            "maps/new.json",
            true,
            &MapDocument::default(),
            &summary(1, "New", "maps/new.json"),
        )
        .await;

        assert!(ok);
        assert_eq!(store.renames.lock().unwrap().len(), 1);
        // The document was written under the new path regardless.
        assert!(store.documents.lock().unwrap().contains_key("maps/new.json"));
        assert_eq!(store.summaries.lock().unwrap()[0].name, "New");
    }

    #[tokio::test]
    async fn index_failure_fails_the_save_but_keeps_the_document() {
        let mut store = MemoryStore::with_map(
            summary(1, "Route 1", "maps/route1.json"),
            "maps/route1.json",
            MapDocument::default(),
        );
        store.fail_update = true;

        let ok = persist_map(
            &store,
            "maps/route1.json",
            "maps/route1.json",
            false,
            &MapDocument {
                height: 99,
                ..MapDocument::default()
            },
            &summary(1, "Route 1", "maps/route1.json"),
        )
        .await;

        assert!(!ok);
        assert_eq!(
            store.documents.lock().unwrap()["maps/route1.json"].height,
            99
        );
    }

    #[tokio::test]
    async fn empty_target_path_aborts_before_touching_the_store() {
        let store = MemoryStore::default();
        let ok = persist_map(
            &store,
            "",
            "",
            false,
            &MapDocument::default(),
            &MapSummary::default(),
        )
        .await;
        assert!(!ok);
        assert!(store.documents.lock().unwrap().is_empty());
    }

    #[test]
    fn notice_epoch_ignores_stale_expiry() {
        let mut state = SaveState::default();
        state.mark_unsaved();
        assert!(state.has_unsaved_changes);

        let first = state.record_saved();
        assert!(state.show_saved_message);
        assert!(!state.has_unsaved_changes);

        // A second save lands before the first notice times out.
        let second = state.record_saved();
        state.expire_notice(first);
        assert!(state.show_saved_message);

        state.expire_notice(second);
        assert!(!state.show_saved_message);
    }
}
