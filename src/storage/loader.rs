//! Turns an index entry into the layer stack a session edits.

use crate::models::document::MapSummary;
use crate::models::map::MapLayer;
use crate::storage::store::MapStore;

/// What a successful document read hands to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMap {
    pub layers: Vec<MapLayer>,
    /// Layer name the document remembers as selected; may be empty or
    /// stale.
    pub active_layer_name: String,
}

/// Reads and parses the document behind `summary`. Any failure is logged
/// and collapses to `None` so the caller can fall back to an empty map.
pub async fn load_map_layers<S: MapStore>(store: &S, summary: &MapSummary) -> Option<LoadedMap> {
    let path = summary.file_path();
    if path.is_empty() {
        log::warn!("STORE: map {} has no file path in the index", summary.id);
        return None;
    }

    let document = match store.read_document(path).await {
        Ok(document) => document,
        Err(e) => {
            log::error!("STORE: error loading map data: {}", e);
            return None;
        }
    };

    if document.layers.is_empty() {
        log::warn!("STORE: map {} document has no layers", summary.id);
        return None;
    }

    Some(LoadedMap {
        layers: document.layers,
        active_layer_name: document.currently_selected_layer,
    })
}

/// Picks the active layer id for a freshly loaded stack: the remembered
/// name when it still exists, otherwise the first layer, otherwise 1.
pub fn resolve_active_layer(layers: &[MapLayer], remembered_name: &str) -> i32 {
    if !remembered_name.is_empty() {
        if let Some(layer) = layers.iter().find(|l| l.name == remembered_name) {
            return layer.id;
        }
    }
    layers.first().map(|l| l.id).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{MapDocument, SummaryProperties};
    use crate::models::map::MapTile;
    use crate::storage::store::memory::MemoryStore;

    fn summary_with_path(path: &str) -> MapSummary {
        MapSummary {
            id: 1,
            name: "Route 1".into(),
            properties: vec![SummaryProperties {
                file_path: path.into(),
                ..SummaryProperties::default()
            }],
            ..MapSummary::default()
        }
    }

    fn document_with_layers() -> MapDocument {
        MapDocument {
            layers: vec![
                MapLayer {
                    id: 1,
                    name: "Base Layer".into(),
                    tiles: vec![MapTile::new(0, 0, "grass")],
                    ..MapLayer::default()
                },
                MapLayer {
                    id: 2,
                    name: "Objects".into(),
                    ..MapLayer::default()
                },
            ],
            currently_selected_layer: "Objects".into(),
            ..MapDocument::default()
        }
    }

    #[tokio::test]
    async fn loads_layers_and_remembered_selection() {
        let store = MemoryStore::with_map(
            summary_with_path("maps/route1.json"),
            "maps/route1.json",
            document_with_layers(),
        );
        let summary = summary_with_path("maps/route1.json");

        let loaded = load_map_layers(&store, &summary).await.unwrap();
        assert_eq!(loaded.layers.len(), 2);
        assert_eq!(loaded.active_layer_name, "Objects");
        assert_eq!(resolve_active_layer(&loaded.layers, &loaded.active_layer_name), 2);
    }

    #[tokio::test]
    async fn empty_file_path_collapses_to_none() {
        let store = MemoryStore::default();
        let summary = MapSummary {
            id: 1,
            ..MapSummary::default()
        };
        assert!(load_map_layers(&store, &summary).await.is_none());
    }

    #[tokio::test]
    async fn unreadable_document_collapses_to_none() {
        let mut store = MemoryStore::with_map(
            summary_with_path("maps/route1.json"),
            "maps/route1.json",
            document_with_layers(),
        );
        store.fail_read = true;
        let summary = summary_with_path("maps/route1.json");
        assert!(load_map_layers(&store, &summary).await.is_none());
    }

    #[tokio::test]
    async fn document_without_layers_collapses_to_none() {
        let store = MemoryStore::with_map(
            summary_with_path("maps/empty.json"),
            "maps/empty.json",
            MapDocument::default(),
        );
        let summary = summary_with_path("maps/empty.json");
        assert!(load_map_layers(&store, &summary).await.is_none());
    }

    #[test]
    fn stale_selection_falls_back_to_the_first_layer() {
        let layers = document_with_layers().layers;
        assert_eq!(resolve_active_layer(&layers, "Deleted Layer"), 1);
        assert_eq!(resolve_active_layer(&layers, ""), 1);
        assert_eq!(resolve_active_layer(&[], "anything"), 1);
    }
}
