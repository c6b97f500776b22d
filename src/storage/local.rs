//! Filesystem store rooted at the game data directory.
//!
//! Layout mirrors the shipped game assets: map documents under
//! `data/assets/maps/` and the index at `data/toml/maps.toml`. Index
//! paths are kept relative to the root so save files stay portable.

use std::io;
use std::path::{Path, PathBuf};

use crate::models::document::{MapDocument, MapIndex, MapSummary};
use crate::storage::store::{MapStore, StoreError};

pub struct LocalMapStore {
    root: PathBuf,
}

impl LocalMapStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("data/toml/maps.toml")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn read_index(&self) -> Result<MapIndex, StoreError> {
        let path = self.index_path();
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                StoreError::NotFound(format!("map index {}", path.display()))
            }
            _ => StoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn write_index(&self, index: &MapIndex) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(index).map_err(|e| StoreError::Parse(e.to_string()))?;
        let path = self.index_path();
        create_parent(&path)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl MapStore for LocalMapStore {
    async fn map_summary(&self, id: i64) -> Result<MapSummary, StoreError> {
        let index = self.read_index()?;
        index
            .map
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("map with ID {id}")))
    }

    async fn read_document(&self, path: &str) -> Result<MapDocument, StoreError> {
        let file = self.resolve(path);
        let content = std::fs::read_to_string(&file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                StoreError::NotFound(format!("map file {}", file.display()))
            }
            _ => StoreError::Io(e),
        })?;
        serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn write_document(
        &self,
        path: &str,
        document: &MapDocument,
    ) -> Result<String, StoreError> {
        let file = self.resolve(path);
        create_parent(&file)?;
        let content =
            serde_json::to_string_pretty(document).map_err(|e| StoreError::Parse(e.to_string()))?;
        std::fs::write(&file, content)?;
        Ok(format!("Successfully updated map JSON file: {path}"))
    }

    async fn rename_document(&self, old_path: &str, new_path: &str) -> Result<String, StoreError> {
        let old_file = self.resolve(old_path);
        if !old_file.exists() {
            return Err(StoreError::NotFound(format!(
                "old map file {}",
                old_file.display()
            )));
        }
        let new_file = self.resolve(new_path);
        create_parent(&new_file)?;
        std::fs::rename(&old_file, &new_file)?;
        Ok(format!(
            "Successfully renamed map file from {old_path} to {new_path}"
        ))
    }

    async fn update_summary(&self, summary: &MapSummary) -> Result<String, StoreError> {
        let mut index = self.read_index()?;
        let slot = index
            .map
            .iter_mut()
            .find(|m| m.id == summary.id)
            .ok_or_else(|| StoreError::NotFound(format!("map with ID {}", summary.id)))?;
        *slot = summary.clone();
        self.write_index(&index)?;
        Ok(format!("Successfully updated map with ID {}", summary.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::SummaryProperties;
    use crate::models::map::{MapLayer, MapTile};

    fn temp_store(tag: &str) -> LocalMapStore {
        let root = std::env::temp_dir().join(format!("mapforge-store-{}-{tag}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        LocalMapStore::new(root)
    }

    fn cleanup(store: &LocalMapStore) {
        let _ = std::fs::remove_dir_all(&store.root);
    }

    fn summary(id: i64, name: &str, path: &str) -> MapSummary {
        MapSummary {
            id,
            name: name.into(),
            width: 20,
            height: 15,
            properties: vec![SummaryProperties {
                file_path: path.into(),
                ..SummaryProperties::default()
            }],
            ..MapSummary::default()
        }
    }

    #[tokio::test]
    async fn finds_a_summary_by_id() {
        let store = temp_store("summary");
        store
            .write_index(&MapIndex {
                map: vec![
                    summary(1, "Route 1", "data/assets/maps/Route 1.json"),
                    summary(2, "Cave", "data/assets/maps/Cave.json"),
                ],
            })
            .unwrap();

        let found = store.map_summary(2).await.unwrap();
        assert_eq!(found.name, "Cave");

        let missing = store.map_summary(9).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));
        cleanup(&store);
    }

    #[tokio::test]
    async fn missing_index_reads_as_not_found() {
        let store = temp_store("no-index");
        let err = store.map_summary(1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        cleanup(&store);
    }

    #[tokio::test]
    async fn document_write_then_read_round_trips() {
        let store = temp_store("doc");
        let document = MapDocument {
            id: 1,
            name: "Route 1".into(),
            width: 4,
            height: 4,
            tile_size: 16,
            layers: vec![MapLayer {
                id: 1,
                name: "Base Layer".into(),
                tiles: vec![MapTile::new(0, 0, "grass")],
                ..MapLayer::default()
            }],
            currently_selected_layer: "Base Layer".into(),
            ..MapDocument::default()
        };

        let message = store
            .write_document("data/assets/maps/Route 1.json", &document)
            .await
            .unwrap();
        assert!(message.contains("Route 1.json"));

        let back = store
            .read_document("data/assets/maps/Route 1.json")
            .await
            .unwrap();
        assert_eq!(back, document);

        let missing = store.read_document("data/assets/maps/zzz.json").await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
        cleanup(&store);
    }

    #[tokio::test]
    async fn reads_legacy_documents_with_pascal_case_keys() {
        let store = temp_store("legacy");
        let path = store.resolve("data/assets/maps/Old.json");
        create_parent(&path).unwrap();
        std::fs::write(
            &path,
            r#"{
                "id": 3,
                "name": "Old",
                "layers": [
                    {
                        "ID": 1,
                        "Name": "Base Layer",
                        "Tiles": [{"X": 2, "Y": 1, "TileID": "grass", "AutoTileID": ""}]
                    }
                ],
                "CurrentSelectedLayer": "Base Layer"
            }"#,
        )
        .unwrap();

        let document = store
            .read_document("data/assets/maps/Old.json")
            .await
            .unwrap();
        assert_eq!(document.currently_selected_layer, "Base Layer");
        let tile = &document.layers[0].tiles[0];
        assert_eq!((tile.x, tile.y), (2, 1));
        assert_eq!(tile.tile_id, "grass");
        assert_eq!(tile.auto_tile_id, None);
        assert!(document.layers[0].visible);
        cleanup(&store);
    }

    #[tokio::test]
    async fn rename_moves_the_document() {
        let store = temp_store("rename");
        store
            .write_document("data/assets/maps/Before.json", &MapDocument::default())
            .await
            .unwrap();

        store
            .rename_document("data/assets/maps/Before.json", "data/assets/maps/After.json")
            .await
            .unwrap();

        assert!(store.resolve("data/assets/maps/After.json").exists());
        assert!(!store.resolve("data/assets/maps/Before.json").exists());

        let err = store
            .rename_document("data/assets/maps/Ghost.json", "data/assets/maps/X.json")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        cleanup(&store);
    }

    #[tokio::test]
    async fn update_summary_replaces_only_the_matching_entry() {
        let store = temp_store("update");
        store
            .write_index(&MapIndex {
                map: vec![
                    summary(1, "Route 1", "data/assets/maps/Route 1.json"),
                    summary(2, "Cave", "data/assets/maps/Cave.json"),
                ],
            })
            .unwrap();

        let renamed = summary(2, "Deep Cave", "data/assets/maps/Deep Cave.json");
        store.update_summary(&renamed).await.unwrap();

        let index = store.read_index().unwrap();
        assert_eq!(index.map[0].name, "Route 1");
        assert_eq!(index.map[1].name, "Deep Cave");
        assert_eq!(index.map[1].file_path(), "data/assets/maps/Deep Cave.json");

        let unknown = summary(9, "Nowhere", "x.json");
        let err = store.update_summary(&unknown).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        cleanup(&store);
    }
}
