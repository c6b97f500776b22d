//! Tile map data model shared by the editor, the storage layer and the
//! render backend.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_true() -> bool {
    true
}

/// Turns the empty-string placeholder some writers emit into a real absence.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// A single placed tile. Coordinates are grid cells, not pixels.
///
/// Older documents were saved with PascalCase keys, so every field accepts
/// the historical spellings alongside the canonical camelCase ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapTile {
    #[serde(default, alias = "X")]
    pub x: i32,
    #[serde(default, alias = "Y")]
    pub y: i32,
    #[serde(default, alias = "TileID", alias = "TileId")]
    pub tile_id: String,
    #[serde(
        default,
        alias = "AutoTileID",
        alias = "AutoTileId",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_tile_id: Option<String>,
}

impl MapTile {
    pub fn new(x: i32, y: i32, tile_id: impl Into<String>) -> Self {
        Self {
            x,
            y,
            tile_id: tile_id.into(),
            auto_tile_id: None,
        }
    }
}

/// One drawable layer of a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    #[serde(default, alias = "ID")]
    pub id: i32,
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Missing in old documents, which treated every layer as visible.
    #[serde(default = "default_true", alias = "Visible")]
    pub visible: bool,
    #[serde(default, alias = "Locked")]
    pub locked: bool,
    #[serde(default, alias = "Tiles")]
    pub tiles: Vec<MapTile>,
}

impl MapLayer {
    /// The layer every fresh or unreadable map starts with.
    pub fn base() -> Self {
        Self {
            id: 1,
            name: "Base Layer".to_string(),
            visible: true,
            locked: false,
            tiles: Vec::new(),
        }
    }
}

impl Default for MapLayer {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            visible: true,
            locked: false,
            tiles: Vec::new(),
        }
    }
}

/// Payload handed to the render backend when a full-map render is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
    pub layers: Vec<MapLayer>,
    pub show_grid: bool,
    pub show_checkerboard: bool,
}

/// Brush selection used by the stamp tool. `sub_tiles[x][y]` carries the
/// per-cell images of a multi-cell selection; single-cell brushes only set
/// `image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StampSelection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_tiles: Option<Vec<Vec<String>>>,
}

/// Collects every distinct tile id across all layers, first occurrence
/// first. Empty ids are skipped.
pub fn distinct_tile_ids(layers: &[MapLayer]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for layer in layers {
        for tile in &layer.tiles {
            if !tile.tile_id.is_empty() && seen.insert(tile.tile_id.clone()) {
                ids.push(tile.tile_id.clone());
            }
        }
    }
    ids
}

/// True when at least one layer holds at least one tile.
pub fn layers_have_tiles(layers: &[MapLayer]) -> bool {
    layers.iter().any(|layer| !layer.tiles.is_empty())
}
