//! On-disk map formats: the per-map JSON document and the TOML map index.

use serde::{Deserialize, Serialize};

use crate::models::map::MapLayer;

/// A wild-creature encounter slot as stored inside a map document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub min_level: i32,
    #[serde(default)]
    pub max_level: i32,
    #[serde(default)]
    pub rarity: i32,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default)]
    pub time_of_day_to_catch: String,
}

/// Same as [`Encounter`] plus the rod tier needed to trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FishingEncounter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub min_level: i32,
    #[serde(default)]
    pub max_level: i32,
    #[serde(default)]
    pub rarity: i32,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default)]
    pub time_of_day_to_catch: String,
    #[serde(default)]
    pub highest_rod: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MapEncounters {
    #[serde(default)]
    pub grass: Vec<Encounter>,
    #[serde(default)]
    pub fishing: Vec<FishingEncounter>,
    #[serde(default)]
    pub cave: Vec<Encounter>,
    #[serde(default)]
    pub diving: Vec<Encounter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocumentProperties {
    #[serde(default)]
    pub music: String,
}

/// The full JSON document written next to the game assets.
///
/// Parsing is deliberately lenient: every field defaults, and the selected
/// layer key accepts the misspelled historical variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub tile_size: i32,
    #[serde(default, rename = "type")]
    pub map_type: String,
    #[serde(default)]
    pub tileset_path: String,
    #[serde(default)]
    pub layers: Vec<MapLayer>,
    #[serde(default, alias = "CurrentSelectedLayer")]
    pub currently_selected_layer: String,
    #[serde(default)]
    pub map_encounters: MapEncounters,
    #[serde(default)]
    pub properties: DocumentProperties,
}

/// Canonical location of a map document, derived from the map name.
pub fn document_path(name: &str) -> String {
    format!("data/assets/maps/{name}.json")
}

/// Per-map block in the TOML index. Keys follow the index file's
/// PascalCase convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MapSummary {
    #[serde(default, rename = "ID")]
    pub id: i64,
    #[serde(default, rename = "Name")]
    pub name: String,
    #[serde(default, rename = "Width")]
    pub width: i32,
    #[serde(default, rename = "Height")]
    pub height: i32,
    #[serde(default, rename = "Properties")]
    pub properties: Vec<SummaryProperties>,
    #[serde(default, rename = "GrassEncounters")]
    pub grass_encounters: Vec<SummaryEncounter>,
    #[serde(default, rename = "WaterEncounters")]
    pub water_encounters: Vec<SummaryEncounter>,
    #[serde(default, rename = "CaveEncounters")]
    pub cave_encounters: Vec<SummaryEncounter>,
    #[serde(default, rename = "FishingEncounters")]
    pub fishing_encounters: Vec<SummaryEncounter>,
}

impl MapSummary {
    /// Path of the JSON document this entry points at, empty when the entry
    /// carries no properties block.
    pub fn file_path(&self) -> &str {
        self.properties
            .first()
            .map(|p| p.file_path.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SummaryProperties {
    #[serde(default, rename = "FilePath")]
    pub file_path: String,
    #[serde(default, rename = "TypeOfMap")]
    pub type_of_map: String,
    #[serde(default, rename = "TilesetImagePath")]
    pub tileset_image_path: String,
    #[serde(default, rename = "BgMusic")]
    pub bg_music: String,
    #[serde(default, rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SummaryEncounter {
    #[serde(default, rename = "Name")]
    pub name: String,
    #[serde(default, rename = "ID")]
    pub id: i32,
    #[serde(default, rename = "MinLevel")]
    pub min_level: i32,
    #[serde(default, rename = "MaxLevel")]
    pub max_level: i32,
    #[serde(default, rename = "Rarity")]
    pub rarity: i32,
    #[serde(default, rename = "Shiny")]
    pub shiny: bool,
    #[serde(default, rename = "TimeOfDayToCatch")]
    pub time_of_day_to_catch: String,
    #[serde(
        default,
        rename = "HighestRod",
        skip_serializing_if = "Option::is_none"
    )]
    pub highest_rod: Option<String>,
}

/// Root of the `maps.toml` index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MapIndex {
    #[serde(default)]
    pub map: Vec<MapSummary>,
}
