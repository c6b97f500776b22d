pub mod document;
pub mod map;
pub mod settings;

pub use document::{
    Encounter, FishingEncounter, MapDocument, MapEncounters, MapIndex, MapSummary,
    SummaryEncounter, SummaryProperties, document_path,
};
pub use map::{MapLayer, MapTile, RenderRequest, StampSelection};
pub use settings::EditorSettings;
