use crate::models::map::{MapLayer, StampSelection};

/// UI → session worker.
#[derive(Debug)]
pub enum EditorCommand {
    OpenMap { id: i64 },
    Save,
    /// Full replacement of the layer stack, recorded as one edit.
    SetLayers(Vec<MapLayer>),
    Stamp { selection: StampSelection, x: i32, y: i32 },
    Erase { x: i32, y: i32, width: i32, height: i32 },
    Undo,
    Redo,
    ClearMap,
    SetActiveLayer { id: i32 },
    UpdateSettings(MapSettingsUpdate),
    /// The view finished drawing the first frame of the current map.
    InitialRenderReady,
    Shutdown,
}

/// Session worker → UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    MapOpened { id: i64 },
    /// Sent once per load when the map becomes usable.
    MapReady,
    /// A finished backend render, with the encoded map image.
    MapRendered { image_data: String },
    LayersChanged(LayerView),
    SaveFinished { success: bool },
}

/// Snapshot of the layer stack pushed to the UI after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerView {
    pub layers: Vec<MapLayer>,
    pub active_layer_id: i32,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Partial update of the map header; `None` fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapSettingsUpdate {
    pub name: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub tile_size: Option<i32>,
    pub map_type: Option<String>,
    pub music: Option<String>,
}
