//! Cell-indexed view of a layer's tiles for constant-time stamp edits.

use std::collections::BTreeMap;

use crate::models::map::MapTile;

/// Tiles keyed by grid cell. At most one tile per cell; inserting into an
/// occupied cell replaces the previous tile. Keys are ordered `(y, x)` so
/// draining walks the map row by row.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    cells: BTreeMap<(i32, i32), MapTile>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a layer's tile list. Duplicate cells in the input collapse
    /// to the last tile listed, matching what the renderer would show.
    pub fn from_tiles(tiles: &[MapTile]) -> Self {
        let mut grid = Self::new();
        for tile in tiles {
            grid.insert(tile.clone());
        }
        grid
    }

    pub fn insert(&mut self, tile: MapTile) {
        self.cells.insert((tile.y, tile.x), tile);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&MapTile> {
        self.cells.get(&(y, x))
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<MapTile> {
        self.cells.remove(&(y, x))
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&(y, x))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flattens back into a tile list in row-major order.
    pub fn into_tiles(self) -> Vec<MapTile> {
        self.cells.into_values().collect()
    }
}
