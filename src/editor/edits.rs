//! Stamp and erase operations on the layer stack.
//!
//! Both return a full replacement layer set on success so the caller can
//! record it as one history entry, and `None` when the request is invalid
//! and nothing must change.

use crate::editor::grid::TileGrid;
use crate::models::map::{MapLayer, MapTile, StampSelection};

/// Stamps `selection` with its top-left cell at `(x, y)` onto the active
/// layer. Cells outside the map are clipped. Existing tiles under the
/// stamped region are replaced. A zero-sized selection covers one cell.
pub fn stamp(
    layers: &[MapLayer],
    active_layer_id: i32,
    selection: &StampSelection,
    x: i32,
    y: i32,
    map_width: i32,
    map_height: i32,
) -> Option<Vec<MapLayer>> {
    if x < 0 || y < 0 {
        log::warn!("EDIT: stamp rejected, negative origin ({}, {})", x, y);
        return None;
    }
    if selection.width < 0 || selection.height < 0 {
        log::warn!(
            "EDIT: stamp rejected, negative region {}x{}",
            selection.width,
            selection.height
        );
        return None;
    }

    // Zero means a bare tile pick with no region, stamped as one cell.
    let region_w = selection.width.max(1);
    let region_h = selection.height.max(1);

    let position = match layers.iter().position(|l| l.id == active_layer_id) {
        Some(position) => position,
        None => {
            log::warn!("EDIT: stamp rejected, no layer with id {}", active_layer_id);
            return None;
        }
    };

    let mut grid = TileGrid::from_tiles(&layers[position].tiles);

    for dx in 0..region_w {
        for dy in 0..region_h {
            let (tx, ty) = (x + dx, y + dy);
            if tx >= map_width || ty >= map_height {
                continue;
            }
            grid.remove(tx, ty);

            let image = sub_tile_image(selection, dx, dy)
                .unwrap_or(selection.image.as_str())
                .to_string();
            grid.insert(MapTile::new(tx, ty, image));
        }
    }

    Some(replace_layer_tiles(layers, position, grid.into_tiles()))
}

/// Removes every tile in the `width` x `height` region whose top-left cell
/// is `(x, y)` from the active layer.
pub fn erase(
    layers: &[MapLayer],
    active_layer_id: i32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    map_width: i32,
    map_height: i32,
) -> Option<Vec<MapLayer>> {
    if x < 0 || y < 0 {
        log::warn!("EDIT: erase rejected, negative origin ({}, {})", x, y);
        return None;
    }
    if width < 0 || height < 0 {
        log::warn!("EDIT: erase rejected, negative region {}x{}", width, height);
        return None;
    }

    let region_w = width.max(1);
    let region_h = height.max(1);

    let position = match layers.iter().position(|l| l.id == active_layer_id) {
        Some(position) => position,
        None => {
            log::warn!("EDIT: erase rejected, no layer with id {}", active_layer_id);
            return None;
        }
    };

    let mut grid = TileGrid::from_tiles(&layers[position].tiles);

    for dx in 0..region_w {
        for dy in 0..region_h {
            let (tx, ty) = (x + dx, y + dy);
            if tx >= map_width || ty >= map_height {
                continue;
            }
            grid.remove(tx, ty);
        }
    }

    Some(replace_layer_tiles(layers, position, grid.into_tiles()))
}

/// Per-cell image of a multi-cell selection, when one is defined for the
/// `(dx, dy)` offset.
fn sub_tile_image(selection: &StampSelection, dx: i32, dy: i32) -> Option<&str> {
    let columns = selection.sub_tiles.as_ref()?;
    let column = columns.get(dx as usize)?;
    column.get(dy as usize).map(String::as_str)
}

fn replace_layer_tiles(
    layers: &[MapLayer],
    position: usize,
    tiles: Vec<MapTile>,
) -> Vec<MapLayer> {
    let mut updated = layers.to_vec();
    updated[position].tiles = tiles;
    updated
}
