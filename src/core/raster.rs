//! Row-major raster of tile colors

use std::collections::HashMap;

use serde::Serialize;

use crate::core::grid::{TileGrid, TileId};
use crate::core::region::{Color, UNCONNECTED};

/// Colors of every grid cell, `cells[row * columns + col]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorRaster {
    pub level: u8,
    pub rows: u32,
    pub columns: u32,
    pub cells: Vec<Color>,
}

/// Lay the tile colors out over the whole grid.
///
/// Cells without an entry in `colors` are 0. Entries outside the grid are
/// ignored.
pub fn to_raster<G: TileGrid + ?Sized>(colors: &HashMap<TileId, Color>, grid: &G) -> Vec<Color> {
    let mut cells = vec![UNCONNECTED; grid.tile_count() as usize];
    for (&tile, &color) in colors {
        if let Some(cell) = cells.get_mut(tile as usize) {
            *cell = color;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Tiles;
    use geo::{coord, Rect};

    fn grid(rows: u32, cols: u32) -> Tiles {
        Tiles::new(
            Rect::new(
                coord! { x: 0.0, y: 0.0 },
                coord! { x: f64::from(cols), y: f64::from(rows) },
            ),
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_raster_layout() {
        let tiles = grid(2, 3);
        let colors = HashMap::from([(0, 4), (4, 9), (5, 9)]);
        assert_eq!(to_raster(&colors, &tiles), vec![4, 0, 0, 0, 9, 9]);
    }

    #[test]
    fn test_raster_row_major_index() {
        let tiles = grid(3, 4);
        let colors = HashMap::from([(tiles.tile_id(2, 1), 7)]);
        let cells = to_raster(&colors, &tiles);
        assert_eq!(cells.len(), 12);
        assert_eq!(cells[2 * 4 + 1], 7);
        assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 1);
    }

    #[test]
    fn test_raster_ignores_tiles_outside_grid() {
        let tiles = grid(2, 2);
        let colors = HashMap::from([(1, 3), (40, 8)]);
        assert_eq!(to_raster(&colors, &tiles), vec![0, 3, 0, 0]);
    }

    #[test]
    fn test_empty_colors_give_zero_raster() {
        let tiles = grid(2, 2);
        assert_eq!(to_raster(&HashMap::new(), &tiles), vec![0; 4]);
    }
}
