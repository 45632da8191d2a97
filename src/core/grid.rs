//! Tile grid addressing
//!
//! Every hierarchy level is a regular lon/lat grid. Tiles are numbered
//! row-major starting at the south-west corner: `id = row * ncolumns + col`,
//! row 0 is the southernmost row and column 0 the westernmost column.

use geo::{coord, Coord, Rect};

use crate::core::error::{Error, Result};

/// Tile identifier, unique within one hierarchy level
pub type TileId = u32;

/// One of the four sides of a tile.
///
/// Sides are ordered so that visiting them by increasing index walks the tile
/// outline counter-clockwise, keeping the tile on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    West = 0,
    South = 1,
    East = 2,
    North = 3,
}

impl Side {
    /// All sides in walking order
    pub const ALL: [Side; 4] = [Side::West, Side::South, Side::East, Side::North];

    /// Index of this side in walking order
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Side for a walking-order index (taken modulo 4)
    #[inline]
    pub fn from_index(index: usize) -> Side {
        Self::ALL[index % 4]
    }

    /// Next side counter-clockwise
    #[inline]
    pub fn next(self) -> Side {
        Self::from_index(self.index() + 1)
    }

    /// Previous side (clockwise)
    #[inline]
    pub fn prev(self) -> Side {
        Self::from_index(self.index() + 3)
    }

    /// Corner where this side starts when the tile is walked counter-clockwise
    pub fn start_corner(self, bounds: &Rect<f64>) -> Coord<f64> {
        let (min, max) = (bounds.min(), bounds.max());
        match self {
            Side::West => coord! { x: min.x, y: max.y },
            Side::South => min,
            Side::East => coord! { x: max.x, y: min.y },
            Side::North => max,
        }
    }
}

/// Geometry and adjacency of one level's tiles
pub trait TileGrid {
    /// Number of tile rows
    fn nrows(&self) -> u32;

    /// Number of tile columns
    fn ncolumns(&self) -> u32;

    /// Geographic bounding box of a tile
    fn bounds(&self, tile: TileId) -> Rect<f64>;

    /// Total number of tiles
    fn tile_count(&self) -> u64 {
        u64::from(self.nrows()) * u64::from(self.ncolumns())
    }

    /// Whether the id addresses a tile of this grid
    fn contains(&self, tile: TileId) -> bool {
        u64::from(tile) < self.tile_count()
    }

    /// Decompose a tile id into (row, column)
    fn row_col(&self, tile: TileId) -> (u32, u32) {
        (tile / self.ncolumns(), tile % self.ncolumns())
    }

    /// Compose a tile id from (row, column)
    fn tile_id(&self, row: u32, col: u32) -> TileId {
        row * self.ncolumns() + col
    }

    /// Tile across the given side, `None` at the grid edge
    fn neighbor(&self, tile: TileId, side: Side) -> Option<TileId> {
        if !self.contains(tile) {
            return None;
        }
        let (row, col) = self.row_col(tile);
        match side {
            Side::West => (col > 0).then(|| tile - 1),
            Side::South => (row > 0).then(|| tile - self.ncolumns()),
            Side::East => (col + 1 < self.ncolumns()).then(|| tile + 1),
            Side::North => (row + 1 < self.nrows()).then(|| tile + self.ncolumns()),
        }
    }
}

/// Regular grid of square lon/lat tiles covering a bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Tiles {
    bounds: Rect<f64>,
    tile_size: f64,
    nrows: u32,
    ncolumns: u32,
}

impl Tiles {
    /// Create a grid of `tile_size` degree tiles over `bounds`.
    ///
    /// The last row and column are allowed to overhang the bounding box when
    /// its extent is not a multiple of the tile size.
    pub fn new(bounds: Rect<f64>, tile_size: f64) -> Result<Self> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        let nrows = (bounds.height() / tile_size).ceil().max(1.0);
        let ncolumns = (bounds.width() / tile_size).ceil().max(1.0);
        if nrows * ncolumns > f64::from(u32::MAX) {
            return Err(Error::InvalidConfig(format!(
                "{nrows} x {ncolumns} tiles do not fit 32-bit tile ids"
            )));
        }
        Ok(Self {
            bounds,
            tile_size,
            nrows: nrows as u32,
            ncolumns: ncolumns as u32,
        })
    }

    /// Grid covering the whole world (-180,-90 to 180,90)
    pub fn world(tile_size: f64) -> Result<Self> {
        Self::new(
            Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 180.0, y: 90.0 }),
            tile_size,
        )
    }

    /// Tile edge length in degrees
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Area covered by the grid
    pub fn grid_bounds(&self) -> Rect<f64> {
        self.bounds
    }
}

impl TileGrid for Tiles {
    fn nrows(&self) -> u32 {
        self.nrows
    }

    fn ncolumns(&self) -> u32 {
        self.ncolumns
    }

    fn bounds(&self, tile: TileId) -> Rect<f64> {
        let (row, col) = self.row_col(tile);
        let origin = self.bounds.min();
        let min = coord! {
            x: origin.x + f64::from(col) * self.tile_size,
            y: origin.y + f64::from(row) * self.tile_size,
        };
        let max = coord! { x: min.x + self.tile_size, y: min.y + self.tile_size };
        Rect::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x4() -> Tiles {
        // 3 rows, 4 columns of 1 degree tiles
        Tiles::new(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 3.0 }), 1.0).unwrap()
    }

    #[test]
    fn test_world_grid_dimensions() {
        let tiles = Tiles::world(4.0).unwrap();
        assert_eq!(tiles.nrows(), 45);
        assert_eq!(tiles.ncolumns(), 90);

        let local = Tiles::world(0.25).unwrap();
        assert_eq!(local.nrows(), 720);
        assert_eq!(local.ncolumns(), 1440);
        assert_eq!(local.tile_count(), 1_036_800);
    }

    #[test]
    fn test_invalid_tile_size() {
        assert!(matches!(Tiles::world(0.0), Err(Error::InvalidConfig(_))));
        assert!(matches!(Tiles::world(-1.0), Err(Error::InvalidConfig(_))));
        assert!(matches!(Tiles::world(f64::NAN), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_row_col_roundtrip() {
        let tiles = grid_3x4();
        assert_eq!(tiles.row_col(0), (0, 0));
        assert_eq!(tiles.row_col(5), (1, 1));
        assert_eq!(tiles.row_col(11), (2, 3));
        assert_eq!(tiles.tile_id(2, 3), 11);
        assert!(tiles.contains(11));
        assert!(!tiles.contains(12));
    }

    #[test]
    fn test_tile_bounds() {
        let tiles = grid_3x4();
        let bounds = tiles.bounds(6); // row 1, col 2
        assert_eq!(bounds.min(), coord! { x: 2.0, y: 1.0 });
        assert_eq!(bounds.max(), coord! { x: 3.0, y: 2.0 });
    }

    #[test]
    fn test_neighbors_inside_and_at_edges() {
        let tiles = grid_3x4();
        assert_eq!(tiles.neighbor(5, Side::West), Some(4));
        assert_eq!(tiles.neighbor(5, Side::South), Some(1));
        assert_eq!(tiles.neighbor(5, Side::East), Some(6));
        assert_eq!(tiles.neighbor(5, Side::North), Some(9));

        assert_eq!(tiles.neighbor(0, Side::West), None);
        assert_eq!(tiles.neighbor(0, Side::South), None);
        assert_eq!(tiles.neighbor(11, Side::East), None);
        assert_eq!(tiles.neighbor(11, Side::North), None);
        assert_eq!(tiles.neighbor(12, Side::West), None);
    }

    #[test]
    fn test_side_rotation() {
        assert_eq!(Side::West.next(), Side::South);
        assert_eq!(Side::North.next(), Side::West);
        assert_eq!(Side::West.prev(), Side::North);
        assert_eq!(Side::from_index(6), Side::East);
        for side in Side::ALL {
            assert_eq!(side.next().prev(), side);
        }
    }

    #[test]
    fn test_start_corners_walk_counter_clockwise() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let corners: Vec<_> = Side::ALL.iter().map(|s| s.start_corner(&bounds)).collect();
        assert_eq!(
            corners,
            vec![
                coord! { x: 0.0, y: 1.0 },
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 1.0, y: 0.0 },
                coord! { x: 1.0, y: 1.0 },
            ]
        );

        use geo::Winding;
        let mut ring = geo::LineString::from(corners);
        ring.close();
        assert!(ring.is_ccw());
    }
}
