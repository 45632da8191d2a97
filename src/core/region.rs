//! Region grouping
//!
//! Inverts a level's tile -> color map into color -> tiles and orders the
//! resulting regions for drawing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::grid::TileId;

/// Connectivity component identifier assigned by the color source
pub type Color = u64;

/// Color of tiles that belong to no component
pub const UNCONNECTED: Color = 0;

/// All tiles of one level sharing a color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub color: Color,
    pub tiles: BTreeSet<TileId>,
}

impl Region {
    pub fn new(color: Color, tiles: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            color,
            tiles: tiles.into_iter().collect(),
        }
    }

    /// Number of tiles in the region
    pub fn arity(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    /// Lowest tile id, the anchor of the outer boundary walk
    pub fn min_tile(&self) -> Option<TileId> {
        self.tiles.first().copied()
    }
}

/// Group tiles by color.
///
/// Every tile of the map ends up in exactly one region, color 0 included.
pub fn group_regions(colors: &HashMap<TileId, Color>) -> BTreeMap<Color, Region> {
    let mut regions: BTreeMap<Color, Region> = BTreeMap::new();
    for (&tile, &color) in colors {
        regions
            .entry(color)
            .or_insert_with(|| Region {
                color,
                tiles: BTreeSet::new(),
            })
            .tiles
            .insert(tile);
    }
    regions
}

/// Draw order of regions as (arity, color) pairs.
///
/// Largest regions come first so that renderers drawing in document order
/// stack smaller regions on top. Equal arities are ordered by ascending color.
pub fn arity_order(regions: &BTreeMap<Color, Region>) -> Vec<(usize, Color)> {
    let mut order: Vec<(usize, Color)> = regions
        .values()
        .map(|region| (region.arity(), region.color))
        .collect();
    order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    order
}
