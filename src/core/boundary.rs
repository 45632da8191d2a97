//! Region boundary tracing
//!
//! Turns a set of same-colored tiles into polygon rings by walking the tile
//! sides that separate the region from the rest of the grid:
//!
//! 1. Start on the west side of the lowest numbered tile (always on the outer ring)
//! 2. If the next side of the current tile is also a boundary, turn around the
//!    corner, unless the tile diagonally across that corner is part of the region
//!    (a pinch), in which case continue on that tile and turn back
//! 3. Otherwise step into the neighbor across it and follow the same side there,
//!    or, when that side is interior too, step across it once more and turn back
//! 4. Stop when the starting (tile, side) pair comes around again
//!
//! Boundary sides left over after the outer ring belong to enclosed holes and
//! are traced the same way. Crossing pinches keeps a hole that touches the
//! outer ring, or another hole, at a single corner in a ring of its own.

use std::collections::{BTreeSet, HashSet, VecDeque};

use geo::{Coord, LineString, Polygon};

use crate::core::error::{Error, Result};
use crate::core::grid::{Side, TileGrid, TileId};
use crate::core::region::{Color, Region};

/// Implicitly closed ring of (lon, lat) coordinates, first point not repeated
pub type Ring = Vec<Coord<f64>>;

/// Outline of one region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    /// Counter-clockwise ring around the covered area
    pub outer: Ring,
    /// Enclosed holes, each counter-clockwise around the hole itself
    pub inners: Vec<Ring>,
}

impl Boundary {
    /// Convert to a `geo` polygon with clockwise interiors
    pub fn to_polygon(&self) -> Polygon<f64> {
        let interiors = self
            .inners
            .iter()
            .map(|ring| LineString::from(ring.iter().rev().copied().collect::<Vec<_>>()))
            .collect();
        Polygon::new(LineString::from(self.outer.clone()), interiors)
    }
}

/// Trace the outline of a region.
///
/// The region must be a single 4-connected area inside the grid; holes are
/// allowed and come back as inner rings.
pub fn trace_boundary<G: TileGrid + ?Sized>(region: &Region, grid: &G) -> Result<Boundary> {
    let Some(component) = anchored_component(region, grid)? else {
        return Ok(Boundary::default());
    };
    if component.len() != region.arity() {
        return Err(Error::RegionNotSimplyConnected {
            color: region.color,
            reached: component.len(),
            total: region.arity(),
        });
    }
    trace_tiles(region.color, &component, grid)
}

/// Trace only the connected part of a region that holds its lowest tile.
///
/// Lenient counterpart of [`trace_boundary`] for colorings that split one
/// color over several disjoint areas.
pub fn trace_component<G: TileGrid + ?Sized>(region: &Region, grid: &G) -> Result<Boundary> {
    match anchored_component(region, grid)? {
        Some(component) => trace_tiles(region.color, &component, grid),
        None => Ok(Boundary::default()),
    }
}

/// Validate the tiles and flood the component around the region's lowest tile
fn anchored_component<G: TileGrid + ?Sized>(
    region: &Region,
    grid: &G,
) -> Result<Option<BTreeSet<TileId>>> {
    if let Some(&tile) = region.tiles.iter().find(|&&tile| !grid.contains(tile)) {
        return Err(Error::TileOutOfGrid {
            tile,
            tiles: grid.tile_count(),
        });
    }
    Ok(region
        .min_tile()
        .map(|seed| connected_component(&region.tiles, seed, grid)))
}

/// Tiles reachable from `seed` through shared sides without leaving `tiles`
fn connected_component<G: TileGrid + ?Sized>(
    tiles: &BTreeSet<TileId>,
    seed: TileId,
    grid: &G,
) -> BTreeSet<TileId> {
    let mut component = BTreeSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    while let Some(tile) = queue.pop_front() {
        for side in Side::ALL {
            if let Some(neighbor) = grid.neighbor(tile, side) {
                if tiles.contains(&neighbor) && component.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }
    component
}

fn trace_tiles<G: TileGrid + ?Sized>(
    color: Color,
    tiles: &BTreeSet<TileId>,
    grid: &G,
) -> Result<Boundary> {
    let Some(&start) = tiles.first() else {
        return Ok(Boundary::default());
    };
    let walker = Walker { grid, tiles };
    let mut visited = HashSet::new();
    let stuck = || Error::RegionNotSimplyConnected {
        color,
        reached: tiles.len(),
        total: tiles.len(),
    };

    let outer = walker
        .walk((start, Side::West), &mut visited)
        .map(|edges| corners(&edges))
        .ok_or_else(stuck)?;

    let mut inners = Vec::new();
    for &tile in tiles {
        for side in Side::ALL {
            if walker.is_boundary(tile, side) && !visited.contains(&(tile, side)) {
                let mut ring = walker
                    .walk((tile, side), &mut visited)
                    .map(|edges| corners(&edges))
                    .ok_or_else(stuck)?;
                // Hole walks run clockwise, keep them counter-clockwise around the hole
                ring.reverse();
                ring.rotate_right(1);
                inners.push(ring);
            }
        }
    }

    Ok(Boundary { outer, inners })
}

/// Side-following walker over one set of tiles
struct Walker<'a, G: TileGrid + ?Sized> {
    grid: &'a G,
    tiles: &'a BTreeSet<TileId>,
}

impl<G: TileGrid + ?Sized> Walker<'_, G> {
    /// Neighbor across `side` when it belongs to the traced tiles
    #[inline]
    fn inside(&self, tile: TileId, side: Side) -> Option<TileId> {
        self.grid
            .neighbor(tile, side)
            .filter(|neighbor| self.tiles.contains(neighbor))
    }

    #[inline]
    fn is_boundary(&self, tile: TileId, side: Side) -> bool {
        self.inside(tile, side).is_none()
    }

    /// Region tile touching `tile` only at the end corner of `side`
    #[inline]
    fn pinched(&self, tile: TileId, side: Side) -> Option<TileId> {
        self.grid
            .neighbor(tile, side.next())
            .and_then(|across| self.inside(across, side))
    }

    /// Follow boundary sides from `start` until it comes around again,
    /// returning every side walked with its start corner.
    ///
    /// Returns `None` if the walk would revisit a side, which only happens on
    /// a grid whose neighbor lookup is not symmetric.
    fn walk(
        &self,
        start: (TileId, Side),
        visited: &mut HashSet<(TileId, Side)>,
    ) -> Option<Vec<(Side, Coord<f64>)>> {
        let (mut tile, mut side) = start;
        let mut edges: Vec<(Side, Coord<f64>)> = Vec::new();

        loop {
            if !visited.insert((tile, side)) {
                return None;
            }
            edges.push((side, side.start_corner(&self.grid.bounds(tile))));

            let next = side.next();
            match self.inside(tile, next) {
                None => match self.pinched(tile, side) {
                    // Region continues diagonally, keep the other side out
                    Some(diagonal) => {
                        tile = diagonal;
                        side = side.prev();
                    }
                    // Outer corner of this tile
                    None => side = next,
                },
                Some(across) => match self.inside(across, side) {
                    // Straight on along the neighbor
                    None => tile = across,
                    // Inner corner, continue on the diagonal tile
                    Some(diagonal) => {
                        tile = diagonal;
                        side = side.prev();
                    }
                },
            }

            if (tile, side) == start {
                break;
            }
        }

        Some(edges)
    }
}

/// Keep the coordinates where the walking direction changes
fn corners(edges: &[(Side, Coord<f64>)]) -> Ring {
    let n = edges.len();
    edges
        .iter()
        .enumerate()
        .filter(|&(i, &(side, _))| edges[(i + n - 1) % n].0 != side)
        .map(|(_, &(_, corner))| corner)
        .collect()
}
