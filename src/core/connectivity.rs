//! Per-level connectivity colors and their exports
//!
//! [`ConnectivityMap`] holds one tile -> color map for every hierarchy level,
//! transit included. The maps are built once from the tiles found on disk
//! and a [`ColorSource`]; afterwards the map is read-only and every export is
//! recomputed on request.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use geo::Area;
use log::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::geojson::{to_feature_collection, trace_region, EncoderOptions, FeatureCollection};
use crate::core::grid::{TileGrid, TileId, Tiles};
use crate::core::hierarchy::TileHierarchy;
use crate::core::palette::{Palette, RandomPalette};
use crate::core::raster::to_raster;
use crate::core::region::{arity_order, group_regions, Color, UNCONNECTED};

/// Assigns connectivity colors to the tiles of a level.
///
/// `tiles` arrives holding every discovered tile with color 0; the source
/// overwrites the colors it knows about.
pub trait ColorSource {
    fn color_level(&self, level: u8, tiles: &mut HashMap<TileId, Color>) -> Result<()>;
}

/// Colors read from a JSON document of the form
/// `{ "<level>": { "<tile id>": <color>, ... }, ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecomputedColors {
    levels: HashMap<u8, HashMap<TileId, Color>>,
}

impl PrecomputedColors {
    pub fn new(levels: HashMap<u8, HashMap<TileId, Color>>) -> Self {
        Self { levels }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, Color>> = serde_json::from_reader(reader)?;

        let mut levels = HashMap::with_capacity(raw.len());
        for (level_key, tiles) in raw {
            let level: u8 = level_key
                .parse()
                .map_err(|_| Error::InvalidColors(format!("bad level key '{level_key}'")))?;
            let mut colors = HashMap::with_capacity(tiles.len());
            for (tile_key, color) in tiles {
                let tile: TileId = tile_key.parse().map_err(|_| {
                    Error::InvalidColors(format!("bad tile id '{tile_key}' on level {level}"))
                })?;
                colors.insert(tile, color);
            }
            levels.insert(level, colors);
        }
        Ok(Self { levels })
    }
}

impl ColorSource for PrecomputedColors {
    fn color_level(&self, level: u8, tiles: &mut HashMap<TileId, Color>) -> Result<()> {
        let Some(known) = self.levels.get(&level) else {
            debug!("No precomputed colors for level {level}");
            return Ok(());
        };
        for (tile, color) in tiles.iter_mut() {
            if let Some(&assigned) = known.get(tile) {
                *color = assigned;
            }
        }
        Ok(())
    }
}

/// Shape and size of one region, in draw order
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub color: Color,
    pub arity: usize,
    pub outer_vertices: usize,
    pub holes: usize,
    /// Covered area in square degrees, holes excluded
    pub area: f64,
}

/// Tile colors of every hierarchy level
#[derive(Debug, Clone)]
pub struct ConnectivityMap {
    hierarchy: TileHierarchy,
    colors: BTreeMap<u8, HashMap<TileId, Color>>,
}

impl ConnectivityMap {
    /// Discover and color the tiles of every level.
    ///
    /// A level that fails to load is logged and left empty, the others are
    /// built regardless.
    pub fn new(hierarchy: TileHierarchy, source: &dyn ColorSource) -> Self {
        let mut colors = BTreeMap::new();
        for level in hierarchy.all_levels() {
            let map = match build_level(&hierarchy, level, source) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Could not build connectivity for level {level}: {e}");
                    HashMap::new()
                }
            };
            info!(
                "Level {level}: {} tiles in {} regions",
                map.len(),
                group_regions(&map).len()
            );
            colors.insert(level, map);
        }
        Self { hierarchy, colors }
    }

    /// Wrap already computed per-level maps.
    ///
    /// Tiles outside their level's grid are dropped as in [`ConnectivityMap::new`].
    pub fn from_colors(
        hierarchy: TileHierarchy,
        colors: impl IntoIterator<Item = (u8, HashMap<TileId, Color>)>,
    ) -> Self {
        let colors = colors
            .into_iter()
            .map(|(level, mut map)| {
                if let Some(grid) = hierarchy.grid_for(level) {
                    retain_in_grid(level, &mut map, grid);
                }
                (level, map)
            })
            .collect();
        Self { hierarchy, colors }
    }

    pub fn hierarchy(&self) -> &TileHierarchy {
        &self.hierarchy
    }

    /// Levels holding a color map, ascending
    pub fn levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.colors.keys().copied()
    }

    /// Color of a tile, 0 for unknown levels and tiles
    pub fn get_color(&self, level: u8, tile: TileId) -> Color {
        self.colors
            .get(&level)
            .and_then(|map| map.get(&tile))
            .copied()
            .unwrap_or(UNCONNECTED)
    }

    /// Boundary polygons of every region, colored by the default palette
    pub fn to_vector_document(&self, level: u8) -> Result<FeatureCollection> {
        self.to_vector_document_with(level, &mut RandomPalette::default(), &EncoderOptions::default())
    }

    pub fn to_vector_document_with(
        &self,
        level: u8,
        palette: &mut dyn Palette,
        options: &EncoderOptions,
    ) -> Result<FeatureCollection> {
        let (map, grid) = self.level(level)?;
        let regions = group_regions(map);
        let order = arity_order(&regions);
        debug!("Level {level}: encoding {} regions", order.len());
        to_feature_collection(&regions, &order, grid, palette, options)
    }

    /// The vector document as GeoJSON text
    pub fn to_geojson(&self, level: u8) -> Result<String> {
        Ok(serde_json::to_string(&self.to_vector_document(level)?)?)
    }

    /// Row-major colors of every cell of the level's grid
    pub fn to_raster(&self, level: u8) -> Result<Vec<Color>> {
        let (map, grid) = self.level(level)?;
        Ok(to_raster(map, grid))
    }

    /// Region statistics in draw order
    pub fn summarize(&self, level: u8) -> Result<Vec<RegionSummary>> {
        let (map, grid) = self.level(level)?;
        let regions = group_regions(map);
        arity_order(&regions)
            .into_iter()
            .filter_map(|(arity, color)| regions.get(&color).map(|region| (arity, region)))
            .map(|(arity, region)| -> Result<RegionSummary> {
                let boundary = trace_region(region, grid, false)?;
                Ok(RegionSummary {
                    color: region.color,
                    arity,
                    outer_vertices: boundary.outer.len(),
                    holes: boundary.inners.len(),
                    area: boundary.to_polygon().unsigned_area(),
                })
            })
            .collect()
    }

    fn level(&self, level: u8) -> Result<(&HashMap<TileId, Color>, &Tiles)> {
        let map = self.colors.get(&level).ok_or(Error::LevelNotFound(level))?;
        let grid = self
            .hierarchy
            .grid_for(level)
            .ok_or(Error::LevelNotFound(level))?;
        Ok((map, grid))
    }
}

fn build_level(
    hierarchy: &TileHierarchy,
    level: u8,
    source: &dyn ColorSource,
) -> Result<HashMap<TileId, Color>> {
    let grid = hierarchy.grid_for(level).ok_or(Error::LevelNotFound(level))?;
    let mut map: HashMap<TileId, Color> = hierarchy
        .discover_tiles(level)?
        .into_iter()
        .map(|tile| (tile, UNCONNECTED))
        .collect();

    source.color_level(level, &mut map)?;
    retain_in_grid(level, &mut map, grid);
    Ok(map)
}

fn retain_in_grid(level: u8, map: &mut HashMap<TileId, Color>, grid: &Tiles) {
    let before = map.len();
    map.retain(|&tile, _| grid.contains(tile));
    if map.len() < before {
        warn!(
            "Level {level}: dropped {} colored tiles outside of the grid",
            before - map.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hierarchy::{BoundsConfig, HierarchyConfig, LevelConfig};

    /// 3 x 4 grid of 1 degree tiles on level 0, transit level 1
    fn small_hierarchy() -> TileHierarchy {
        let config = HierarchyConfig {
            tile_dir: "unused".into(),
            bounds: BoundsConfig {
                min_lon: 0.0,
                min_lat: 0.0,
                max_lon: 4.0,
                max_lat: 3.0,
            },
            levels: vec![LevelConfig {
                level: 0,
                name: "only".to_string(),
                tile_size: 1.0,
            }],
        };
        TileHierarchy::from_config(&config).unwrap()
    }

    fn sample_map() -> ConnectivityMap {
        // Row 0 is color 1, tiles 4 and 5 color 2, the rest unconnected
        let mut level0: HashMap<TileId, Color> = (0..12).map(|t| (t, 0)).collect();
        for tile in 0..4 {
            level0.insert(tile, 1);
        }
        level0.insert(4, 2);
        level0.insert(5, 2);
        ConnectivityMap::from_colors(small_hierarchy(), [(0, level0), (1, HashMap::new())])
    }

    #[test]
    fn test_get_color() {
        let map = sample_map();
        assert_eq!(map.get_color(0, 2), 1);
        assert_eq!(map.get_color(0, 5), 2);
        assert_eq!(map.get_color(0, 11), 0);
        assert_eq!(map.get_color(0, 99), 0);
        assert_eq!(map.get_color(7, 0), 0);
    }

    #[test]
    fn test_vector_document_one_feature_per_color() {
        let map = sample_map();
        let doc = map.to_vector_document(0).unwrap();
        assert_eq!(doc.features.len(), 3);
        let ids: Vec<Color> = doc.features.iter().map(|f| f.properties.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_tiles_outside_grid_are_dropped() {
        let level0 = HashMap::from([(0, 4), (1, 4), (12, 4), (500, 9)]);
        let map = ConnectivityMap::from_colors(small_hierarchy(), [(0, level0)]);

        assert_eq!(map.get_color(0, 1), 4);
        assert_eq!(map.get_color(0, 12), 0);
        assert_eq!(map.get_color(0, 500), 0);

        let doc = map.to_vector_document(0).unwrap();
        assert_eq!(doc.features.len(), 1);
        assert_eq!(doc.features[0].properties.id, 4);
        assert_eq!(
            map.to_raster(0).unwrap(),
            vec![4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(map.summarize(0).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_level_errors() {
        let map = sample_map();
        assert!(matches!(map.to_vector_document(5), Err(Error::LevelNotFound(5))));
        assert!(matches!(map.to_raster(5), Err(Error::LevelNotFound(5))));
        assert!(matches!(map.summarize(5), Err(Error::LevelNotFound(5))));
    }

    #[test]
    fn test_empty_transit_level() {
        let map = sample_map();
        assert!(map.to_vector_document(1).unwrap().features.is_empty());
        assert_eq!(map.to_raster(1).unwrap(), vec![0; 12]);
    }

    #[test]
    fn test_raster() {
        let map = sample_map();
        assert_eq!(
            map.to_raster(0).unwrap(),
            vec![1, 1, 1, 1, 2, 2, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_summarize() {
        let map = sample_map();
        let summary = map.summarize(0).unwrap();
        assert_eq!(summary.len(), 3);

        assert_eq!(summary[0].color, 0);
        assert_eq!(summary[0].arity, 6);
        assert_eq!(summary[0].outer_vertices, 6);
        assert_eq!(summary[0].area, 6.0);

        assert_eq!(summary[1].color, 1);
        assert_eq!(summary[1].outer_vertices, 4);
        assert_eq!(summary[1].holes, 0);
        assert_eq!(summary[1].area, 4.0);

        assert_eq!(summary[2].color, 2);
        assert_eq!(summary[2].area, 2.0);
    }

    #[test]
    fn test_to_geojson_parses() {
        let map = sample_map();
        let text = map.to_geojson(0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_precomputed_colors_parse() {
        let colors =
            PrecomputedColors::from_json_str(r#"{ "0": { "1": 5, "2": 5 }, "3": { "7": 1 } }"#)
                .unwrap();
        let mut tiles = HashMap::from([(1, 0), (2, 0), (3, 0)]);
        colors.color_level(0, &mut tiles).unwrap();
        assert_eq!(tiles, HashMap::from([(1, 5), (2, 5), (3, 0)]));

        let mut untouched = HashMap::from([(1, 0)]);
        colors.color_level(1, &mut untouched).unwrap();
        assert_eq!(untouched, HashMap::from([(1, 0)]));
    }

    #[test]
    fn test_precomputed_colors_ignore_undiscovered_tiles() {
        let colors = PrecomputedColors::from_json_str(r#"{ "0": { "1": 5, "9": 6 } }"#).unwrap();
        let mut tiles = HashMap::from([(1, 0)]);
        colors.color_level(0, &mut tiles).unwrap();
        assert_eq!(tiles, HashMap::from([(1, 5)]));
    }

    #[test]
    fn test_precomputed_colors_rejects_bad_keys() {
        assert!(matches!(
            PrecomputedColors::from_json_str(r#"{ "x": {} }"#),
            Err(Error::InvalidColors(_))
        ));
        assert!(matches!(
            PrecomputedColors::from_json_str(r#"{ "0": { "-1": 3 } }"#),
            Err(Error::InvalidColors(_))
        ));
        assert!(matches!(
            PrecomputedColors::from_json_str("[1, 2]"),
            Err(Error::Json(_))
        ));
    }
}
