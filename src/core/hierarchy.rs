//! Tile hierarchy definition and on-disk tile discovery
//!
//! Every hierarchy level is a full regular grid over the same bounds with
//! its own tile size. Tiles of a level are stored below
//! `<tile_dir>/<level>/` with the tile id spread over nested directories,
//! e.g. `2/000/818/660.gph` for tile 818660 of level 2.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geo::{coord, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::grid::{TileGrid, TileId, Tiles};

/// One level of the hierarchy as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u8,
    pub name: String,
    /// Tile edge length in degrees
    pub tile_size: f64,
}

/// Lon/lat extent covered by every level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
        }
    }
}

impl BoundsConfig {
    fn to_rect(self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }
}

/// Hierarchy configuration, usually loaded from TOML:
///
/// ```toml
/// tile_dir = "/data/tiles"
///
/// [[levels]]
/// level = 0
/// name = "highway"
/// tile_size = 4.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub tile_dir: PathBuf,
    pub bounds: BoundsConfig,
    pub levels: Vec<LevelConfig>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        let level = |level: u8, name: &str, tile_size: f64| LevelConfig {
            level,
            name: name.to_string(),
            tile_size,
        };
        Self {
            tile_dir: PathBuf::from("tiles"),
            bounds: BoundsConfig::default(),
            levels: vec![
                level(0, "highway", 4.0),
                level(1, "arterial", 1.0),
                level(2, "local", 0.25),
            ],
        }
    }
}

impl HierarchyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// A validated hierarchy level with its grid
#[derive(Debug, Clone)]
pub struct TileLevel {
    pub level: u8,
    pub name: String,
    pub tiles: Tiles,
}

/// The validated level set plus the derived transit level
#[derive(Debug, Clone)]
pub struct TileHierarchy {
    tile_dir: PathBuf,
    levels: Vec<TileLevel>,
}

impl TileHierarchy {
    /// Validate the configuration and build one grid per level.
    ///
    /// Levels must be non-empty and unique, and tile sizes positive.
    pub fn from_config(config: &HierarchyConfig) -> Result<Self> {
        if config.levels.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one hierarchy level is required".to_string(),
            ));
        }

        let bounds = config.bounds.to_rect();
        let mut seen = BTreeSet::new();
        let mut levels = Vec::with_capacity(config.levels.len());
        for level in &config.levels {
            if !seen.insert(level.level) {
                return Err(Error::InvalidConfig(format!(
                    "level {} is defined more than once",
                    level.level
                )));
            }
            if level.level == u8::MAX {
                return Err(Error::InvalidConfig(format!(
                    "level {} leaves no room for the transit level",
                    level.level
                )));
            }
            let tiles = Tiles::new(bounds, level.tile_size).map_err(|e| match e {
                Error::InvalidConfig(msg) => {
                    Error::InvalidConfig(format!("level {} ({}): {msg}", level.level, level.name))
                }
                other => other,
            })?;
            levels.push(TileLevel {
                level: level.level,
                name: level.name.clone(),
                tiles,
            });
        }
        levels.sort_by_key(|l| l.level);

        Ok(Self {
            tile_dir: config.tile_dir.clone(),
            levels,
        })
    }

    pub fn tile_dir(&self) -> &Path {
        &self.tile_dir
    }

    /// Defined levels in ascending order, transit excluded
    pub fn levels(&self) -> &[TileLevel] {
        &self.levels
    }

    /// One above the highest defined level
    pub fn transit_level(&self) -> u8 {
        self.levels.last().map_or(0, |l| l.level + 1)
    }

    /// Every level a connectivity map is built for, transit included
    pub fn all_levels(&self) -> Vec<u8> {
        let mut all: Vec<u8> = self.levels.iter().map(|l| l.level).collect();
        all.push(self.transit_level());
        all
    }

    /// Grid of a level; the transit level shares the highest level's grid
    pub fn grid_for(&self, level: u8) -> Option<&Tiles> {
        if level == self.transit_level() {
            return self.levels.last().map(|l| &l.tiles);
        }
        self.levels
            .iter()
            .find(|l| l.level == level)
            .map(|l| &l.tiles)
    }

    /// Directory holding the tiles of a level
    pub fn level_dir(&self, level: u8) -> PathBuf {
        self.tile_dir.join(level.to_string())
    }

    /// List the tile ids stored on disk for a level.
    ///
    /// A missing level directory yields no tiles. Files whose path does not
    /// spell a tile id are skipped.
    pub fn discover_tiles(&self, level: u8) -> Result<BTreeSet<TileId>> {
        let root = self.level_dir(level);
        let mut tiles = BTreeSet::new();
        if !root.is_dir() {
            debug!("No tile directory for level {level} at {}", root.display());
            return Ok(tiles);
        }

        let mut files = Vec::new();
        collect_files(&root, &mut files)?;
        for path in files {
            match tile_id_from_path(&root, &path) {
                Some(id) => {
                    tiles.insert(id);
                }
                None => debug!("Skipping {}: not a tile file", path.display()),
            }
        }

        if let Some(grid) = self.grid_for(level) {
            let before = tiles.len();
            tiles.retain(|&tile| grid.contains(tile));
            let dropped = before - tiles.len();
            if dropped > 0 {
                warn!(
                    "Level {level}: dropped {dropped} tiles outside of the {}x{} grid",
                    grid.nrows(),
                    grid.ncolumns()
                );
            }
        }

        debug!("Level {level}: discovered {} tiles", tiles.len());
        Ok(tiles)
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Tile id spelled by the path of a tile file below its level directory.
///
/// The digits of every component are concatenated, the extension of the
/// file name dropped: `000/818/660.gph` is tile 818660.
pub fn tile_id_from_path(level_dir: &Path, path: &Path) -> Option<TileId> {
    let relative = path.strip_prefix(level_dir).ok()?;
    let mut components: Vec<&str> = relative
        .iter()
        .map(|c| c.to_str())
        .collect::<Option<_>>()?;

    let file_name = components.pop()?;
    let stem = file_name.split('.').next()?;
    components.push(stem);

    let digits: String = components.concat();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
