//! # Butterfly-connectivity Library
//!
//! Renders the connectivity coloring of a routing tile hierarchy for
//! inspection. Every tile of a hierarchy level carries a color naming the
//! connected component it belongs to; this library turns those colors into
//! GeoJSON region outlines or a flat raster of color ids.
//!
//! ## Features
//!
//! - **Boundary tracing**: one outline per region, corner vertices only, holes included
//! - **Draw order**: largest regions first so small islands stay visible
//! - **Fault isolation**: a level that fails to load stays empty, the others still work
//! - **Pluggable coloring**: bring your own [`ColorSource`] or [`Palette`]
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use butterfly_connectivity::{ConnectivityMap, HierarchyConfig, PrecomputedColors, TileHierarchy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HierarchyConfig::load(Path::new("hierarchy.toml"))?;
//!     let hierarchy = TileHierarchy::from_config(&config)?;
//!     let colors = PrecomputedColors::load(Path::new("colors.json"))?;
//!
//!     let map = ConnectivityMap::new(hierarchy, &colors);
//!     println!("tile 818660 has color {}", map.get_color(2, 818660));
//!
//!     let geojson = map.to_geojson(2)?;
//!     std::fs::write("level2.geojson", geojson)?;
//!     Ok(())
//! }
//! ```

// Re-export core types that users might need
pub use crate::core::boundary::{trace_boundary, trace_component, Boundary, Ring};
pub use crate::core::connectivity::{ColorSource, ConnectivityMap, PrecomputedColors, RegionSummary};
pub use crate::core::error::{Error, Result};
pub use crate::core::geojson::{to_feature_collection, EncoderOptions, Feature, FeatureCollection};
pub use crate::core::grid::{Side, TileGrid, TileId, Tiles};
pub use crate::core::hierarchy::{BoundsConfig, HierarchyConfig, LevelConfig, TileHierarchy};
pub use crate::core::palette::{DisplayColor, HashPalette, Palette, RandomPalette};
pub use crate::core::raster::{to_raster, ColorRaster};
pub use crate::core::region::{arity_order, group_regions, Color, Region, UNCONNECTED};

pub mod core;
