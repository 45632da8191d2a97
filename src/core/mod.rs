//! Core library modules for butterfly-connectivity
//!
//! Leaves first: the grid and region model, the boundary tracer, the
//! encoders, and the per-level connectivity map built on top of them.

pub mod boundary;
pub mod connectivity;
pub mod error;
pub mod geojson;
pub mod grid;
pub mod hierarchy;
pub mod palette;
pub mod raster;
pub mod region;

// Re-export main types for internal use
pub use connectivity::{ColorSource, ConnectivityMap, PrecomputedColors, RegionSummary};
pub use hierarchy::{HierarchyConfig, TileHierarchy};
