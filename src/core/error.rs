//! Error types for butterfly-connectivity
//!
//! Provides the error enum shared by tracing, encoding and hierarchy loading.

use thiserror::Error;

use crate::core::grid::TileId;
use crate::core::region::Color;

/// Main error type for butterfly-connectivity operations
#[derive(Debug, Error)]
pub enum Error {
    /// Hierarchy level has no color map or no grid
    #[error("Hierarchy level {0} not found")]
    LevelNotFound(u8),

    /// Region tiles do not form a single 4-connected area
    #[error("Region {color} is not a single connected area ({reached} of {total} tiles reachable)")]
    RegionNotSimplyConnected {
        color: Color,
        reached: usize,
        total: usize,
    },

    /// Tile id does not address a cell of the grid
    #[error("Tile {tile} is outside of a grid with {tiles} tiles")]
    TileOutOfGrid { tile: TileId, tiles: u64 },

    /// Invalid hierarchy configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed precomputed color document
    #[error("Invalid colors: {0}")]
    InvalidColors(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience result type for butterfly-connectivity operations
pub type Result<T> = std::result::Result<T, Error>;
