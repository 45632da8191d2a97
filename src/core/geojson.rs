//! GeoJSON export of region boundaries
//!
//! Builds one `Polygon` feature per region, largest regions first, so a
//! renderer drawing in document order keeps small regions visible on top.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::boundary::{trace_boundary, trace_component, Boundary, Ring};
use crate::core::error::{Error, Result};
use crate::core::grid::TileGrid;
use crate::core::palette::{DisplayColor, Palette};
use crate::core::region::{Color, Region};

/// A `[lon, lat]` position
pub type Position = [f64; 2];

/// Options for the vector encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// Decimal digits kept in coordinates
    pub precision: u32,
    /// Fail on regions that are not a single connected area instead of
    /// tracing the part holding their lowest tile
    pub strict: bool,
}

impl EncoderOptions {
    /// Finest precision an `f64` degree value still carries
    pub const MAX_PRECISION: u32 = 15;

    pub fn validate(&self) -> Result<()> {
        if self.precision > Self::MAX_PRECISION {
            return Err(Error::InvalidConfig(format!(
                "precision must be at most {} digits, got {}",
                Self::MAX_PRECISION,
                self.precision
            )));
        }
        Ok(())
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            strict: false,
        }
    }
}

/// Top level GeoJSON document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Outer ring first, then holes
    Polygon { coordinates: Vec<Vec<Position>> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Properties {
    #[serde(rename = "fillColor")]
    pub fill_color: DisplayColor,
    pub id: Color,
}

impl Feature {
    /// Feature for one traced region.
    ///
    /// The outer ring is listed as traced, inner rings are listed reversed.
    /// `precision` is capped at [`EncoderOptions::MAX_PRECISION`].
    pub fn from_boundary(
        color: Color,
        fill_color: DisplayColor,
        boundary: &Boundary,
        precision: u32,
    ) -> Self {
        let scale = 10f64.powi(precision.min(EncoderOptions::MAX_PRECISION) as i32);
        let position = |c: &geo::Coord<f64>| [round(c.x, scale), round(c.y, scale)];
        let forward = |ring: &Ring| ring.iter().map(position).collect::<Vec<_>>();
        let backward = |ring: &Ring| ring.iter().rev().map(position).collect::<Vec<_>>();

        let mut coordinates = Vec::with_capacity(1 + boundary.inners.len());
        coordinates.push(forward(&boundary.outer));
        coordinates.extend(boundary.inners.iter().map(backward));

        Self {
            geometry: Geometry::Polygon { coordinates },
            properties: Properties {
                fill_color,
                id: color,
            },
        }
    }
}

#[inline]
fn round(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

/// Trace every region in `order` and assemble the feature collection
pub fn to_feature_collection<G: TileGrid + ?Sized>(
    regions: &BTreeMap<Color, Region>,
    order: &[(usize, Color)],
    grid: &G,
    palette: &mut dyn Palette,
    options: &EncoderOptions,
) -> Result<FeatureCollection> {
    options.validate()?;
    let mut features = Vec::with_capacity(order.len());
    for &(arity, color) in order {
        let Some(region) = regions.get(&color) else {
            continue;
        };
        let boundary = trace_region(region, grid, options.strict)?;
        debug!(
            "Region {color}: {arity} tiles, {} outer vertices, {} holes",
            boundary.outer.len(),
            boundary.inners.len()
        );
        features.push(Feature::from_boundary(
            color,
            palette.color_for(region),
            &boundary,
            options.precision,
        ));
    }
    Ok(FeatureCollection { features })
}

/// Trace a region, falling back to its anchored component unless strict
pub(crate) fn trace_region<G: TileGrid + ?Sized>(
    region: &Region,
    grid: &G,
    strict: bool,
) -> Result<Boundary> {
    match trace_boundary(region, grid) {
        Err(Error::RegionNotSimplyConnected { reached, total, .. }) if !strict => {
            warn!(
                "Region {} is split over several areas ({reached} of {total} tiles connected to tile {}), tracing that area only",
                region.color,
                region.min_tile().unwrap_or_default()
            );
            trace_component(region, grid)
        }
        traced => traced,
    }
}
