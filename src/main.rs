//! # Butterfly-connectivity CLI
//!
//! Command-line interface for the butterfly-connectivity library.
//! Exports the connectivity coloring of a tile hierarchy level as GeoJSON
//! outlines, a color raster, or a region listing.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use butterfly_connectivity::{
    ColorRaster, ConnectivityMap, EncoderOptions, HierarchyConfig, PrecomputedColors,
    RandomPalette, TileGrid, TileHierarchy, TileId,
};
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

mod cli;

/// Command-line interface for butterfly-connectivity
#[derive(Parser)]
#[command(name = "butterfly-connectivity")]
#[command(about = "Inspect the connectivity coloring of a routing tile hierarchy")]
#[command(long_about = "Renders per-tile connectivity colors for inspection:
  butterfly-connectivity --colors colors.json geojson --level 2 -o level2.geojson
  butterfly-connectivity --colors colors.json raster --level 0
  butterfly-connectivity --colors colors.json color --level 2 --tile 818660
  butterfly-connectivity --colors colors.json regions --level 1

Tiles are discovered below <tile-dir>/<level>/. Levels and tile sizes come
from --config (TOML) or default to highway 4°, arterial 1°, local 0.25°.")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hierarchy configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tile directory, overrides the one from the configuration
    #[arg(long, global = true)]
    tile_dir: Option<PathBuf>,

    /// Precomputed colors (JSON: {"<level>": {"<tile id>": <color>}})
    #[arg(long, global = true)]
    colors: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the region outlines of a level as GeoJSON
    Geojson {
        #[arg(short, long)]
        level: u8,
        /// Output file path, or "-" for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
        /// Seed of the fill color generator
        #[arg(long)]
        seed: Option<u64>,
        /// Fail on regions split over several areas
        #[arg(long)]
        strict: bool,
        /// Decimal digits kept in coordinates (0-15)
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=15))]
        precision: u32,
    },
    /// Write the row-major color raster of a level as JSON
    Raster {
        #[arg(short, long)]
        level: u8,
        /// Output file path, or "-" for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    /// Print the color of one tile
    Color {
        #[arg(short, long)]
        level: u8,
        #[arg(short, long)]
        tile: TileId,
    },
    /// List the regions of a level, largest first
    Regions {
        #[arg(short, long)]
        level: u8,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    if let Err(e) = run(cli) {
        error!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Butterfly-connectivity v{} starting", env!("BUTTERFLY_VERSION"));

    let map = load_map(&cli)?;

    match cli.command {
        Commands::Geojson {
            level,
            output,
            seed,
            strict,
            precision,
        } => {
            let mut palette = seed.map_or_else(RandomPalette::default, RandomPalette::with_seed);
            let options = EncoderOptions { precision, strict };
            let document = map
                .to_vector_document_with(level, &mut palette, &options)
                .with_context(|| format!("Failed to render level {level}"))?;
            let body = serde_json::to_string(&document)?;
            cli::write_output(&cli::resolve_output(&output), &body)?;
        }
        Commands::Raster { level, output } => {
            let cells = map
                .to_raster(level)
                .with_context(|| format!("Failed to rasterize level {level}"))?;
            let grid = map
                .hierarchy()
                .grid_for(level)
                .with_context(|| format!("No grid for level {level}"))?;
            let raster = ColorRaster {
                level,
                rows: grid.nrows(),
                columns: grid.ncolumns(),
                cells,
            };
            let body = serde_json::to_string(&raster)?;
            cli::write_output(&cli::resolve_output(&output), &body)?;
        }
        Commands::Color { level, tile } => {
            println!("{}", map.get_color(level, tile));
        }
        Commands::Regions { level } => {
            let summaries = map
                .summarize(level)
                .with_context(|| format!("Failed to summarize level {level}"))?;
            for summary in &summaries {
                println!("{}", cli::format_region(summary));
            }
        }
    }

    Ok(())
}

/// Build the connectivity map from the hierarchy config and color file
fn load_map(cli: &Cli) -> Result<ConnectivityMap> {
    let mut config = match &cli.config {
        Some(path) => HierarchyConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HierarchyConfig::default(),
    };
    if let Some(tile_dir) = &cli.tile_dir {
        config.tile_dir = tile_dir.clone();
    }
    let hierarchy = TileHierarchy::from_config(&config).context("Invalid tile hierarchy")?;

    let Some(colors_path) = &cli.colors else {
        bail!("--colors <FILE> is required");
    };
    let colors = PrecomputedColors::load(colors_path)
        .with_context(|| format!("Failed to load colors {}", colors_path.display()))?;

    Ok(ConnectivityMap::new(hierarchy, &colors))
}
