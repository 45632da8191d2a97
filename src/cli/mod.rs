//! CLI-specific utilities for butterfly-connectivity
//!
//! Output routing and text formatting for the command-line interface,
//! separate from the core library functionality.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use butterfly_connectivity::RegionSummary;

/// Output destination types
#[derive(Debug, PartialEq, Eq)]
pub enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Resolve output destination from the `-o` argument
pub fn resolve_output(output: &str) -> OutputDestination {
    if output == "-" || output.is_empty() {
        OutputDestination::Stdout
    } else {
        OutputDestination::File(PathBuf::from(output))
    }
}

/// Write a finished document, newline terminated
pub fn write_output(destination: &OutputDestination, body: &str) -> Result<()> {
    match destination {
        OutputDestination::File(path) => {
            fs::write(path, format!("{body}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        OutputDestination::Stdout => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{body}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// One line of the `regions` listing
pub fn format_region(summary: &RegionSummary) -> String {
    format!(
        "region {:>10}  tiles {:>7}  vertices {:>6}  holes {:>4}  area {:.4} deg²",
        summary.color, summary.arity, summary.outer_vertices, summary.holes, summary.area
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_stdout() {
        assert_eq!(resolve_output("-"), OutputDestination::Stdout);
        assert_eq!(resolve_output(""), OutputDestination::Stdout);
    }

    #[test]
    fn test_resolve_output_file() {
        assert_eq!(
            resolve_output("level2.geojson"),
            OutputDestination::File(PathBuf::from("level2.geojson"))
        );
    }

    #[test]
    fn test_format_region() {
        let line = format_region(&RegionSummary {
            color: 42,
            arity: 12,
            outer_vertices: 8,
            holes: 1,
            area: 11.0,
        });
        assert!(line.starts_with("region         42"));
        assert!(line.contains("tiles      12"));
        assert!(line.contains("holes    1"));
        assert!(line.ends_with("area 11.0000 deg²"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output(&OutputDestination::File(path.clone()), "{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}\n");
    }
}
