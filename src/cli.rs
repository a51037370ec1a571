//! Command-line interface parsing and validation
//!
//! This module handles CLI argument parsing using clap and validates
//! user inputs for correctness.

use crate::constants::DEFAULT_PX_PER_CELL;
use clap::Parser;

/// Largest accepted cell-to-pixel scale
pub const MAX_PX_PER_CELL: u32 = 64;

#[derive(Parser, Debug)]
#[command(name = "ridepage")]
#[command(version = "0.0.1")]
#[command(about = "Preview the bike rental page behavior in your terminal", long_about = None)]
pub struct Cli {
    /// Path to the page HTML
    pub page: String,

    /// Load page behavior settings from this JSON file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Pixels per terminal cell, for the page's pixel breakpoints (1-64)
    #[arg(short = 'p', long, value_name = "PX", default_value_t = DEFAULT_PX_PER_CELL)]
    pub px_per_cell: u32,
}

impl Cli {
    /// Validate CLI arguments
    /// Returns error if px_per_cell is out of bounds (1-64)
    pub fn validate(&self) -> Result<(), String> {
        if self.px_per_cell == 0 {
            return Err("Pixels per cell must be at least 1".to_string());
        }
        if self.px_per_cell > MAX_PX_PER_CELL {
            return Err(format!(
                "Pixels per cell too large (maximum {})",
                MAX_PX_PER_CELL
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ridepage", "index.html"]);
        assert_eq!(cli.page, "index.html");
        assert_eq!(cli.px_per_cell, DEFAULT_PX_PER_CELL);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_px_per_cell_bounds() {
        let cli = Cli::parse_from(["ridepage", "index.html", "-p", "0"]);
        assert!(cli.validate().is_err());
        let cli = Cli::parse_from(["ridepage", "index.html", "--px-per-cell", "65"]);
        assert!(cli.validate().is_err());
    }
}
