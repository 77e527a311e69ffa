//! Command-line argument parsing for the grid viewer
//!
//! Supports:
//! - Opening a CSV/TSV/JSON file, or generating mock rows
//! - Theme and font overrides
//! - Initial window size, striping, tree mode and pagination

use clap::Parser;
use std::path::PathBuf;

use crate::config::GridConfig;

/// Default number of mock rows when no file is given
pub const DEFAULT_MOCK_ROWS: usize = 100_000;

/// A virtualized data-grid viewer
#[derive(Parser, Debug)]
#[command(name = "gridcanvas", version, about = "A virtualized data-grid viewer")]
pub struct CliArgs {
    /// CSV, TSV, PSV or JSON file to open
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Generate N mock rows instead of opening a file
    #[arg(long, value_name = "N", conflicts_with = "file")]
    pub mock: Option<usize>,

    /// Theme id (overrides the config file)
    #[arg(short, long)]
    pub theme: Option<String>,

    /// TTF/OTF font file used for text
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Disable row striping
    #[arg(long)]
    pub no_stripes: bool,

    /// Show nested `children` rows as an indented tree
    #[arg(long)]
    pub tree: bool,

    /// Paginate with N rows per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1024.0)]
    pub width: f32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f32,
}

/// Where rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File(PathBuf),
    Mock(usize),
}

/// Configuration derived from CLI arguments and the config file
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub source: DataSource,
    pub theme: String,
    pub font: Option<PathBuf>,
    pub striped: bool,
    pub tree: bool,
    pub page_size: Option<usize>,
    pub width: f32,
    pub height: f32,
}

impl CliArgs {
    /// Merge parsed CLI args over the persisted config
    pub fn into_config(self, config: &GridConfig) -> Result<StartupConfig, String> {
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0) {
            return Err(format!("Invalid window size {}x{}", self.width, self.height));
        }
        if self.page_size == Some(0) {
            return Err("Page size must be greater than zero".to_string());
        }

        let source = match (self.file, self.mock) {
            (Some(path), _) => DataSource::File(path),
            (None, Some(n)) => DataSource::Mock(n),
            (None, None) => DataSource::Mock(DEFAULT_MOCK_ROWS),
        };

        Ok(StartupConfig {
            source,
            theme: self.theme.unwrap_or_else(|| config.theme.clone()),
            font: self.font,
            striped: config.striped && !self.no_stripes,
            tree: self.tree,
            page_size: self.page_size,
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            file: None,
            mock: None,
            theme: None,
            font: None,
            no_stripes: false,
            tree: false,
            page_size: None,
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_no_file_gives_mock_rows() {
        let config = args().into_config(&GridConfig::default()).unwrap();
        assert_eq!(config.source, DataSource::Mock(DEFAULT_MOCK_ROWS));
    }

    #[test]
    fn test_file_source() {
        let config = CliArgs {
            file: Some(PathBuf::from("data.csv")),
            ..args()
        }
        .into_config(&GridConfig::default())
        .unwrap();
        assert_eq!(config.source, DataSource::File(PathBuf::from("data.csv")));
    }

    #[test]
    fn test_theme_flag_overrides_config() {
        let base = GridConfig::default();
        assert_eq!(args().into_config(&base).unwrap().theme, base.theme);

        let config = CliArgs {
            theme: Some("default-dark".into()),
            ..args()
        }
        .into_config(&base)
        .unwrap();
        assert_eq!(config.theme, "default-dark");
    }

    #[test]
    fn test_no_stripes() {
        let config = CliArgs {
            no_stripes: true,
            ..args()
        }
        .into_config(&GridConfig::default())
        .unwrap();
        assert!(!config.striped);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let bad = CliArgs {
            width: 0.0,
            ..args()
        };
        assert!(bad.into_config(&GridConfig::default()).is_err());

        let bad = CliArgs {
            page_size: Some(0),
            ..args()
        };
        assert!(bad.into_config(&GridConfig::default()).is_err());
    }
}
