//! Loading rows into the grid
//!
//! CSV/TSV/PSV files and JSON record arrays become a [`Dataset`] of columns
//! and rows; [`generate`] produces large mock datasets in bounded batches.

pub mod delimited;
pub mod generate;
pub mod json;

use std::path::Path;

use crate::error::{GridError, Result};
use crate::model::{Column, RowRef, DEFAULT_COLUMN_WIDTH};

pub use delimited::{columns_from_headers, detect_delimiter, parse_csv, Delimiter};
pub use generate::{generate, mock_columns, mock_row, ChunkedRows, DEFAULT_CHUNK_SIZE};
pub use json::parse_json;

/// Columns plus rows ready for the pipeline
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<RowRef>,
}

impl Dataset {
    /// `count` mock rows with matching columns
    pub fn mock(count: usize) -> Self {
        Self {
            columns: mock_columns(),
            rows: generate(count, DEFAULT_CHUNK_SIZE, mock_row).collect_all(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Give every column still at the built-in default width `width`
    /// instead. Columns sized explicitly keep their width.
    pub fn with_default_width(mut self, width: f32) -> Self {
        if !width.is_finite() || width <= 0.0 {
            return self;
        }
        for column in &mut self.columns {
            if column.width == DEFAULT_COLUMN_WIDTH {
                column.width = width;
            }
        }
        self
    }
}

/// Load a dataset, choosing the format from the file extension.
/// Unknown extensions are sniffed for a delimiter.
pub fn load(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path).map_err(|source| GridError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let dataset = match ext.as_str() {
        "json" => parse_json(&content)?,
        "csv" | "tsv" | "psv" => parse_csv(&content, Delimiter::from_extension(&ext))?,
        _ => parse_csv(&content, detect_delimiter(&content))?,
    };
    tracing::info!(
        path = %path.display(),
        rows = dataset.rows.len(),
        columns = dataset.columns.len(),
        "loaded dataset"
    );
    Ok(dataset)
}
