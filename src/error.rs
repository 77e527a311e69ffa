//! Library error type
//!
//! Rendering never fails through this type: paint paths degrade to no-ops.
//! Errors are reserved for programmer mistakes caught at registration time
//! and for loading external resources (themes, fonts, datasets).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    /// The grid instance was destroyed; listeners can no longer be attached
    #[error("grid instance has been destroyed")]
    Destroyed,

    #[error("invalid color format: {0}")]
    InvalidColor(String),

    #[error("unknown theme id: {0}")]
    UnknownTheme(String),

    #[error("theme parse error: {0}")]
    ThemeParse(#[from] serde_yaml::Error),

    #[error("failed to load font: {0}")]
    Font(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported dataset: {0}")]
    Dataset(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
