//! Error types for calendar-heatmap-core

use thiserror::Error;

/// Main error type for the calendar-heatmap-core library
///
/// The heatmap component itself never fails; these errors come from the
/// edges where input is parsed (config files, datasets, color strings).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Color string is not a `#rgb` / `#rrggbb` hex color
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Overview name is not one of global, year, month, week, day
    #[error("unknown overview: {0}")]
    UnknownOverview(String),
}

/// Result type alias for calendar-heatmap-core
pub type Result<T> = std::result::Result<T, Error>;
