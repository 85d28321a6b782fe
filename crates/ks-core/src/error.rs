//! Error types for ks-core

use thiserror::Error;

/// Core error type for kpisync
#[derive(Error, Debug)]
pub enum CoreError {
    /// K001: Configuration file not found
    #[error("[K001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// K002: Invalid configuration value
    #[error("[K002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// K003: The destination spreadsheet has no usable sheets
    #[error("[K003] No destination sheet available: the spreadsheet reported no sheets")]
    NoDestinationAvailable,

    /// K004: IO error
    #[error("[K004] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// K005: IO error with file path context
    #[error("[K005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// K006: YAML parse error
    #[error("[K006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
