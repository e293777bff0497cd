//! Custom error types for paperharvest.
//!
//! Library code returns `Result<T, HarvestError>`; the extraction tiers absorb
//! their own failures and only the record store and run controller surface
//! errors to the caller.

use thiserror::Error;

/// Main error type for paperharvest operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML or selector parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Remote endpoint returned a non-success status
    #[error("HTTP status {code} from {url}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Request URL
        url: String,
    },

    /// Tabular record store error
    #[error("Record store error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `HarvestError`
pub type Result<T> = std::result::Result<T, HarvestError>;
