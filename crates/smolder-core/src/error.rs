//! Error types for smoke-run operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Unknown check type: {0}")]
    UnknownCheckType(String),

    #[error("Invalid check URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for smoke-run operations
pub type Result<T> = std::result::Result<T, SmokeError>;
