//! Error types.

use thiserror::Error;

/// Configuration and integration errors.
///
/// These indicate a programming or integration mistake rather than bad runtime
/// data, so callers are expected to surface them immediately.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HempError {
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),
    #[error("Unknown shape: {0}")]
    UnknownShape(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid object: {0}")]
    InvalidObject(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for fallible scene operations.
pub type Result<T> = std::result::Result<T, HempError>;

/// Failure to load an external resource.
///
/// Resource errors are recovered locally: the object carries the message and
/// renders a placeholder instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },
    #[error("Failed to decode image {url}: {reason}")]
    ImageDecode { url: String, reason: String },
    #[error("Failed to load font {family}: {reason}")]
    FontLoad { family: String, reason: String },
    #[error("Font {family} not available after {waited_ms}ms")]
    FontTimeout { family: String, waited_ms: u64 },
    #[error("Unsupported resource: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for HempError {
    fn from(err: serde_json::Error) -> Self {
        HempError::InvalidObject(err.to_string())
    }
}
