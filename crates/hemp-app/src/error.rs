//! Errors surfaced by the command-line shell.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid gesture {0:?}: expected x0,y0:x1,y1[:mods]")]
    Gesture(String),
    #[error(transparent)]
    Hemp(#[from] hemp_core::HempError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
