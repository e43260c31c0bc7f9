//! Hemp Application
//!
//! Headless shell around the scene controller: loads scenes and media from
//! disk, replays pointer gestures and exports the canvas as PNG.

mod error;
mod export;
mod gesture;
mod loader;

pub use error::AppError;
pub use export::{encode_png, write_png};
pub use gesture::Gesture;
pub use loader::FsLoader;

use hemp_core::SceneObject;
use std::path::Path;

/// Read a scene file: a JSON array of objects.
pub fn load_scene(path: &Path) -> Result<Vec<SceneObject>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_scene(&text)
}

pub fn parse_scene(text: &str) -> Result<Vec<SceneObject>, AppError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(SceneObject::list_from_json(value)?)
}
