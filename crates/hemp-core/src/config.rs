//! Scene controller configuration.

use crate::error::{HempError, Result};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the encoded media URL in a reflector template.
pub const REFLECTOR_PLACEHOLDER: &str = "{{url}}";

/// Configuration for a scene controller.
///
/// Every field has a default so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HempConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Whether pointer events are handled.
    pub interactive: bool,
    /// Optional proxy template for media URLs, e.g. `https://proxy/?u={{url}}`.
    pub reflector: Option<String>,
    /// Text line-height factor applied to the measured font height.
    pub line_height: f64,
    /// Minimum width/height an object can be resized to.
    pub min_size: f64,
    /// Distance in pixels within which alt-drags snap to canvas edges.
    pub snap_threshold: f64,
    /// Increment for snapped rotation, in degrees.
    pub rotate_snap_degrees: f64,
    /// Media cache time-to-live in milliseconds.
    pub media_ttl_ms: u64,
    /// How long to wait for a custom font before giving up.
    pub font_timeout_ms: u64,
    /// Interval between font availability checks.
    pub font_poll_ms: u64,
    /// Dragging an object above the canvas top fills the canvas with it.
    pub drag_to_maximize: bool,
    /// Size of the square resize handles.
    pub handle_size: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_handle_offset: f64,
}

impl Default for HempConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            interactive: true,
            reflector: None,
            line_height: 1.5,
            min_size: 50.0,
            snap_threshold: 10.0,
            rotate_snap_degrees: 45.0,
            media_ttl_ms: 300_000,
            font_timeout_ms: 3_000,
            font_poll_ms: 50,
            drag_to_maximize: true,
            handle_size: 10.0,
            rotate_handle_offset: 30.0,
        }
    }
}

impl HempConfig {
    /// Create a default configuration for a canvas of the given size.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HempConfig =
            serde_json::from_str(json).map_err(|e| HempError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the controller relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(HempError::Config(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.min_size <= 0.0 {
            return Err(HempError::Config("minSize must be positive".to_string()));
        }
        if self.line_height <= 0.0 {
            return Err(HempError::Config("lineHeight must be positive".to_string()));
        }
        if self.rotate_snap_degrees <= 0.0 {
            return Err(HempError::Config(
                "rotateSnapDegrees must be positive".to_string(),
            ));
        }
        if let Some(reflector) = &self.reflector {
            if !reflector.contains(REFLECTOR_PLACEHOLDER) {
                return Err(HempError::Config(format!(
                    "reflector template must contain {REFLECTOR_PLACEHOLDER}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HempConfig::default();
        assert_eq!(config.min_size, 50.0);
        assert_eq!(config.media_ttl_ms, 300_000);
        assert!((config.line_height - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json() {
        let config = HempConfig::from_json_str(r#"{"width": 320, "lineHeight": 1.2}"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600);
        assert!((config.line_height - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reflector_requires_placeholder() {
        let err = HempConfig::from_json_str(r#"{"reflector": "https://proxy/"}"#).unwrap_err();
        assert!(matches!(err, HempError::Config(_)));
        assert!(HempConfig::from_json_str(r#"{"reflector": "https://proxy/?u={{url}}"}"#).is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(HempConfig::from_json_str(r#"{"width": 0}"#).is_err());
    }
}
