//! Rectangle and ellipse shapes.

use crate::error::{HempError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Shape subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = HempError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rectangle" => Ok(ShapeKind::Rectangle),
            "ellipse" => Ok(ShapeKind::Ellipse),
            other => Err(HempError::UnknownShape(other.to_string())),
        }
    }
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_alpha() -> f64 {
    1.0
}

/// A solid-filled rectangle or ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProps {
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Corner radius (rectangles only).
    #[serde(default)]
    pub radius: f64,
}

impl ShapeProps {
    pub fn new(shape: ShapeKind, color: &str) -> Self {
        Self {
            shape,
            color: color.to_string(),
            alpha: 1.0,
            radius: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_from_str() {
        assert_eq!("ellipse".parse::<ShapeKind>().unwrap(), ShapeKind::Ellipse);
        assert!(matches!("hexagon".parse::<ShapeKind>(), Err(HempError::UnknownShape(_))));
    }
}
