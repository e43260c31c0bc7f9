//! Property descriptors for external property-editing panels.
//!
//! Each element type exposes a list of groups; the registry keyed by type tag
//! serializes to nested JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Editor widget and bounds for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyKind {
    Color,
    Range { min: f64, max: f64, step: f64 },
    Integer { min: i64, max: i64 },
    Url,
    Dropdown { options: Vec<String> },
    Text,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
    pub default: Value,
}

impl PropertyDescriptor {
    pub fn new(name: &str, label: &str, kind: PropertyKind, default: Value) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default,
        }
    }

    pub fn color(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, PropertyKind::Color, json!(default))
    }

    pub fn range(name: &str, label: &str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self::new(name, label, PropertyKind::Range { min, max, step }, json!(default))
    }

    pub fn integer(name: &str, label: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(name, label, PropertyKind::Integer { min, max }, json!(default))
    }

    pub fn dropdown(name: &str, label: &str, options: &[&str], default: &str) -> Self {
        let options = options.iter().map(|s| s.to_string()).collect();
        Self::new(name, label, PropertyKind::Dropdown { options }, json!(default))
    }
}

/// Named group of properties, shown together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub name: String,
    pub label: String,
    pub properties: Vec<PropertyDescriptor>,
}

impl PropertyGroup {
    pub fn new(name: &str, label: &str, properties: Vec<PropertyDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            properties,
        }
    }

    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Position, size and rotation.
pub fn geometry_group() -> PropertyGroup {
    PropertyGroup::new(
        "geometry",
        "Geometry",
        vec![
            PropertyDescriptor::integer("x", "X", -10_000, 10_000, 0),
            PropertyDescriptor::integer("y", "Y", -10_000, 10_000, 0),
            PropertyDescriptor::integer("width", "Width", 50, 10_000, 100),
            PropertyDescriptor::integer("height", "Height", 50, 10_000, 100),
            PropertyDescriptor::range("rotation", "Rotation", 0.0, 359.0, 1.0, 0.0),
        ],
    )
}

/// Opacity, compositing and background shared by every element type.
pub fn appearance_group(composite_modes: &[&str]) -> PropertyGroup {
    PropertyGroup::new(
        "appearance",
        "Appearance",
        vec![
            PropertyDescriptor::range("opacity", "Opacity", 0.0, 1.0, 0.01, 1.0),
            PropertyDescriptor::dropdown("compositing", "Blending", composite_modes, "source-over"),
            PropertyDescriptor::color("background.color", "Background", "#ffffff"),
            PropertyDescriptor::range("background.alpha", "Background opacity", 0.0, 1.0, 0.01, 1.0),
            PropertyDescriptor::integer("background.radius", "Corner radius", 0, 500, 0),
        ],
    )
}
