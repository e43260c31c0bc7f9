//! Scene object definitions.

mod geometry;
mod image;
mod live;
mod shape;
mod text;

pub use geometry::{Corners, Geometry, normalize_degrees};
pub use image::ImageProps;
pub use live::{LiveObject, ObjectId, RuntimeState, Tracked};
pub use shape::{ShapeKind, ShapeProps};
pub use text::{CustomFont, Decoration, FontSpec, Padding, TextAlign, TextProps, TextShadow};

use crate::error::{HempError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Compositing operation used when an object is drawn onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    #[default]
    SourceOver,
    SourceAtop,
    DestinationOver,
    DestinationOut,
    Lighter,
    Multiply,
    Screen,
}

impl CompositeMode {
    pub fn all() -> &'static [CompositeMode] {
        &[
            CompositeMode::SourceOver,
            CompositeMode::SourceAtop,
            CompositeMode::DestinationOver,
            CompositeMode::DestinationOut,
            CompositeMode::Lighter,
            CompositeMode::Multiply,
            CompositeMode::Screen,
        ]
    }

    /// The canvas `globalCompositeOperation` name.
    pub fn name(&self) -> &'static str {
        match self {
            CompositeMode::SourceOver => "source-over",
            CompositeMode::SourceAtop => "source-atop",
            CompositeMode::DestinationOver => "destination-over",
            CompositeMode::DestinationOut => "destination-out",
            CompositeMode::Lighter => "lighter",
            CompositeMode::Multiply => "multiply",
            CompositeMode::Screen => "screen",
        }
    }
}

/// Vertical alignment, used by text placement and image crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Rounded background fill drawn behind an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    pub color: String,
    pub alpha: f64,
    pub radius: f64,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            alpha: 1.0,
            radius: 0.0,
        }
    }
}

/// Type-specific attributes, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Image(ImageProps),
    Text(TextProps),
    Shape(ShapeProps),
}

/// Renderer kinds known to the element factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Image,
    Text,
    Shape,
    /// Selection overlay drawn over the selected object.
    Transform,
}

impl ElementType {
    pub fn all() -> &'static [ElementType] {
        &[
            ElementType::Image,
            ElementType::Text,
            ElementType::Shape,
            ElementType::Transform,
        ]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ElementType::Image => "image",
            ElementType::Text => "text",
            ElementType::Shape => "shape",
            ElementType::Transform => "transform",
        }
    }
}

impl FromStr for ElementType {
    type Err = HempError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "image" => Ok(ElementType::Image),
            "text" => Ok(ElementType::Text),
            "shape" | "rectangle" | "ellipse" => Ok(ElementType::Shape),
            "transform" => Ok(ElementType::Transform),
            other => Err(HempError::UnknownElementType(other.to_string())),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// A drawable scene object: the public, serializable form.
///
/// Runtime state (identity, selection, load errors, transform sessions) is
/// kept beside it in [`LiveObject`] and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub compositing: CompositeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl SceneObject {
    /// Create a visible, fully opaque object.
    pub fn new(geometry: Geometry, kind: ElementKind) -> Self {
        Self {
            geometry,
            visible: true,
            opacity: 1.0,
            compositing: CompositeMode::default(),
            background: None,
            locked: false,
            kind,
        }
    }

    pub fn rectangle(geometry: Geometry, color: &str) -> Self {
        Self::new(geometry, ElementKind::Shape(ShapeProps::new(ShapeKind::Rectangle, color)))
    }

    pub fn ellipse(geometry: Geometry, color: &str) -> Self {
        Self::new(geometry, ElementKind::Shape(ShapeProps::new(ShapeKind::Ellipse, color)))
    }

    pub fn text(geometry: Geometry, text: &str) -> Self {
        Self::new(geometry, ElementKind::Text(TextProps::new(text)))
    }

    pub fn image(geometry: Geometry, src: &str) -> Self {
        Self::new(geometry, ElementKind::Image(ImageProps::new(src)))
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Shape(_) => ElementType::Shape,
        }
    }

    /// Parse an object from JSON, reporting unknown type tags and shape kinds
    /// as configuration errors.
    ///
    /// `"type": "rectangle"` and `"type": "ellipse"` are shorthands for a
    /// shape object of that kind.
    pub fn from_json(mut value: Value) -> Result<Self> {
        let map = value
            .as_object_mut()
            .ok_or_else(|| HempError::InvalidObject("expected a JSON object".to_string()))?;
        let tag = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| HempError::InvalidObject("missing \"type\"".to_string()))?
            .to_string();
        let element_type: ElementType = tag.parse()?;
        match element_type {
            ElementType::Transform => return Err(HempError::UnknownElementType(tag)),
            ElementType::Shape => {
                if tag != "shape" {
                    map.insert("type".to_string(), Value::from("shape"));
                    map.insert("shape".to_string(), Value::from(tag));
                }
                if let Some(kind) = map.get("shape") {
                    let kind = kind
                        .as_str()
                        .ok_or_else(|| HempError::UnknownShape(kind.to_string()))?;
                    ShapeKind::from_str(kind)?;
                }
            }
            ElementType::Image | ElementType::Text => {}
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a JSON array of objects.
    pub fn list_from_json(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            _ => Err(HempError::InvalidObject("expected a JSON array".to_string())),
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rectangle_shorthand() {
        let obj = SceneObject::from_json(json!({
            "type": "rectangle",
            "x": 100, "y": 100, "width": 200, "height": 100,
            "color": "#FF0000"
        }))
        .unwrap();
        assert_eq!(obj.geometry, Geometry::new(100.0, 100.0, 200.0, 100.0));
        match obj.kind {
            ElementKind::Shape(shape) => {
                assert_eq!(shape.shape, ShapeKind::Rectangle);
                assert_eq!(shape.color, "#FF0000");
            }
            other => panic!("Expected shape, got {other:?}"),
        }
        assert!(obj.visible);
        assert_eq!(obj.opacity, 1.0);
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let err = SceneObject::from_json(json!({"type": "video"})).unwrap_err();
        assert_eq!(err, HempError::UnknownElementType("video".to_string()));
    }

    #[test]
    fn test_unknown_shape_fails_fast() {
        let err = SceneObject::from_json(json!({"type": "shape", "shape": "star"})).unwrap_err();
        assert_eq!(err, HempError::UnknownShape("star".to_string()));
    }

    #[test]
    fn test_round_trip_keeps_public_fields_only() {
        let obj = SceneObject::text(Geometry::new(10.0, 20.0, 300.0, 80.0), "hello")
            .with_background(Background::default());
        let value = obj.to_json().unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hello");
        assert!(value.get("id").is_none());
        assert!(value.get("selected").is_none());
        let back = SceneObject::from_json(value).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn test_compositing_names() {
        let obj = SceneObject::from_json(json!({
            "type": "ellipse",
            "compositing": "destination-out"
        }))
        .unwrap();
        assert_eq!(obj.compositing, CompositeMode::DestinationOut);
        assert_eq!(obj.compositing.name(), "destination-out");
    }
}
