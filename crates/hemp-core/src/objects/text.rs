//! Text element attributes.

use super::VerticalAlign;
use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Line decoration drawn for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

/// Inner padding, per side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Drop shadow behind glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextShadow {
    pub color: String,
    pub alpha: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            alpha: 0.5,
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 0.0,
        }
    }
}

/// A web font that must be fetched before the text can render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomFont {
    pub family: String,
    pub url: String,
}

/// A resolved font: pixel size plus family.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub family: String,
}

impl FontSpec {
    pub fn new(size: f64, family: &str) -> Self {
        Self {
            size,
            family: family.to_string(),
        }
    }

    /// CSS font shorthand, e.g. `24px sans-serif`. Also the metrics cache key.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size, self.family)
    }
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f64 {
    24.0
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_alpha() -> f64 {
    1.0
}

/// Word-wrapped text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_font: Option<CustomFont>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub valign: VerticalAlign,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<TextShadow>,
    #[serde(default)]
    pub decoration: Decoration,
    /// Overrides the controller's line-height factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

impl TextProps {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            custom_font: None,
            color: default_color(),
            alpha: 1.0,
            align: TextAlign::default(),
            valign: VerticalAlign::default(),
            padding: Padding::default(),
            shadow: None,
            decoration: Decoration::default(),
            line_height: None,
        }
    }

    /// The font to draw with: the custom family once it has loaded,
    /// the fallback family otherwise.
    pub fn font(&self, custom_loaded: bool) -> FontSpec {
        match &self.custom_font {
            Some(custom) if custom_loaded => FontSpec::new(self.font_size, &custom.family),
            _ => FontSpec::new(self.font_size, &self.font_family),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_css() {
        assert_eq!(FontSpec::new(24.0, "serif").css(), "24px serif");
        assert_eq!(FontSpec::new(13.5, "Lato").css(), "13.5px Lato");
    }

    #[test]
    fn test_custom_font_used_once_loaded() {
        let mut props = TextProps::new("hi");
        props.custom_font = Some(CustomFont {
            family: "Lobster".to_string(),
            url: "https://fonts.example/lobster.woff2".to_string(),
        });
        assert_eq!(props.font(false).family, "sans-serif");
        assert_eq!(props.font(true).family, "Lobster");
    }
}
