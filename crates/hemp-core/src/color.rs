//! Hex color parsing and alpha expansion.

use crate::error::{HempError, Result};
use peniko::Color;

/// An opaque sRGB color parsed from a `#rgb` or `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0 };

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn parse(input: &str) -> Result<Self> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || HempError::InvalidColor(input.to_string());
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            6 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => Err(invalid()),
        }
    }

    /// Expand to a CSS `rgba(r,g,b,a)` string.
    pub fn to_rgba_string(self, alpha: f64) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }

    /// Convert to a peniko color with the given alpha in `0..=1`.
    pub fn with_alpha(self, alpha: f64) -> Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }
}

/// Parse a color string and combine it with an alpha value.
///
/// `transparent` is accepted in addition to hex notation.
pub fn parse_color(input: &str, alpha: f64) -> Result<Color> {
    if input.trim().eq_ignore_ascii_case("transparent") {
        return Ok(Color::from_rgba8(0, 0, 0, 0));
    }
    Ok(HexColor::parse(input)?.with_alpha(alpha))
}

/// Expand a hex color plus alpha into an `rgba(...)` string.
pub fn rgba_string(input: &str, alpha: f64) -> Result<String> {
    Ok(HexColor::parse(input)?.to_rgba_string(alpha))
}
