//! Bundled font faces and parley shaping for [`crate::PixelSurface`].
//!
//! Three DejaVu faces are embedded so that headless output is identical on
//! every machine. CSS family lists resolve to the first registered face or
//! generic keyword they name; anything else falls back to the sans face.

use hemp_core::objects::FontSpec;
use parley::layout::PositionedLayoutItem;
use parley::{Alignment, AlignmentOptions, FontContext, FontFamily, FontStack, LayoutContext, StyleProperty};
use std::sync::Arc;

const DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const DEJAVU_SERIF: &[u8] = include_bytes!("../assets/DejaVuSerif.ttf");
const DEJAVU_SANS_MONO: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

const SANS: usize = 0;
const SERIF: usize = 1;
const MONO: usize = 2;

struct Face {
    family: String,
    bytes: &'static [u8],
    font: vello_cpu::peniko::FontData,
}

/// Glyph position relative to the left end of the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct ShapedRun {
    pub face: usize,
    pub font_size: f32,
    pub glyphs: Vec<PlacedGlyph>,
}

/// One line of shaped text.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShapedLine {
    /// Advance width including trailing whitespace.
    pub width: f64,
    pub runs: Vec<ShapedRun>,
}

pub(crate) struct FontBook {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
    faces: Vec<Face>,
}

impl FontBook {
    pub fn new() -> Self {
        let mut font_cx = FontContext::new();
        let mut faces = Vec::new();
        for (bytes, fallback) in [
            (DEJAVU_SANS, "DejaVu Sans"),
            (DEJAVU_SERIF, "DejaVu Serif"),
            (DEJAVU_SANS_MONO, "DejaVu Sans Mono"),
        ] {
            let registered = font_cx
                .collection
                .register_fonts(parley::fontique::Blob::new(Arc::new(bytes)), None);
            let family = match registered.first() {
                Some((id, _)) => font_cx.collection.family_name(*id).unwrap_or(fallback).to_string(),
                None => fallback.to_string(),
            };
            log::debug!("Registered font family {}", family);
            faces.push(Face {
                family,
                bytes,
                font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::new(Arc::new(bytes)), 0),
            });
        }
        Self {
            font_cx,
            layout_cx: LayoutContext::new(),
            faces,
        }
    }

    pub fn font(&self, face: usize) -> &vello_cpu::peniko::FontData {
        &self.faces[face.min(self.faces.len() - 1)].font
    }

    /// Index of the face used for a CSS family list such as `Roboto, serif`.
    fn face_index(&self, families: &str) -> usize {
        for name in families.split(',') {
            let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
            if let Some(index) = self.faces.iter().position(|face| face.family.eq_ignore_ascii_case(name)) {
                return index;
            }
            match name.to_ascii_lowercase().as_str() {
                "serif" => return SERIF,
                "monospace" => return MONO,
                "sans-serif" | "system-ui" => return SANS,
                _ => {}
            }
        }
        SANS
    }

    /// Family name `font` resolves to.
    pub fn family(&self, font: &FontSpec) -> &str {
        &self.faces[self.face_index(&font.family)].family
    }

    /// Shape `text` as a single line.
    pub fn shape(&mut self, font: &FontSpec, text: &str) -> ShapedLine {
        if text.is_empty() || font.size <= 0.0 || !font.size.is_finite() {
            return ShapedLine::default();
        }
        let face = self.face_index(&font.family);
        let family = self.faces[face].family.clone();

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font.size as f32));
        builder.push_default(StyleProperty::FontStack(FontStack::Single(FontFamily::Named(family.into()))));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let first_baseline = layout.lines().next().map(|line| line.metrics().baseline).unwrap_or(0.0);
        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let run = glyph_run.run();
                let data = run.font().data.data().as_ptr();
                let run_face = self
                    .faces
                    .iter()
                    .position(|f| std::ptr::eq(f.bytes.as_ptr(), data))
                    .unwrap_or(face);
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline() - first_baseline;
                let glyphs = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let placed = PlacedGlyph {
                            id: glyph.id,
                            x: x + glyph.x,
                            y: y - glyph.y,
                        };
                        x += glyph.advance;
                        placed
                    })
                    .collect();
                runs.push(ShapedRun {
                    face: run_face,
                    font_size: run.font_size(),
                    glyphs,
                });
            }
        }
        ShapedLine {
            width: f64::from(layout.full_width()),
            runs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_families_resolve() {
        let book = FontBook::new();
        assert_eq!(book.face_index("sans-serif"), SANS);
        assert_eq!(book.face_index("serif"), SERIF);
        assert_eq!(book.face_index("'Unknown Face', monospace"), MONO);
        assert_eq!(book.face_index("Unknown Face"), SANS);
        let serif = book.family(&FontSpec::new(12.0, "serif")).to_string();
        assert_eq!(book.face_index(&serif.to_uppercase()), SERIF);
    }

    #[test]
    fn test_shape_advances_scale_with_size() {
        let mut book = FontBook::new();
        let small = book.shape(&FontSpec::new(10.0, "sans-serif"), "Hemp");
        let large = book.shape(&FontSpec::new(20.0, "sans-serif"), "Hemp");
        assert!(small.width > 0.0);
        assert!((large.width - 2.0 * small.width).abs() < 1.0);
        let glyphs: usize = small.runs.iter().map(|run| run.glyphs.len()).sum();
        assert_eq!(glyphs, 4);
        assert!(small.runs.iter().all(|run| run.face == SANS));
    }

    #[test]
    fn test_trailing_space_counts() {
        let mut book = FontBook::new();
        let font = FontSpec::new(16.0, "sans-serif");
        let word = book.shape(&font, "ab").width;
        let spaced = book.shape(&font, "ab ").width;
        assert!(spaced > word);
    }

    #[test]
    fn test_monospace_advances_are_uniform() {
        let mut book = FontBook::new();
        let font = FontSpec::new(10.0, "monospace");
        let narrow = book.shape(&font, "iiii").width;
        let wide = book.shape(&font, "MMMM").width;
        assert!((narrow - wide).abs() < 1e-3);
    }

    #[test]
    fn test_empty_text() {
        let mut book = FontBook::new();
        let line = book.shape(&FontSpec::new(10.0, "sans-serif"), "");
        assert_eq!(line.width, 0.0);
        assert!(line.runs.is_empty());
    }
}
