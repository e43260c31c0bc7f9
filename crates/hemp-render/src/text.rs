//! Text layout: font metrics probing, word wrapping and aligned drawing.

use crate::surface::{Shadow, Surface};
use hemp_core::color::parse_color;
use hemp_core::objects::{Decoration, FontSpec, TextAlign, TextProps, VerticalAlign};
use hemp_core::Result;
use kurbo::{Point, Rect, Shape, Vec2};
use std::collections::HashMap;

/// Vertical extent of a font around its baseline, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
}

impl FontMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Font metrics keyed by CSS font string.
///
/// Text measurement only reports advance widths, so heights are found by
/// drawing reference glyphs on a scratch surface and scanning for inked rows.
#[derive(Debug, Default)]
pub struct FontMetricsCache {
    entries: HashMap<String, FontMetrics>,
}

impl FontMetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&mut self, surface: &dyn Surface, font: &FontSpec) -> FontMetrics {
        let key = font.css();
        if let Some(metrics) = self.entries.get(&key) {
            return *metrics;
        }
        let metrics = measure_ink(surface, font);
        log::debug!(
            "measured font {key}: ascent {} descent {}",
            metrics.ascent,
            metrics.descent
        );
        self.entries.insert(key, metrics);
        metrics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn measure_ink(surface: &dyn Surface, font: &FontSpec) -> FontMetrics {
    let size = font.size.max(1.0);
    let baseline = (size * 2.0).ceil();
    let height = (size * 3.0).ceil() as u32;

    let ink = |text: &str| {
        let width = (size * (text.chars().count() as f64 + 1.0)).ceil() as u32;
        let mut scratch = surface.create_offscreen(width, height);
        scratch.set_font(font);
        scratch.fill_text(text, Point::new(0.0, baseline), TextAlign::Left, peniko::Color::BLACK);
        let inked: Vec<i64> = (0..i64::from(height))
            .filter(|&y| (0..i64::from(width)).any(|x| scratch.alpha_at(x, y) > 0))
            .collect();
        inked.first().copied().zip(inked.last().copied())
    };

    let ascent = match ink("M") {
        Some((top, _)) => baseline - top as f64,
        None => size,
    };
    let descent = match ink("gjpqy") {
        Some((_, bottom)) => (bottom as f64 + 1.0 - baseline).max(0.0),
        None => 0.0,
    };
    FontMetrics { ascent, descent }
}

/// Greedily wrap `text` into rows that fit `width` once `padding` is added.
///
/// Words split on spaces; `\n` starts a new paragraph. A word too wide for the
/// surface still gets a row of its own. Blank paragraphs produce no row. Uses
/// the surface's current font.
pub fn make_word_wrap_rows(surface: &dyn Surface, text: &str, width: f64, padding: f64) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for paragraph in text.split('\n') {
        let mut row = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if row.is_empty() {
                row.push_str(word);
                continue;
            }
            let candidate = format!("{row} {word}");
            if surface.measure_text(&candidate) + padding < width {
                row = candidate;
            } else {
                rows.push(std::mem::replace(&mut row, word.to_string()));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

/// Draw wrapped text into a surface sized to the object box.
///
/// Returns the rendered area: the sum of row width times font height.
pub fn render_text(
    surface: &mut dyn Surface,
    metrics: &mut FontMetricsCache,
    props: &TextProps,
    font: &FontSpec,
    line_height: f64,
) -> Result<f64> {
    let (width, height) = (f64::from(surface.width()), f64::from(surface.height()));
    let padding = props.padding;
    let color = parse_color(&props.color, props.alpha)?;

    surface.save();
    surface.set_font(font);
    let rows = make_word_wrap_rows(surface, &props.text, width, padding.horizontal());
    let font_metrics = metrics.metrics(surface, font);
    let font_height = font_metrics.height();
    let row_height = font_height * line_height;
    let total = rows.len() as f64 * row_height;

    let top = match props.valign {
        VerticalAlign::Top => padding.top,
        VerticalAlign::Middle => (height - total) / 2.0,
        VerticalAlign::Bottom => height - padding.bottom - total,
    };
    let x = match props.align {
        TextAlign::Left => padding.left,
        TextAlign::Center => width / 2.0,
        TextAlign::Right => width - padding.right,
    };

    if let Some(shadow) = &props.shadow {
        surface.set_shadow(Some(Shadow {
            color: parse_color(&shadow.color, shadow.alpha)?,
            offset: Vec2::new(shadow.offset_x, shadow.offset_y),
            blur: shadow.blur,
        }));
    }

    let mut area = 0.0;
    for (i, row) in rows.iter().enumerate() {
        let baseline = top + i as f64 * row_height + (row_height - font_height) / 2.0 + font_metrics.ascent;
        surface.fill_text(row, Point::new(x, baseline), props.align, color);

        let row_width = surface.measure_text(row);
        area += row_width * font_height;

        let line_y = match props.decoration {
            Decoration::None => continue,
            Decoration::Underline => baseline + font_metrics.descent / 2.0,
            Decoration::Strikethrough => baseline - font_metrics.ascent * 0.35,
        };
        let thickness = (font_height / 15.0).max(1.0);
        let start = match props.align {
            TextAlign::Left => x,
            TextAlign::Center => x - row_width / 2.0,
            TextAlign::Right => x - row_width,
        };
        let line = Rect::new(start, line_y - thickness / 2.0, start + row_width, line_y + thickness / 2.0);
        surface.fill_path(&line.to_path(0.1), color);
    }
    surface.restore();
    Ok(area)
}
