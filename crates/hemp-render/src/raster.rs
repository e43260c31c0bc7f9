//! Headless CPU implementation of [`Surface`] on top of `vello_cpu`.
//!
//! Every drawing call is one `vello_cpu` pass: the current pixels are laid
//! down as an image, the new content is drawn with the surface's blend mode,
//! and the result is written back to the retained pixmap. Text is shaped with
//! parley against the bundled DejaVu faces.

use crate::fonts::{FontBook, ShapedLine};
use crate::surface::{Shadow, Surface};
use hemp_core::objects::{CompositeMode, FontSpec, TextAlign};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape, Vec2};
use peniko::{Blob, Color, ImageAlphaType, ImageData, ImageFormat};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{BlendMode, Compose, ImageSampler, Mix};
use vello_cpu::{Pixmap, RenderContext};

#[derive(Debug, Clone)]
struct DrawState {
    transform: Affine,
    alpha: f64,
    composite: CompositeMode,
    shadow: Option<Shadow>,
    font: FontSpec,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            composite: CompositeMode::SourceOver,
            shadow: None,
            font: FontSpec::new(10.0, "sans-serif"),
        }
    }
}

/// CPU raster surface.
pub struct PixelSurface {
    pixmap: Pixmap,
    ctx: RenderContext,
    fonts: Rc<RefCell<FontBook>>,
    /// Nothing drawn since creation or the last clear.
    blank: bool,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl PixelSurface {
    /// Dimensions are clamped to `1..=65535`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_fonts(width, height, Rc::new(RefCell::new(FontBook::new())))
    }

    fn with_fonts(width: u32, height: u32, fonts: Rc<RefCell<FontBook>>) -> Self {
        let (width, height) = (dimension(width), dimension(height));
        Self {
            pixmap: Pixmap::new(width, height),
            ctx: RenderContext::new(width, height),
            fonts,
            blank: true,
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// Straight-alpha RGBA8 of one pixel; transparent outside the surface.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        match self.index(x, y) {
            Some(i) => {
                let data = self.pixmap.data_as_u8_slice();
                unpremultiply([data[i], data[i + 1], data[i + 2], data[i + 3]])
            }
            None => [0; 4],
        }
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| unpremultiply([px[0], px[1], px[2], px[3]]))
            .collect()
    }

    /// Byte offset of a pixel in the pixmap.
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let (width, height) = (i64::from(self.pixmap.width()), i64::from(self.pixmap.height()));
        if x < 0 || y < 0 || x >= width || y >= height {
            return None;
        }
        Some((y * width + x) as usize * 4)
    }

    /// Color with the global alpha applied.
    fn paint_color(&self, color: Color) -> vello_cpu::peniko::Color {
        let c = color.to_rgba8();
        let alpha = (f64::from(c.a) * self.state.alpha).round() as u8;
        vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, alpha)
    }

    /// Device offset and color of the active shadow, if it is visible.
    fn shadow_paint(&self) -> Option<(Vec2, vello_cpu::peniko::Color)> {
        let shadow = self.state.shadow?;
        let paint = self.paint_color(shadow.color);
        (paint.to_rgba8().a > 0).then_some((shadow.offset, paint))
    }

    /// Run one drawing pass over the current pixels.
    fn render_pass(&mut self, draw: impl FnOnce(&mut RenderContext)) {
        let (width, height) = (f64::from(self.pixmap.width()), f64::from(self.pixmap.height()));
        self.ctx.reset();
        self.ctx.set_blend_mode(BlendMode::default());
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if !self.blank {
            let backdrop = vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(self.pixmap.clone())),
                sampler: ImageSampler::default(),
            };
            self.ctx.set_paint(backdrop);
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, width, height));
        }
        self.ctx.set_blend_mode(blend_mode(self.state.composite));
        draw(&mut self.ctx);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.blank = false;
    }

    fn draw_path(&mut self, path: &BezPath, color: Color, stroke: Option<f64>) {
        let path = bezpath_to_cpu(path);
        let transform = self.state.transform;
        let shadow = self.shadow_paint();
        let paint = self.paint_color(color);
        self.render_pass(|ctx| {
            if let Some(width) = stroke {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
            }
            let layers = shadow.into_iter().chain(std::iter::once((Vec2::ZERO, paint)));
            for (offset, paint) in layers {
                ctx.set_transform(affine_to_cpu(Affine::translate(offset) * transform));
                ctx.set_paint(paint);
                match stroke {
                    Some(_) => ctx.stroke_path(&path),
                    None => ctx.fill_path(&path),
                }
            }
        });
    }

    fn draw_line(&mut self, line: ShapedLine, transform: Affine, color: Color) {
        let shadow = self.shadow_paint();
        let paint = self.paint_color(color);
        let fonts = Rc::clone(&self.fonts);
        self.render_pass(|ctx| {
            let book = fonts.borrow();
            let layers = shadow.into_iter().chain(std::iter::once((Vec2::ZERO, paint)));
            for (offset, paint) in layers {
                ctx.set_transform(affine_to_cpu(Affine::translate(offset) * transform));
                ctx.set_paint(paint);
                for run in &line.runs {
                    let glyphs = run.glyphs.iter().map(|glyph| vello_cpu::Glyph {
                        id: glyph.id,
                        x: glyph.x,
                        y: glyph.y,
                    });
                    ctx.glyph_run(book.font(run.face)).font_size(run.font_size).fill_glyphs(glyphs);
                }
            }
        });
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Box<dyn Surface> {
        Box::new(PixelSurface::with_fonts(width, height, Rc::clone(&self.fonts)))
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn set_transform(&mut self, affine: Affine) {
        self.state.transform = affine;
    }

    fn current_transform(&self) -> Affine {
        self.state.transform
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.state.composite = mode;
    }

    /// Shadows are drawn as a hard offset copy; `blur` is not rendered.
    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn measure_text(&self, text: &str) -> f64 {
        self.fonts.borrow_mut().shape(&self.state.font, text).width
    }

    fn fill_text(&mut self, text: &str, origin: Point, align: TextAlign, color: Color) {
        let line = self.fonts.borrow_mut().shape(&self.state.font, text);
        if line.runs.is_empty() {
            return;
        }
        let start = match align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - line.width / 2.0,
            TextAlign::Right => origin.x - line.width,
        };
        let transform = self.state.transform * Affine::translate((start, origin.y));
        self.draw_line(line, transform, color);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.draw_path(path, color, None);
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        self.draw_path(path, color, Some(width));
    }

    fn draw_image(&mut self, image: &ImageData, src: Rect, dst: Rect) {
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return;
        }
        let Some(pixmap) = image_to_pixmap(image, self.state.alpha) else {
            return;
        };
        let placement = Affine::translate(dst.origin().to_vec2())
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate(-src.origin().to_vec2());
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: ImageSampler::default(),
        };
        let transform = self.state.transform;
        self.render_pass(|ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint_transform(affine_to_cpu(placement));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(dst.x0, dst.y0, dst.x1, dst.y1));
        });
    }

    /// Premultiplied RGBA8 copy of the pixmap.
    fn snapshot(&self) -> ImageData {
        ImageData {
            data: Blob::new(Arc::new(self.pixmap.data_as_u8_slice().to_vec())),
            format: ImageFormat::Rgba8,
            width: u32::from(self.pixmap.width()),
            height: u32::from(self.pixmap.height()),
            alpha_type: ImageAlphaType::AlphaPremultiplied,
        }
    }

    fn alpha_at(&self, x: i64, y: i64) -> u8 {
        match self.index(x, y) {
            Some(i) => self.pixmap.data_as_u8_slice()[i + 3],
            None => 0,
        }
    }

    fn is_point_in_path(&self, path: &BezPath, point: Point) -> bool {
        let mut device = path.clone();
        device.apply_affine(self.state.transform);
        device.contains(point)
    }

    fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.blank = true;
    }
}

fn dimension(value: u32) -> u16 {
    u16::try_from(value.max(1)).unwrap_or(u16::MAX)
}

fn blend_mode(mode: CompositeMode) -> BlendMode {
    match mode {
        CompositeMode::SourceOver => BlendMode::new(Mix::Normal, Compose::SrcOver),
        CompositeMode::DestinationOver => BlendMode::new(Mix::Normal, Compose::DestOver),
        CompositeMode::DestinationOut => BlendMode::new(Mix::Normal, Compose::DestOut),
        CompositeMode::SourceAtop => BlendMode::new(Mix::Normal, Compose::SrcAtop),
        CompositeMode::Lighter => BlendMode::new(Mix::Normal, Compose::Plus),
        CompositeMode::Multiply => BlendMode::new(Mix::Multiply, Compose::SrcOver),
        CompositeMode::Screen => BlendMode::new(Mix::Screen, Compose::SrcOver),
    }
}

/// Premultiplied pixmap of an RGBA8 image with `alpha` folded in.
fn image_to_pixmap(image: &ImageData, alpha: f64) -> Option<Pixmap> {
    if !matches!(image.format, ImageFormat::Rgba8) {
        log::warn!("Unsupported image format {:?}", image.format);
        return None;
    }
    let width = u16::try_from(image.width).ok().filter(|w| *w > 0)?;
    let height = u16::try_from(image.height).ok().filter(|h| *h > 0)?;
    let len = usize::from(width) * usize::from(height) * 4;
    let bytes = image.data.data();
    if bytes.len() < len {
        log::warn!("Image data shorter than {}x{}", width, height);
        return None;
    }
    let premultiplied = matches!(image.alpha_type, ImageAlphaType::AlphaPremultiplied);
    let pixels = bytes[..len]
        .chunks_exact(4)
        .map(|px| {
            let a = f64::from(px[3]) * alpha;
            let scale = if premultiplied { alpha } else { a / 255.0 };
            let channel = |c: u8| (f64::from(c) * scale).round().min(255.0) as u8;
            PremulRgba8::from_u8_array([channel(px[0]), channel(px[1]), channel(px[2]), a.round() as u8])
        })
        .collect();
    Some(Pixmap::from_parts_with_opacity(pixels, width, height, true))
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0; 4];
    }
    let channel = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
    [channel(r), channel(g), channel(b), a]
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let point = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(point(p)),
            PathEl::LineTo(p) => out.line_to(point(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point(p1), point(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(point(p1), point(p2), point(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.1;

    fn red() -> Color {
        Color::from_rgba8(255, 0, 0, 255)
    }

    /// Inked bounding box as (x0, y0, x1, y1), inclusive.
    fn ink_bounds(surface: &PixelSurface) -> Option<(i64, i64, i64, i64)> {
        let (w, h) = (i64::from(surface.width()), i64::from(surface.height()));
        let inked: Vec<(i64, i64)> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.alpha_at(x, y) > 0)
            .collect();
        let x0 = inked.iter().map(|p| p.0).min()?;
        let x1 = inked.iter().map(|p| p.0).max()?;
        let y0 = inked.iter().map(|p| p.1).min()?;
        let y1 = inked.iter().map(|p| p.1).max()?;
        Some((x0, y0, x1, y1))
    }

    #[test]
    fn test_fill_rect() {
        let mut surface = PixelSurface::new(20, 20);
        surface.fill_path(&Rect::new(5.0, 5.0, 15.0, 15.0).to_path(TOLERANCE), red());
        assert_eq!(surface.pixel(10, 10), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(surface.alpha_at(4, 10), 0);
        assert_eq!(surface.alpha_at(15, 10), 0);
    }

    #[test]
    fn test_transform_and_restore() {
        let mut surface = PixelSurface::new(20, 20);
        surface.save();
        surface.translate(10.0, 10.0);
        surface.fill_path(&Rect::new(-2.0, -2.0, 2.0, 2.0).to_path(TOLERANCE), red());
        surface.restore();
        assert_eq!(surface.current_transform(), Affine::IDENTITY);
        assert_eq!(surface.alpha_at(10, 10), 255);
        assert_eq!(surface.alpha_at(2, 2), 0);
    }

    #[test]
    fn test_global_alpha_and_source_over() {
        let mut surface = PixelSurface::new(4, 4);
        surface.set_global_alpha(0.5);
        surface.fill_path(&Rect::new(0.0, 0.0, 4.0, 4.0).to_path(TOLERANCE), red());
        assert!((127..=128).contains(&surface.alpha_at(1, 1)));
        surface.fill_path(&Rect::new(0.0, 0.0, 4.0, 4.0).to_path(TOLERANCE), red());
        assert!((190..=192).contains(&surface.alpha_at(1, 1)));
    }

    #[test]
    fn test_destination_out_erases() {
        let mut surface = PixelSurface::new(4, 4);
        let full = Rect::new(0.0, 0.0, 4.0, 4.0).to_path(TOLERANCE);
        surface.fill_path(&full, red());
        surface.set_composite(CompositeMode::DestinationOut);
        surface.fill_path(&Rect::new(0.0, 0.0, 2.0, 4.0).to_path(TOLERANCE), Color::from_rgba8(0, 0, 0, 255));
        assert_eq!(surface.alpha_at(0, 0), 0);
        assert_eq!(surface.pixel(3, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_destination_over_keeps_existing() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_path(&Rect::new(0.0, 0.0, 2.0, 4.0).to_path(TOLERANCE), red());
        surface.set_composite(CompositeMode::DestinationOver);
        surface.fill_path(&Rect::new(0.0, 0.0, 4.0, 4.0).to_path(TOLERANCE), Color::from_rgba8(0, 0, 255, 255));
        assert_eq!(surface.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(3, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_stroke_outlines_only() {
        let mut surface = PixelSurface::new(20, 20);
        surface.stroke_path(&Rect::new(4.0, 4.0, 16.0, 16.0).to_path(TOLERANCE), 2.0, red());
        assert_eq!(surface.alpha_at(4, 10), 255);
        assert_eq!(surface.alpha_at(10, 10), 0);
        assert_eq!(surface.alpha_at(1, 10), 0);
    }

    #[test]
    fn test_shadow_is_offset_copy() {
        let mut surface = PixelSurface::new(30, 10);
        surface.set_shadow(Some(Shadow {
            color: Color::from_rgba8(0, 0, 255, 255),
            offset: Vec2::new(15.0, 0.0),
            blur: 0.0,
        }));
        surface.fill_path(&Rect::new(0.0, 0.0, 10.0, 10.0).to_path(TOLERANCE), red());
        assert_eq!(surface.pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(20, 5), [0, 0, 255, 255]);
        assert_eq!(surface.alpha_at(12, 5), 0);
    }

    #[test]
    fn test_text_sits_on_baseline() {
        let mut surface = PixelSurface::new(100, 40);
        surface.set_font(&FontSpec::new(20.0, "sans-serif"));
        let width = surface.measure_text("MH");
        assert!(width > 20.0 && width < 40.0);
        surface.fill_text("MH", Point::new(10.0, 30.0), TextAlign::Left, red());
        let (x0, y0, x1, y1) = ink_bounds(&surface).unwrap();
        // Capitals stand on the baseline and reach roughly cap height.
        assert!((29..=30).contains(&y1));
        assert!((14..=17).contains(&y0));
        assert!(x0 >= 10 && x1 <= 10 + width.ceil() as i64);
    }

    #[test]
    fn test_text_alignment_anchors() {
        let font = FontSpec::new(20.0, "sans-serif");
        let mut right = PixelSurface::new(100, 40);
        right.set_font(&font);
        let width = right.measure_text("MH");
        right.fill_text("MH", Point::new(90.0, 30.0), TextAlign::Right, red());
        let (x0, _, x1, _) = ink_bounds(&right).unwrap();
        assert!(x1 <= 90 && x0 >= (90.0 - width).floor() as i64);

        let mut center = PixelSurface::new(100, 40);
        center.set_font(&font);
        center.fill_text("MH", Point::new(50.0, 30.0), TextAlign::Center, red());
        let (x0, _, x1, _) = ink_bounds(&center).unwrap();
        assert!(((x0 + x1) / 2 - 50).abs() <= 2);
    }

    #[test]
    fn test_offscreen_shares_fonts() {
        let mut surface = PixelSurface::new(10, 10);
        surface.set_font(&FontSpec::new(12.0, "serif"));
        let mut offscreen = surface.create_offscreen(10, 10);
        offscreen.set_font(&FontSpec::new(12.0, "serif"));
        assert_eq!(surface.measure_text("abc"), offscreen.measure_text("abc"));
    }

    #[test]
    fn test_draw_image_scales() {
        let mut src = PixelSurface::new(2, 2);
        src.fill_path(&Rect::new(0.0, 0.0, 1.0, 2.0).to_path(TOLERANCE), red());
        let image = src.snapshot();

        let mut dst = PixelSurface::new(10, 10);
        dst.draw_image(&image, Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(dst.pixel(1, 5), [255, 0, 0, 255]);
        assert_eq!(dst.alpha_at(8, 5), 0);
    }

    #[test]
    fn test_draw_surface_round_trips_pixels() {
        let mut src = PixelSurface::new(4, 4);
        src.set_global_alpha(0.5);
        src.fill_path(&Rect::new(0.0, 0.0, 4.0, 4.0).to_path(TOLERANCE), red());
        let mut dst = PixelSurface::new(4, 4);
        dst.draw_surface(&src, Point::ZERO);
        assert_eq!(dst.pixel(2, 2), src.pixel(2, 2));
    }

    #[test]
    fn test_point_in_path_uses_transform() {
        let mut surface = PixelSurface::new(10, 10);
        surface.translate(100.0, 0.0);
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(TOLERANCE);
        assert!(surface.is_point_in_path(&path, Point::new(105.0, 5.0)));
        assert!(!surface.is_point_in_path(&path, Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_clear_and_zero_size() {
        let mut surface = PixelSurface::new(0, 0);
        assert_eq!((surface.width(), surface.height()), (1, 1));
        surface.fill_path(&Rect::new(0.0, 0.0, 1.0, 1.0).to_path(TOLERANCE), red());
        assert_eq!(surface.alpha_at(0, 0), 255);
        surface.clear();
        assert_eq!(surface.alpha_at(0, 0), 0);
    }
}
