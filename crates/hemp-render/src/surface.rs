//! Drawing surface abstraction.
//!
//! A [`Surface`] is an immediate-mode 2D context in the style of the HTML
//! canvas: a transform/alpha/composite state stack plus path, text and image
//! drawing. Browser hosts implement it over a `CanvasRenderingContext2d`; the
//! crate ships a headless software implementation in [`crate::PixelSurface`].

use hemp_core::objects::{CompositeMode, FontSpec, TextAlign};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::{Color, ImageData};

/// Drop shadow applied to subsequent fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    /// Offset in device pixels; unaffected by the current transform.
    pub offset: Vec2,
    /// Blur radius; surfaces without blur support may ignore it.
    pub blur: f64,
}

/// Immediate-mode drawing surface.
///
/// Paths and text are given in user space and mapped through the current
/// transform. Pixel queries ([`alpha_at`](Self::alpha_at)) and the point given
/// to [`is_point_in_path`](Self::is_point_in_path) are in device space.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// A new transparent surface of the same kind.
    fn create_offscreen(&self, width: u32, height: u32) -> Box<dyn Surface>;

    fn save(&mut self);
    fn restore(&mut self);

    /// Multiply the current transform by `affine` (applied first).
    fn transform(&mut self, affine: Affine);
    fn set_transform(&mut self, affine: Affine);
    fn current_transform(&self) -> Affine;

    fn set_global_alpha(&mut self, alpha: f64);
    fn set_composite(&mut self, mode: CompositeMode);
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    fn set_font(&mut self, font: &FontSpec);
    /// Advance width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f64;
    /// Draw `text` with its alphabetic baseline at `origin.y`, anchored
    /// horizontally at `origin.x` according to `align`.
    fn fill_text(&mut self, text: &str, origin: Point, align: TextAlign, color: Color);

    fn fill_path(&mut self, path: &BezPath, color: Color);
    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color);

    /// Draw the `src` region of `image` scaled into `dst`.
    fn draw_image(&mut self, image: &ImageData, src: Rect, dst: Rect);

    /// Copy of the surface contents as RGBA8. The image records whether its
    /// pixels are premultiplied.
    fn snapshot(&self) -> ImageData;

    /// Alpha of a device pixel; zero outside the surface.
    fn alpha_at(&self, x: i64, y: i64) -> u8;

    /// Whether the device-space `point` lies inside `path` mapped through
    /// the current transform.
    fn is_point_in_path(&self, path: &BezPath, point: Point) -> bool;

    /// Reset every pixel to transparent, ignoring the transform.
    fn clear(&mut self);

    fn translate(&mut self, x: f64, y: f64) {
        self.transform(Affine::translate((x, y)));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform(Affine::rotate(radians));
    }

    /// Draw another surface with its top-left corner at `origin`.
    fn draw_surface(&mut self, source: &dyn Surface, origin: Point) {
        let image = source.snapshot();
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let src = Rect::new(0.0, 0.0, w, h);
        let dst = Rect::from_origin_size(origin, (w, h));
        self.draw_image(&image, src, dst);
    }
}
