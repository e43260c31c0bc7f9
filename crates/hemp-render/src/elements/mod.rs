//! Per-type element renderers.

mod image;
mod shape;
mod text;
mod transform;

pub use image::ImageRenderer;
pub use shape::ShapeRenderer;
pub use text::TextRenderer;
pub use transform::TransformRenderer;

use crate::preload::{PreloadContext, PreloadTask};
use crate::surface::Surface;
use crate::text::FontMetricsCache;
use hemp_core::color::parse_color;
use hemp_core::objects::{ElementType, FontSpec, LiveObject, SceneObject, TextAlign};
use hemp_core::{Clock, HempConfig, MediaCache, PropertyGroup, Result};
use kurbo::{Point, Rect, RoundedRect, Shape};
use peniko::{Color, ImageData};
use std::collections::HashSet;
use std::rc::Rc;

const TOLERANCE: f64 = 0.1;

/// Whether a pass produces display pixels or an opaque hit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Display,
    HitMask,
}

/// Rendering state shared by all renderers of one controller.
pub struct RenderEnv {
    /// Decoded images by original `src`.
    pub images: MediaCache<ImageData>,
    pub metrics: FontMetricsCache,
    /// Custom font families known to be ready.
    pub loaded_fonts: HashSet<String>,
    pub line_height: f64,
    pub handle_size: f64,
    pub rotate_handle_offset: f64,
}

impl RenderEnv {
    pub fn new(config: &HempConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            images: MediaCache::with_clock(config.media_ttl_ms, clock),
            metrics: FontMetricsCache::new(),
            loaded_fonts: HashSet::new(),
            line_height: config.line_height,
            handle_size: config.handle_size,
            rotate_handle_offset: config.rotate_handle_offset,
        }
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.metrics.clear();
        self.loaded_fonts.clear();
    }
}

/// Renderer for one element type.
///
/// `render_element` draws into a surface sized to the object box with the
/// origin at its top-left corner; `render` composites that onto the target.
pub trait ElementRenderer {
    fn element_type(&self) -> ElementType;

    fn needs_preload(&self, _env: &mut RenderEnv, _live: &LiveObject) -> bool {
        false
    }

    /// Start loading the object's resources. Only called when
    /// [`needs_preload`](Self::needs_preload) returned true.
    fn preload(&self, _live: &LiveObject, _ctx: &PreloadContext) -> Option<PreloadTask> {
        None
    }

    fn render_element(&self, env: &mut RenderEnv, surface: &mut dyn Surface, live: &LiveObject) -> Result<()>;

    /// Fill the object's outline in opaque black.
    fn render_hit_mask(&self, surface: &mut dyn Surface, _live: &LiveObject) -> Result<()> {
        let bounds = surface_rect(surface);
        surface.fill_path(&bounds.to_path(TOLERANCE), Color::BLACK);
        Ok(())
    }

    /// Draw the object onto `target`: private surface, then translate to the
    /// center, rotate and composite.
    fn render(&self, env: &mut RenderEnv, target: &mut dyn Surface, live: &LiveObject, mode: RenderMode) -> Result<()> {
        let object = &live.object;
        if !object.visible {
            return Ok(());
        }
        let g = object.geometry;
        let (width, height) = (g.width.ceil().max(1.0) as u32, g.height.ceil().max(1.0) as u32);
        let mut canvas = target.create_offscreen(width, height);
        setup_canvas(canvas.as_mut(), object, mode)?;
        match mode {
            RenderMode::Display => self.render_element(env, canvas.as_mut(), live)?,
            RenderMode::HitMask => self.render_hit_mask(canvas.as_mut(), live)?,
        }

        target.save();
        target.translate(g.x, g.y);
        target.rotate(g.radians());
        if mode == RenderMode::Display {
            target.set_global_alpha(object.opacity);
            target.set_composite(object.compositing);
        }
        let origin = Point::new(-g.width / 2.0, -g.height / 2.0);
        target.draw_surface(canvas.as_ref(), origin);
        target.restore();
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyGroup>;
}

fn surface_rect(surface: &dyn Surface) -> Rect {
    Rect::new(0.0, 0.0, f64::from(surface.width()), f64::from(surface.height()))
}

/// Clear the private surface and draw the optional rounded background.
pub fn setup_canvas(surface: &mut dyn Surface, object: &SceneObject, mode: RenderMode) -> Result<()> {
    surface.clear();
    let Some(background) = &object.background else {
        return Ok(());
    };
    let color = match mode {
        RenderMode::Display => parse_color(&background.color, background.alpha)?,
        RenderMode::HitMask => Color::BLACK,
    };
    let bounds = surface_rect(surface);
    let radius = background.radius.clamp(0.0, bounds.width().min(bounds.height()) / 2.0);
    let shape = RoundedRect::from_rect(bounds, radius);
    surface.fill_path(&shape.to_path(TOLERANCE), color);
    Ok(())
}

/// Checkerboard with a red cross and a message, drawn when media is missing.
pub fn render_placeholder(surface: &mut dyn Surface, message: &str) {
    let bounds = surface_rect(surface);
    let cell = 10.0;
    surface.fill_path(&bounds.to_path(TOLERANCE), Color::from_rgba8(220, 220, 220, 255));
    let mut checks = kurbo::BezPath::new();
    let (cols, rows) = ((bounds.width() / cell).ceil() as i64, (bounds.height() / cell).ceil() as i64);
    for row in 0..rows {
        for col in (row % 2..cols).step_by(2) {
            let x = col as f64 * cell;
            let y = row as f64 * cell;
            checks.extend(Rect::new(x, y, x + cell, y + cell).path_elements(TOLERANCE));
        }
    }
    surface.fill_path(&checks, Color::from_rgba8(190, 190, 190, 255));

    let mut cross = kurbo::BezPath::new();
    cross.move_to((bounds.x0, bounds.y0));
    cross.line_to((bounds.x1, bounds.y1));
    cross.move_to((bounds.x1, bounds.y0));
    cross.line_to((bounds.x0, bounds.y1));
    surface.stroke_path(&cross, 2.0, Color::from_rgba8(200, 30, 30, 255));

    let size = (bounds.height() / 8.0).clamp(8.0, 16.0);
    surface.set_font(&FontSpec::new(size, "sans-serif"));
    let center = bounds.center();
    surface.fill_text(message, Point::new(center.x, center.y + size / 2.0), TextAlign::Center, Color::BLACK);
}
