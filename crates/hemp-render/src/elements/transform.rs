//! Selection overlay: outline, resize handles and the rotate knob.
//!
//! Unlike other renderers this draws straight onto the shared target so that
//! handle hit tests happen in display coordinates.

use super::{ElementRenderer, RenderEnv, RenderMode, TOLERANCE};
use crate::surface::Surface;
use hemp_core::objects::{ElementType, Geometry, LiveObject};
use hemp_core::transform::{HIT_PRIORITY, HandleKind, handle_hit_rect, handle_rect};
use hemp_core::{PropertyGroup, Result};
use kurbo::{BezPath, Circle, Point, Shape};
use peniko::Color;

fn selection_color() -> Color {
    Color::from_rgba8(59, 130, 246, 255)
}

#[derive(Debug, Default)]
pub struct TransformRenderer;

impl TransformRenderer {
    fn enter(target: &mut dyn Surface, g: &Geometry) {
        target.save();
        target.translate(g.x, g.y);
        target.rotate(g.radians());
    }

    /// The handle under a device-space point, testing handles in priority
    /// order inside the object's rotated frame.
    pub fn hit_test(&self, env: &RenderEnv, target: &mut dyn Surface, geometry: &Geometry, point: Point) -> Option<HandleKind> {
        Self::enter(target, geometry);
        let hit = HIT_PRIORITY.iter().copied().find(|&kind| {
            let area = handle_hit_rect(geometry, kind, env.handle_size, env.rotate_handle_offset);
            target.is_point_in_path(&area.to_path(TOLERANCE), point)
        });
        target.restore();
        hit
    }
}

impl ElementRenderer for TransformRenderer {
    fn element_type(&self) -> ElementType {
        ElementType::Transform
    }

    fn render_element(&self, _env: &mut RenderEnv, _surface: &mut dyn Surface, _live: &LiveObject) -> Result<()> {
        Ok(())
    }

    fn render(&self, env: &mut RenderEnv, target: &mut dyn Surface, live: &LiveObject, mode: RenderMode) -> Result<()> {
        if mode == RenderMode::HitMask {
            return Ok(());
        }
        let g = live.object.geometry;
        Self::enter(target, &g);
        target.stroke_path(&g.local_rect().to_path(TOLERANCE), 1.5, selection_color());

        if !live.object.locked {
            let (size, offset) = (env.handle_size, env.rotate_handle_offset);
            let knob = handle_rect(&g, HandleKind::Rotate, size, offset).center();
            let mut stem = BezPath::new();
            stem.move_to((0.0, -g.height / 2.0));
            stem.line_to(knob);
            target.stroke_path(&stem, 1.0, selection_color());

            let circle = Circle::new(knob, size / 2.0).to_path(TOLERANCE);
            target.fill_path(&circle, Color::WHITE);
            target.stroke_path(&circle, 1.5, selection_color());

            for kind in HIT_PRIORITY {
                if matches!(kind, HandleKind::Body | HandleKind::Rotate) {
                    continue;
                }
                let square = handle_rect(&g, kind, size, offset).to_path(TOLERANCE);
                target.fill_path(&square, Color::WHITE);
                target.stroke_path(&square, 1.5, selection_color());
            }
        }
        target.restore();
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyGroup> {
        Vec::new()
    }
}
