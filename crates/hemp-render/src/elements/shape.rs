//! Solid rectangles and ellipses.

use super::{ElementRenderer, RenderEnv, TOLERANCE};
use crate::surface::Surface;
use hemp_core::color::parse_color;
use hemp_core::objects::{CompositeMode, ElementKind, ElementType, LiveObject, ShapeKind, ShapeProps};
use hemp_core::properties::{PropertyDescriptor, PropertyGroup, appearance_group, geometry_group};
use hemp_core::{HempError, Result};
use kurbo::{BezPath, Ellipse, Rect, RoundedRect, Shape};
use peniko::Color;

#[derive(Debug, Default)]
pub struct ShapeRenderer;

impl ShapeRenderer {
    fn outline(props: &ShapeProps, width: f64, height: f64) -> BezPath {
        let bounds = Rect::new(0.0, 0.0, width, height);
        match props.shape {
            ShapeKind::Rectangle => {
                let radius = props.radius.clamp(0.0, width.min(height) / 2.0);
                RoundedRect::from_rect(bounds, radius).to_path(TOLERANCE)
            }
            ShapeKind::Ellipse => Ellipse::from_rect(bounds).to_path(TOLERANCE),
        }
    }

    fn props(live: &LiveObject) -> Result<&ShapeProps> {
        match &live.object.kind {
            ElementKind::Shape(props) => Ok(props),
            _ => Err(HempError::InvalidObject("expected a shape".to_string())),
        }
    }
}

impl ElementRenderer for ShapeRenderer {
    fn element_type(&self) -> ElementType {
        ElementType::Shape
    }

    fn render_element(&self, _env: &mut RenderEnv, surface: &mut dyn Surface, live: &LiveObject) -> Result<()> {
        let props = Self::props(live)?;
        let color = parse_color(&props.color, props.alpha)?;
        let path = Self::outline(props, f64::from(surface.width()), f64::from(surface.height()));
        surface.fill_path(&path, color);
        Ok(())
    }

    fn render_hit_mask(&self, surface: &mut dyn Surface, live: &LiveObject) -> Result<()> {
        let props = Self::props(live)?;
        let path = Self::outline(props, f64::from(surface.width()), f64::from(surface.height()));
        surface.fill_path(&path, Color::BLACK);
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyGroup> {
        let modes: Vec<&str> = CompositeMode::all().iter().map(CompositeMode::name).collect();
        vec![
            geometry_group(),
            PropertyGroup::new(
                "shape",
                "Shape",
                vec![
                    PropertyDescriptor::dropdown("shape", "Shape", &["rectangle", "ellipse"], "rectangle"),
                    PropertyDescriptor::color("color", "Color", "#000000"),
                    PropertyDescriptor::range("alpha", "Opacity", 0.0, 1.0, 0.01, 1.0),
                    PropertyDescriptor::integer("radius", "Corner radius", 0, 500, 0),
                ],
            ),
            appearance_group(&modes),
        ]
    }
}
