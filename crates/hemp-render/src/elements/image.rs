//! Crop-filled images.

use super::{ElementRenderer, RenderEnv, render_placeholder};
use crate::preload::{PreloadContext, PreloadTask, Preloaded};
use crate::surface::Surface;
use hemp_core::objects::{CompositeMode, ElementKind, ElementType, ImageProps, LiveObject};
use hemp_core::properties::{PropertyDescriptor, PropertyGroup, PropertyKind, appearance_group, geometry_group};
use hemp_core::{HempError, Result};
use kurbo::{Rect, Size};
use serde_json::json;

#[derive(Debug, Default)]
pub struct ImageRenderer;

impl ImageRenderer {
    fn props(live: &LiveObject) -> Result<&ImageProps> {
        match &live.object.kind {
            ElementKind::Image(props) => Ok(props),
            _ => Err(HempError::InvalidObject("expected an image".to_string())),
        }
    }
}

impl ElementRenderer for ImageRenderer {
    fn element_type(&self) -> ElementType {
        ElementType::Image
    }

    fn needs_preload(&self, env: &mut RenderEnv, live: &LiveObject) -> bool {
        match Self::props(live) {
            Ok(props) => !props.src.is_empty() && env.images.get(&props.src).is_none(),
            Err(_) => false,
        }
    }

    fn preload(&self, live: &LiveObject, ctx: &PreloadContext) -> Option<PreloadTask> {
        let src = Self::props(live).ok()?.src.clone();
        let url = ctx.rewriter.rewrite(&src);
        let loader = ctx.loader.clone();
        let id = live.id();
        Some(Box::pin(async move {
            let result = loader.load_image(&url).await;
            (id, result.map(|image| Preloaded::Image { src, image }))
        }))
    }

    fn render_element(&self, env: &mut RenderEnv, surface: &mut dyn Surface, live: &LiveObject) -> Result<()> {
        let props = Self::props(live)?;
        let Some(image) = env.images.get(&props.src) else {
            let message = live.runtime.error.as_deref().unwrap_or("loading");
            render_placeholder(surface, message);
            return Ok(());
        };
        let dest = Size::new(f64::from(surface.width()), f64::from(surface.height()));
        let source = Size::new(f64::from(image.width), f64::from(image.height));
        let crop = props.crop_rect(source, dest);
        surface.draw_image(&image, crop, Rect::from_origin_size((0.0, 0.0), dest));
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyGroup> {
        let modes: Vec<&str> = CompositeMode::all().iter().map(CompositeMode::name).collect();
        vec![
            geometry_group(),
            PropertyGroup::new(
                "image",
                "Image",
                vec![
                    PropertyDescriptor::new("src", "Source", PropertyKind::Url, json!("")),
                    PropertyDescriptor::dropdown("valign", "Crop", &["top", "middle", "bottom"], "top"),
                ],
            ),
            appearance_group(&modes),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preload::MemoryLoader;
    use crate::raster::PixelSurface;
    use hemp_core::objects::{Geometry, SceneObject, VerticalAlign};
    use hemp_core::{HempConfig, ManualClock};
    use kurbo::Shape;
    use peniko::Color;
    use std::rc::Rc;

    fn env() -> RenderEnv {
        RenderEnv::new(&HempConfig::default(), Rc::new(ManualClock::new(0)))
    }

    /// 10x20 image: top half red, bottom half blue.
    fn two_tone() -> peniko::ImageData {
        let mut s = PixelSurface::new(10, 20);
        s.fill_path(&Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1), Color::from_rgba8(255, 0, 0, 255));
        s.fill_path(&Rect::new(0.0, 10.0, 10.0, 20.0).to_path(0.1), Color::from_rgba8(0, 0, 255, 255));
        s.snapshot()
    }

    #[test]
    fn test_needs_preload_until_cached() {
        let mut env = env();
        let live = LiveObject::new(SceneObject::image(Geometry::new(5.0, 5.0, 10.0, 10.0), "a.png"));
        assert!(ImageRenderer.needs_preload(&mut env, &live));
        env.images.set("a.png", two_tone());
        assert!(!ImageRenderer.needs_preload(&mut env, &live));
    }

    #[test]
    fn test_crop_keeps_valign() {
        let mut env = env();
        env.images.set("a.png", two_tone());
        let mut object = SceneObject::image(Geometry::new(5.0, 5.0, 10.0, 10.0), "a.png");
        let mut surface = PixelSurface::new(10, 10);

        ImageRenderer
            .render_element(&mut env, &mut surface, &LiveObject::new(object.clone()))
            .unwrap();
        assert_eq!(surface.pixel(5, 5), [255, 0, 0, 255]);

        if let ElementKind::Image(props) = &mut object.kind {
            props.valign = VerticalAlign::Bottom;
        }
        ImageRenderer
            .render_element(&mut env, &mut surface, &LiveObject::new(object))
            .unwrap();
        assert_eq!(surface.pixel(5, 5), [0, 0, 255, 255]);
    }

    #[test]
    fn test_placeholder_when_missing() {
        let mut live = LiveObject::new(SceneObject::image(Geometry::new(20.0, 20.0, 40.0, 40.0), "gone.png"));
        live.runtime.error = Some("Failed to load image gone.png: not found".to_string());
        let mut surface = PixelSurface::new(40, 40);
        ImageRenderer.render_element(&mut env(), &mut surface, &live).unwrap();
        assert_eq!(surface.alpha_at(0, 0), 255);
    }

    #[test]
    fn test_preload_uses_reflector() {
        let loader = Rc::new(MemoryLoader::new());
        let config = HempConfig {
            reflector: Some("https://proxy.test/?u={{url}}".to_string()),
            ..HempConfig::default()
        };
        let ctx = PreloadContext::new(loader.clone(), &config);
        let live = LiveObject::new(SceneObject::image(Geometry::default(), "https://a.test/b.png"));
        let task = ImageRenderer.preload(&live, &ctx).unwrap();
        let (id, result) = pollster::block_on(task);
        assert_eq!(id, live.id());
        assert!(result.is_err());
        assert_eq!(
            loader.requested(),
            vec!["https://proxy.test/?u=https%3A%2F%2Fa.test%2Fb.png".to_string()]
        );
    }
}
