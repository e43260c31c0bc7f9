//! Word-wrapped text with optional custom fonts.

use super::{ElementRenderer, RenderEnv, render_placeholder};
use crate::preload::{PreloadContext, PreloadTask, Preloaded, wait_for_font};
use crate::surface::Surface;
use crate::text::render_text;
use hemp_core::objects::{CompositeMode, ElementKind, ElementType, LiveObject, TextProps};
use hemp_core::properties::{PropertyDescriptor, PropertyGroup, PropertyKind, appearance_group, geometry_group};
use hemp_core::{HempError, Result};
use serde_json::json;

#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn props(live: &LiveObject) -> Result<&TextProps> {
        match &live.object.kind {
            ElementKind::Text(props) => Ok(props),
            _ => Err(HempError::InvalidObject("expected text".to_string())),
        }
    }

    fn font_loaded(env: &RenderEnv, live: &LiveObject, props: &TextProps) -> bool {
        match &props.custom_font {
            Some(font) => live.runtime.font_loaded || env.loaded_fonts.contains(&font.family),
            None => true,
        }
    }
}

impl ElementRenderer for TextRenderer {
    fn element_type(&self) -> ElementType {
        ElementType::Text
    }

    fn needs_preload(&self, env: &mut RenderEnv, live: &LiveObject) -> bool {
        Self::props(live).is_ok_and(|props| !Self::font_loaded(env, live, props))
    }

    fn preload(&self, live: &LiveObject, ctx: &PreloadContext) -> Option<PreloadTask> {
        let font = Self::props(live).ok()?.custom_font.clone()?;
        let url = ctx.rewriter.rewrite(&font.url);
        let loader = ctx.loader.clone();
        let (timeout, poll) = (ctx.font_timeout_ms, ctx.font_poll_ms);
        let id = live.id();
        Some(Box::pin(async move {
            let result = match loader.load_font(&font.family, &url).await {
                Ok(()) => wait_for_font(loader.as_ref(), &font.family, timeout, poll).await,
                Err(err) => Err(err),
            };
            (id, result.map(|()| Preloaded::Font { family: font.family.clone() }))
        }))
    }

    fn render_element(&self, env: &mut RenderEnv, surface: &mut dyn Surface, live: &LiveObject) -> Result<()> {
        let props = Self::props(live)?;
        if !Self::font_loaded(env, live, props) {
            let message = live.runtime.error.as_deref().unwrap_or("loading");
            render_placeholder(surface, message);
            return Ok(());
        }
        let font = props.font(props.custom_font.is_some());
        let line_height = props.line_height.unwrap_or(env.line_height);
        render_text(surface, &mut env.metrics, props, &font, line_height)?;
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyGroup> {
        let modes: Vec<&str> = CompositeMode::all().iter().map(CompositeMode::name).collect();
        vec![
            geometry_group(),
            PropertyGroup::new(
                "text",
                "Text",
                vec![
                    PropertyDescriptor::new("text", "Text", PropertyKind::Text, json!("")),
                    PropertyDescriptor::dropdown(
                        "fontFamily",
                        "Font",
                        &["sans-serif", "serif", "monospace"],
                        "sans-serif",
                    ),
                    PropertyDescriptor::integer("fontSize", "Font size", 6, 400, 24),
                    PropertyDescriptor::new("customFont.url", "Custom font", PropertyKind::Url, json!("")),
                    PropertyDescriptor::color("color", "Color", "#000000"),
                    PropertyDescriptor::range("alpha", "Opacity", 0.0, 1.0, 0.01, 1.0),
                    PropertyDescriptor::dropdown("align", "Align", &["left", "center", "right"], "left"),
                    PropertyDescriptor::dropdown("valign", "Vertical align", &["top", "middle", "bottom"], "top"),
                    PropertyDescriptor::dropdown(
                        "decoration",
                        "Decoration",
                        &["none", "underline", "strikethrough"],
                        "none",
                    ),
                    PropertyDescriptor::range("lineHeight", "Line height", 0.5, 4.0, 0.1, 1.5),
                ],
            ),
            PropertyGroup::new(
                "padding",
                "Padding",
                ["top", "right", "bottom", "left"]
                    .iter()
                    .map(|side| PropertyDescriptor::integer(&format!("padding.{side}"), side, 0, 500, 0))
                    .collect(),
            ),
            PropertyGroup::new(
                "shadow",
                "Shadow",
                vec![
                    PropertyDescriptor::color("shadow.color", "Color", "#000000"),
                    PropertyDescriptor::range("shadow.alpha", "Opacity", 0.0, 1.0, 0.01, 0.5),
                    PropertyDescriptor::integer("shadow.offsetX", "Offset X", -100, 100, 2),
                    PropertyDescriptor::integer("shadow.offsetY", "Offset Y", -100, 100, 2),
                    PropertyDescriptor::integer("shadow.blur", "Blur", 0, 100, 0),
                ],
            ),
            appearance_group(&modes),
        ]
    }
}
