//! Element type to renderer lookup.

use crate::elements::{ElementRenderer, ImageRenderer, ShapeRenderer, TextRenderer, TransformRenderer};
use hemp_core::objects::ElementType;
use hemp_core::{PropertyGroup, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Memoizes one renderer per element type.
#[derive(Default)]
pub struct ElementFactory {
    renderers: RefCell<HashMap<ElementType, Rc<dyn ElementRenderer>>>,
    /// Shared with the `Transform` entry of `renderers`.
    overlay: Rc<TransformRenderer>,
}

impl ElementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element_type: ElementType) -> Rc<dyn ElementRenderer> {
        self.renderers
            .borrow_mut()
            .entry(element_type)
            .or_insert_with(|| self.create(element_type))
            .clone()
    }

    /// Look a renderer up by type tag; unknown tags are an error.
    pub fn from_tag(&self, tag: &str) -> Result<Rc<dyn ElementRenderer>> {
        Ok(self.get(tag.parse()?))
    }

    /// The overlay renderer, with its hit-test entry point.
    pub fn transform(&self) -> Rc<TransformRenderer> {
        Rc::clone(&self.overlay)
    }

    /// Property groups of every drawable element type, keyed by type tag.
    pub fn property_registry(&self) -> BTreeMap<String, Vec<PropertyGroup>> {
        ElementType::all()
            .iter()
            .filter(|&&t| t != ElementType::Transform)
            .map(|&t| (t.tag().to_string(), self.get(t).properties()))
            .collect()
    }

    pub fn clear(&self) {
        self.renderers.borrow_mut().clear();
    }

    fn create(&self, element_type: ElementType) -> Rc<dyn ElementRenderer> {
        log::debug!("creating {} renderer", element_type.tag());
        match element_type {
            ElementType::Image => Rc::new(ImageRenderer),
            ElementType::Text => Rc::new(TextRenderer),
            ElementType::Shape => Rc::new(ShapeRenderer),
            ElementType::Transform => self.overlay.clone(),
        }
    }
}
