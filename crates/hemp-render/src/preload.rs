//! Asynchronous media loading.
//!
//! Fetching is delegated to a host-provided [`MediaLoader`]; this module adds
//! URL rewriting through an optional reflector and the bounded font wait.

use hemp_core::config::REFLECTOR_PLACEHOLDER;
use hemp_core::{HempConfig, ObjectId, ResourceError};
use peniko::ImageData;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Result of loading one resource.
pub type LoadResult<T> = Result<T, ResourceError>;

/// A resource made available by a finished preload.
#[derive(Debug, Clone)]
pub enum Preloaded {
    /// Decoded image, keyed by the object's original `src`.
    Image { src: String, image: ImageData },
    /// Custom font family now usable for drawing.
    Font { family: String },
}

/// A pending preload for one object.
pub type PreloadTask = BoxFuture<'static, (ObjectId, LoadResult<Preloaded>)>;

/// Host backend for fetching media.
///
/// Browsers implement this over `fetch`/`Image` and `FontFace`; the CLI reads
/// local files. The controller is single-threaded, so there are no `Send`
/// bounds.
pub trait MediaLoader {
    /// Fetch and decode an image.
    fn load_image(&self, url: &str) -> BoxFuture<'_, LoadResult<ImageData>>;

    /// Register a font face for `family` from `url`.
    fn load_font(&self, family: &str, url: &str) -> BoxFuture<'_, LoadResult<()>>;

    /// Whether `family` can be drawn with yet.
    fn font_ready(&self, family: &str) -> bool;

    /// Resolve after roughly `ms` milliseconds.
    fn sleep(&self, ms: u64) -> BoxFuture<'_, ()>;
}

/// Rewrites media URLs through a reflector template such as
/// `https://proxy.example/?u={{url}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlRewriter {
    template: Option<String>,
}

impl UrlRewriter {
    pub fn new(template: Option<String>) -> Self {
        Self { template }
    }

    pub fn rewrite(&self, url: &str) -> String {
        match &self.template {
            Some(template) => {
                let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
                template.replace(REFLECTOR_PLACEHOLDER, &encoded)
            }
            None => url.to_string(),
        }
    }
}

/// Everything a renderer needs to start a preload.
#[derive(Clone)]
pub struct PreloadContext {
    pub loader: Rc<dyn MediaLoader>,
    pub rewriter: UrlRewriter,
    pub font_timeout_ms: u64,
    pub font_poll_ms: u64,
}

impl PreloadContext {
    pub fn new(loader: Rc<dyn MediaLoader>, config: &HempConfig) -> Self {
        Self {
            loader,
            rewriter: UrlRewriter::new(config.reflector.clone()),
            font_timeout_ms: config.font_timeout_ms,
            font_poll_ms: config.font_poll_ms,
        }
    }
}

/// Poll until `family` is ready, giving up after `timeout_ms`.
pub async fn wait_for_font(
    loader: &dyn MediaLoader,
    family: &str,
    timeout_ms: u64,
    poll_ms: u64,
) -> LoadResult<()> {
    let poll_ms = poll_ms.max(1);
    let mut waited = 0;
    loop {
        if loader.font_ready(family) {
            return Ok(());
        }
        if waited >= timeout_ms {
            return Err(ResourceError::FontTimeout {
                family: family.to_string(),
                waited_ms: waited,
            });
        }
        loader.sleep(poll_ms).await;
        waited += poll_ms;
    }
}

/// In-memory loader for tests and embedded assets.
///
/// Fonts become ready after a configurable number of polls; sleeping
/// resolves immediately.
#[derive(Default)]
pub struct MemoryLoader {
    images: HashMap<String, ImageData>,
    fonts: HashMap<String, u32>,
    polls: RefCell<HashMap<String, u32>>,
    requested: RefCell<Vec<String>>,
    registered: RefCell<HashSet<String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: &str, image: ImageData) -> Self {
        self.images.insert(url.to_string(), image);
        self
    }

    /// Serve a font whose family reports ready after `polls` checks.
    pub fn with_font(mut self, url: &str, polls: u32) -> Self {
        self.fonts.insert(url.to_string(), polls);
        self
    }

    /// Every URL requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl MediaLoader for MemoryLoader {
    fn load_image(&self, url: &str) -> BoxFuture<'_, LoadResult<ImageData>> {
        let url = url.to_string();
        Box::pin(async move {
            self.requested.borrow_mut().push(url.clone());
            self.images.get(&url).cloned().ok_or_else(|| ResourceError::ImageLoad {
                url,
                reason: "not found".to_string(),
            })
        })
    }

    fn load_font(&self, family: &str, url: &str) -> BoxFuture<'_, LoadResult<()>> {
        let family = family.to_string();
        let url = url.to_string();
        Box::pin(async move {
            self.requested.borrow_mut().push(url.clone());
            let Some(&polls) = self.fonts.get(&url) else {
                return Err(ResourceError::FontLoad {
                    family,
                    reason: format!("{url} not found"),
                });
            };
            self.polls.borrow_mut().insert(family.clone(), polls);
            self.registered.borrow_mut().insert(family);
            Ok(())
        })
    }

    fn font_ready(&self, family: &str) -> bool {
        if !self.registered.borrow().contains(family) {
            return false;
        }
        let mut polls = self.polls.borrow_mut();
        match polls.get_mut(family) {
            Some(0) | None => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
        }
    }

    fn sleep(&self, _ms: u64) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}
