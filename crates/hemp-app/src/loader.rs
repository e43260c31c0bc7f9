//! Media loading from the local filesystem.

use hemp_core::ResourceError;
use hemp_render::{BoxFuture, MediaLoader};
use peniko::{Blob, ImageAlphaType, ImageData, ImageFormat};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Resolves media URLs against a base directory.
///
/// Only local paths and `file://` URLs are supported. Fonts are checked for
/// existence and then registered by family; the software surface draws
/// families it does not bundle with its sans-serif face.
#[derive(Debug, Default)]
pub struct FsLoader {
    base: PathBuf,
    fonts: RefCell<HashSet<String>>,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            fonts: RefCell::new(HashSet::new()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, String> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.contains("://") {
            return Err(format!("remote media is not supported: {url}"));
        }
        let path = Path::new(path);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        })
    }
}

/// Decode PNG/JPEG/WebP bytes into straight-alpha RGBA8.
fn decode_image(bytes: &[u8]) -> Result<ImageData, String> {
    let rgba = image::load_from_memory(bytes).map_err(|err| err.to_string())?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        data: Blob::new(Arc::new(rgba.into_raw())),
        format: ImageFormat::Rgba8,
        alpha_type: ImageAlphaType::Alpha,
        width,
        height,
    })
}

impl MediaLoader for FsLoader {
    fn load_image(&self, url: &str) -> BoxFuture<'_, Result<ImageData, ResourceError>> {
        let url = url.to_string();
        Box::pin(async move {
            let path = self.resolve(&url).map_err(ResourceError::Unsupported)?;
            let bytes = std::fs::read(&path).map_err(|err| ResourceError::ImageLoad {
                url: url.clone(),
                reason: err.to_string(),
            })?;
            log::debug!("decoding {} ({} bytes)", path.display(), bytes.len());
            decode_image(&bytes).map_err(|reason| ResourceError::ImageDecode { url, reason })
        })
    }

    fn load_font(&self, family: &str, url: &str) -> BoxFuture<'_, Result<(), ResourceError>> {
        let family = family.to_string();
        let url = url.to_string();
        Box::pin(async move {
            let path = self.resolve(&url).map_err(ResourceError::Unsupported)?;
            if !path.is_file() {
                return Err(ResourceError::FontLoad {
                    family,
                    reason: format!("{} not found", path.display()),
                });
            }
            self.fonts.borrow_mut().insert(family);
            Ok(())
        })
    }

    fn font_ready(&self, family: &str) -> bool {
        self.fonts.borrow().contains(family)
    }

    fn sleep(&self, ms: u64) -> BoxFuture<'_, ()> {
        Box::pin(async move { std::thread::sleep(Duration::from_millis(ms)) })
    }
}
