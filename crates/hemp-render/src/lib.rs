//! Hemp Render Library
//!
//! Drawing surface abstraction, text layout, element renderers and the scene
//! controller. The bundled [`PixelSurface`] renders headlessly on the CPU.

pub mod elements;
pub mod factory;
mod fonts;
pub mod hemp;
pub mod preload;
pub mod raster;
pub mod surface;
pub mod text;

pub use elements::{ElementRenderer, RenderEnv, RenderMode};
pub use factory::ElementFactory;
pub use hemp::{Hemp, Listener, SetObjectsOutcome};
pub use preload::{BoxFuture, MediaLoader, MemoryLoader, PreloadContext, Preloaded, UrlRewriter};
pub use raster::PixelSurface;
pub use surface::{Shadow, Surface};
pub use text::{FontMetrics, FontMetricsCache, make_word_wrap_rows, render_text};
