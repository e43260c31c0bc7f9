//! Hemp Core Library
//!
//! Platform-agnostic scene model, reconciliation and transform math for the
//! Hemp canvas editor.

pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod objects;
pub mod properties;
pub mod reconcile;
pub mod transform;

pub use cache::{Clock, ManualClock, MediaCache, SystemClock};
pub use color::{HexColor, parse_color, rgba_string};
pub use config::{HempConfig, REFLECTOR_PLACEHOLDER};
pub use error::{HempError, ResourceError, Result};
pub use events::SceneEvent;
pub use input::{Modifiers, PointerEvent};
pub use objects::{
    Background, CompositeMode, ElementKind, ElementType, Geometry, LiveObject, ObjectId, SceneObject, Tracked,
    VerticalAlign,
};
pub use properties::{PropertyDescriptor, PropertyGroup, PropertyKind};
pub use reconcile::{ReconcileSummary, reconcile};
pub use transform::{Corner, Edge, EngineSettings, HandleKind, TransformEngine, TransformSession};
