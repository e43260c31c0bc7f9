//! Live objects: a public scene object plus its runtime-only state.

use super::SceneObject;
use crate::transform::TransformSession;
use uuid::Uuid;

/// Stable identity assigned by the controller on first sight.
pub type ObjectId = Uuid;

/// Runtime-only state. Never serialized.
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    pub selected: bool,
    /// Description of the last resource failure, if any.
    pub error: Option<String>,
    /// Whether the custom font (if any) is ready to draw with.
    pub font_loaded: bool,
    /// The transform in progress, if this object is being manipulated.
    pub session: Option<TransformSession>,
}

/// A scene object as held by the controller.
#[derive(Debug, Clone)]
pub struct LiveObject {
    id: ObjectId,
    pub object: SceneObject,
    pub runtime: RuntimeState,
}

impl LiveObject {
    /// Wrap an object under a fresh identity.
    pub fn new(mut object: SceneObject) -> Self {
        object.geometry = object.geometry.normalized();
        Self {
            id: Uuid::new_v4(),
            object,
            runtime: RuntimeState::default(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.runtime.selected
    }

    /// The cleaned, serializable snapshot.
    pub fn snapshot(&self) -> SceneObject {
        self.object.clone()
    }

    /// The public object paired with its identity, for handing back to
    /// [`crate::reconcile::reconcile`].
    pub fn tracked(&self) -> Tracked {
        Tracked {
            id: Some(self.id),
            object: self.object.clone(),
        }
    }
}

/// An incoming object, optionally carrying an identity received earlier.
#[derive(Debug, Clone)]
pub struct Tracked {
    pub id: Option<ObjectId>,
    pub object: SceneObject,
}

impl Tracked {
    pub fn new(id: ObjectId, object: SceneObject) -> Self {
        Self {
            id: Some(id),
            object,
        }
    }
}

impl From<SceneObject> for Tracked {
    fn from(object: SceneObject) -> Self {
        Self { id: None, object }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Geometry;

    #[test]
    fn test_new_normalizes_rotation() {
        let mut object = SceneObject::rectangle(Geometry::new(0.0, 0.0, 10.0, 10.0), "#000000");
        object.geometry.rotation = 450.0;
        let live = LiveObject::new(object);
        assert_eq!(live.object.geometry.rotation, 90.0);
        assert!(!live.is_selected());
    }
}
