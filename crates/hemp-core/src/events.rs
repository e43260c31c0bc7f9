//! Notifications emitted by the scene controller.

use crate::objects::SceneObject;

/// Event dispatched to the host. Object payloads are cleaned snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Select(SceneObject),
    Deselect(SceneObject),
    Transform(SceneObject),
    /// Average updates per second of the finished transform session.
    FrameRate(f64),
}

impl SceneEvent {
    /// Event name as seen by DOM listeners.
    pub fn name(&self) -> &'static str {
        match self {
            SceneEvent::Select(_) => "select",
            SceneEvent::Deselect(_) => "deselect",
            SceneEvent::Transform(_) => "transform",
            SceneEvent::FrameRate(_) => "framerate",
        }
    }

    pub fn object(&self) -> Option<&SceneObject> {
        match self {
            SceneEvent::Select(o) | SceneEvent::Deselect(o) | SceneEvent::Transform(o) => Some(o),
            SceneEvent::FrameRate(_) => None,
        }
    }
}
