//! State of an active manipulation.

use super::{Anchor, HandleKind};
use crate::objects::{Corners, Geometry};
use kurbo::{Point, Vec2};

/// Ephemeral state between pointer-down on a handle and pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSession {
    /// The handle being dragged.
    pub handle: HandleKind,
    /// Part of the object held fixed, for resize handles.
    pub anchor: Option<Anchor>,
    /// Geometry before the manipulation started.
    pub origin: Geometry,
    /// World corners before the manipulation started.
    pub corners: Corners,
    /// Pointer position at pointer-down.
    pub pointer: Point,
    /// Latest pointer position.
    pub current: Point,
    /// The object is currently maximized by a drag above the canvas.
    pub maximized: bool,
    /// Number of move updates processed.
    pub updates: u32,
}

impl TransformSession {
    pub fn new(handle: HandleKind, origin: Geometry, pointer: Point) -> Self {
        Self {
            handle,
            anchor: handle.anchor(),
            origin,
            corners: origin.corners(),
            pointer,
            current: pointer,
            maximized: false,
            updates: 0,
        }
    }

    /// Pointer movement since the session began.
    pub fn delta(&self) -> Vec2 {
        self.current - self.pointer
    }

    /// World position of the anchor in the pre-transform snapshot.
    pub fn anchor_point(&self) -> Option<Point> {
        let c = &self.corners;
        let mid = |a: Point, b: Point| a.midpoint(b);
        self.anchor.map(|anchor| match anchor {
            Anchor::Corner(corner) => match corner {
                super::Corner::TopLeft => c.ul,
                super::Corner::TopRight => c.ur,
                super::Corner::BottomLeft => c.ll,
                super::Corner::BottomRight => c.lr,
            },
            Anchor::Edge(edge) => match edge {
                super::Edge::Top => mid(c.ul, c.ur),
                super::Edge::Right => mid(c.ur, c.lr),
                super::Edge::Bottom => mid(c.ll, c.lr),
                super::Edge::Left => mid(c.ul, c.ll),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Corner, Edge};

    #[test]
    fn test_anchor_snapshot() {
        let g = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let session = TransformSession::new(HandleKind::Corner(Corner::TopRight), g, Point::new(200.0, 50.0));
        assert_eq!(session.anchor_point(), Some(Point::new(0.0, 150.0)));

        let session = TransformSession::new(HandleKind::Edge(Edge::Top), g, Point::new(100.0, 50.0));
        assert_eq!(session.anchor_point(), Some(Point::new(100.0, 150.0)));

        let session = TransformSession::new(HandleKind::Body, g, Point::new(100.0, 100.0));
        assert_eq!(session.anchor_point(), None);
    }
}
