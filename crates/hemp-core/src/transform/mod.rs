//! Interactive transform engine: handles, sessions and geometry math.

mod engine;
mod handles;
mod session;

pub use engine::{EngineSettings, TransformEngine};
pub use handles::{HIT_PRIORITY, handle_hit_rect, handle_rect, hit_handle};
pub use session::TransformSession;

use serde::{Deserialize, Serialize};

/// Which part of a selected object a pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// The object itself (move).
    Body,
    /// Corner handle (resize both dimensions).
    Corner(Corner),
    /// Edge midpoint handle (resize one dimension).
    Edge(Edge),
    /// Rotation handle, above the top edge.
    Rotate,
}

/// Corner positions (ul, ur, ll, lr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The diagonally opposite corner.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Unit direction of this corner from the center in the local frame.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Corner::TopLeft => "ul",
            Corner::TopRight => "ur",
            Corner::BottomLeft => "ll",
            Corner::BottomRight => "lr",
        }
    }
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub fn opposite(self) -> Self {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Right => Edge::Left,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
        }
    }

    /// Unit direction of this edge's midpoint from the center; the axis the
    /// edge does not move along is zero.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Edge::Top => (0.0, -1.0),
            Edge::Right => (1.0, 0.0),
            Edge::Bottom => (0.0, 1.0),
            Edge::Left => (-1.0, 0.0),
        }
    }
}

/// The part of the object held fixed during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Corner(Corner),
    Edge(Edge),
}

impl HandleKind {
    /// Anchor for a resize handle; body and rotate have none.
    pub fn anchor(self) -> Option<Anchor> {
        match self {
            HandleKind::Corner(c) => Some(Anchor::Corner(c.opposite())),
            HandleKind::Edge(e) => Some(Anchor::Edge(e.opposite())),
            HandleKind::Body | HandleKind::Rotate => None,
        }
    }

    /// Local direction signs for resize handles.
    pub fn signs(self) -> Option<(f64, f64)> {
        match self {
            HandleKind::Corner(c) => Some(c.signs()),
            HandleKind::Edge(e) => Some(e.signs()),
            HandleKind::Body | HandleKind::Rotate => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Body => "body",
            HandleKind::Corner(c) => c.short_name(),
            HandleKind::Edge(Edge::Top) => "top",
            HandleKind::Edge(Edge::Right) => "right",
            HandleKind::Edge(Edge::Bottom) => "bottom",
            HandleKind::Edge(Edge::Left) => "left",
            HandleKind::Rotate => "rotate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_is_diagonal_opposite() {
        assert_eq!(
            HandleKind::Corner(Corner::TopLeft).anchor(),
            Some(Anchor::Corner(Corner::BottomRight))
        );
        assert_eq!(
            HandleKind::Corner(Corner::TopRight).anchor(),
            Some(Anchor::Corner(Corner::BottomLeft))
        );
        assert_eq!(HandleKind::Edge(Edge::Left).anchor(), Some(Anchor::Edge(Edge::Right)));
        assert_eq!(HandleKind::Body.anchor(), None);
        assert_eq!(HandleKind::Rotate.anchor(), None);
    }
}
