//! Handle placement and rotation-aware hit testing.

use super::{Corner, Edge, HandleKind};
use crate::objects::Geometry;
use kurbo::{Point, Rect, Size};

/// Order in which handles are tested; the first match wins.
pub const HIT_PRIORITY: [HandleKind; 10] = [
    HandleKind::Rotate,
    HandleKind::Corner(Corner::TopLeft),
    HandleKind::Corner(Corner::TopRight),
    HandleKind::Corner(Corner::BottomLeft),
    HandleKind::Corner(Corner::BottomRight),
    HandleKind::Edge(Edge::Top),
    HandleKind::Edge(Edge::Right),
    HandleKind::Edge(Edge::Bottom),
    HandleKind::Edge(Edge::Left),
    HandleKind::Body,
];

/// Drawn handle square in the object's local, center-origin frame.
pub fn handle_rect(geometry: &Geometry, kind: HandleKind, handle_size: f64, rotate_offset: f64) -> Rect {
    let (hw, hh) = (geometry.width / 2.0, geometry.height / 2.0);
    let square = |center: Point| Rect::from_center_size(center, Size::new(handle_size, handle_size));
    match kind {
        HandleKind::Body => geometry.local_rect(),
        HandleKind::Rotate => square(Point::new(0.0, -hh - rotate_offset)),
        HandleKind::Corner(c) => {
            let (sx, sy) = c.signs();
            square(Point::new(sx * hw, sy * hh))
        }
        HandleKind::Edge(e) => {
            let (sx, sy) = e.signs();
            square(Point::new(sx * hw, sy * hh))
        }
    }
}

/// Hit area of a handle: the drawn square doubled, so small handles stay
/// easy to grab. The body hit area is the object box itself.
pub fn handle_hit_rect(geometry: &Geometry, kind: HandleKind, handle_size: f64, rotate_offset: f64) -> Rect {
    let rect = handle_rect(geometry, kind, handle_size, rotate_offset);
    match kind {
        HandleKind::Body => rect,
        _ => rect.inflate(handle_size / 2.0, handle_size / 2.0),
    }
}

/// Find the handle under a world-space point.
pub fn hit_handle(geometry: &Geometry, point: Point, handle_size: f64, rotate_offset: f64) -> Option<HandleKind> {
    let local = geometry.to_local(point);
    HIT_PRIORITY
        .iter()
        .copied()
        .find(|&kind| handle_hit_rect(geometry, kind, handle_size, rotate_offset).contains(local))
}
