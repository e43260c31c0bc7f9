//! Scripted pointer gestures for headless runs.

use crate::AppError;
use hemp_core::{Modifiers, PointerEvent};
use kurbo::Point;
use std::str::FromStr;

/// Intermediate move events between press and release.
const MOVE_STEPS: usize = 8;

/// A press at `from`, a straight drag, and a release at `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub from: Point,
    pub to: Point,
    pub modifiers: Modifiers,
}

impl Gesture {
    pub fn new(from: impl Into<Point>, to: impl Into<Point>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// The pointer event sequence for this gesture.
    pub fn events(&self) -> Vec<PointerEvent> {
        let mut events = Vec::with_capacity(MOVE_STEPS + 2);
        events.push(PointerEvent::Down {
            position: self.from,
            modifiers: self.modifiers,
        });
        for step in 1..=MOVE_STEPS {
            let t = step as f64 / MOVE_STEPS as f64;
            events.push(PointerEvent::Move {
                position: self.from.lerp(self.to, t),
                modifiers: self.modifiers,
            });
        }
        events.push(PointerEvent::Up {
            position: self.to,
            modifiers: self.modifiers,
        });
        events
    }
}

fn parse_point(text: &str) -> Option<Point> {
    let (x, y) = text.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

impl FromStr for Gesture {
    type Err = AppError;

    /// Parses `x0,y0:x1,y1` with an optional `:alt+shift` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Gesture(s.to_string());
        let mut parts = s.split(':');
        let from = parts.next().and_then(parse_point).ok_or_else(invalid)?;
        let to = parts.next().and_then(parse_point).ok_or_else(invalid)?;
        let modifiers = parts.next().map(Modifiers::parse).unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { from, to, modifiers })
    }
}
