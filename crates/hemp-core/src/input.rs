//! Pointer events and modifier keys.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
///
/// `alt` enables canvas snapping while moving and fixed-center resizing;
/// `shift` snaps rotation and keeps the aspect ratio on corner resizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Parse a `+`-separated list such as `alt+shift`.
    pub fn parse(list: &str) -> Self {
        let mut mods = Self::NONE;
        for key in list.split('+').map(str::trim) {
            match key.to_ascii_lowercase().as_str() {
                "shift" => mods.shift = true,
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "meta" | "cmd" => mods.meta = true,
                _ => {}
            }
        }
        mods
    }
}

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, modifiers: Modifiers },
    Move { position: Point, modifiers: Modifiers },
    Up { position: Point, modifiers: Modifiers },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifiers() {
        let mods = Modifiers::parse("alt+Shift");
        assert!(mods.alt && mods.shift && !mods.ctrl && !mods.meta);
        assert_eq!(Modifiers::parse(""), Modifiers::NONE);
    }
}
