//! Move, resize and rotate math.
//!
//! The engine is free of rendering side effects: every update returns the new
//! geometry and the caller decides what to do with it.

use super::{HandleKind, TransformSession};
use crate::config::HempConfig;
use crate::input::Modifiers;
use crate::objects::{Geometry, normalize_degrees};
use kurbo::{Affine, Point, Size};

/// Numeric parameters of the transform engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub canvas: Size,
    pub min_size: f64,
    pub snap_threshold: f64,
    pub rotate_snap_degrees: f64,
    pub drag_to_maximize: bool,
}

impl From<&HempConfig> for EngineSettings {
    fn from(config: &HempConfig) -> Self {
        Self {
            canvas: Size::new(f64::from(config.width), f64::from(config.height)),
            min_size: config.min_size,
            snap_threshold: config.snap_threshold,
            rotate_snap_degrees: config.rotate_snap_degrees,
            drag_to_maximize: config.drag_to_maximize,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&HempConfig::default())
    }
}

/// Stateless transform calculator; session state lives in [`TransformSession`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformEngine {
    settings: EngineSettings,
}

impl TransformEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Start a session on `handle` with the pointer at `pointer`.
    pub fn begin(&self, geometry: Geometry, handle: HandleKind, pointer: Point) -> TransformSession {
        log::debug!("transform begin: handle={} at ({}, {})", handle.name(), pointer.x, pointer.y);
        TransformSession::new(handle, geometry, pointer)
    }

    /// Compute the geometry for a pointer move. Rotation is in `[0, 360)`.
    pub fn update(&self, session: &mut TransformSession, pointer: Point, modifiers: Modifiers) -> Geometry {
        session.current = pointer;
        session.updates += 1;
        let geometry = match session.handle {
            HandleKind::Body => self.move_body(session, pointer, modifiers),
            HandleKind::Rotate => self.rotate(session, pointer, modifiers),
            HandleKind::Corner(_) | HandleKind::Edge(_) => self.resize(session, modifiers),
        };
        geometry.normalized()
    }

    /// Final geometry for a session: every field floored to an integer.
    pub fn finish(&self, session: &TransformSession, geometry: Geometry) -> Geometry {
        log::debug!(
            "transform end: handle={} after {} updates",
            session.handle.name(),
            session.updates
        );
        geometry.floored()
    }

    fn move_body(&self, session: &mut TransformSession, pointer: Point, modifiers: Modifiers) -> Geometry {
        if self.settings.drag_to_maximize && pointer.y < 0.0 {
            session.maximized = true;
            let canvas = self.settings.canvas;
            return Geometry::new(canvas.width / 2.0, canvas.height / 2.0, canvas.width, canvas.height);
        }
        session.maximized = false;

        let delta = session.delta();
        let mut geometry = session.origin;
        geometry.x += delta.x;
        geometry.y += delta.y;
        if modifiers.alt && self.snap_to_canvas(&mut geometry) {
            geometry.rotation = 0.0;
        }
        geometry
    }

    /// Snap edges, center or middle to the canvas bounds and midlines.
    /// At most one snap per axis. Returns whether anything snapped.
    fn snap_to_canvas(&self, geometry: &mut Geometry) -> bool {
        let canvas = self.settings.canvas;
        let threshold = self.settings.snap_threshold;
        let (hw, hh) = (geometry.width / 2.0, geometry.height / 2.0);

        // (current value, target, resulting center)
        let x_candidates = [
            (geometry.x - hw, 0.0, hw),
            (geometry.x + hw, canvas.width, canvas.width - hw),
            (geometry.x, canvas.width / 2.0, canvas.width / 2.0),
        ];
        let y_candidates = [
            (geometry.y - hh, 0.0, hh),
            (geometry.y + hh, canvas.height, canvas.height - hh),
            (geometry.y, canvas.height / 2.0, canvas.height / 2.0),
        ];
        let pick = |candidates: &[(f64, f64, f64)]| {
            candidates
                .iter()
                .find(|(value, target, _)| (value - target).abs() <= threshold)
                .map(|&(_, _, center)| center)
        };

        let snap_x = pick(&x_candidates);
        let snap_y = pick(&y_candidates);
        if let Some(x) = snap_x {
            geometry.x = x;
        }
        if let Some(y) = snap_y {
            geometry.y = y;
        }
        snap_x.is_some() || snap_y.is_some()
    }

    fn resize(&self, session: &TransformSession, modifiers: Modifiers) -> Geometry {
        let origin = session.origin;
        let Some((sx, sy)) = session.handle.signs() else {
            return origin;
        };
        let min = self.settings.min_size;
        let (w0, h0) = (origin.width, origin.height);
        let rotation = Affine::rotate(origin.radians());

        // The handle and anchor are only axis-aligned in the local frame.
        let delta = (rotation.inverse() * session.delta().to_point()).to_vec2();
        let grabbed = Point::new(sx * w0 / 2.0, sy * h0 / 2.0);
        let moved = grabbed + delta;
        let anchor = Point::new(-sx * w0 / 2.0, -sy * h0 / 2.0);
        let fixed_center = modifiers.alt;

        let span = |sign: f64, moved: f64, anchor: f64, original: f64| {
            if sign == 0.0 {
                original
            } else if fixed_center {
                2.0 * sign * moved
            } else {
                sign * (moved - anchor)
            }
        };
        let mut width = span(sx, moved.x, anchor.x, w0);
        let mut height = span(sy, moved.y, anchor.y, h0);

        let keep_aspect = modifiers.shift && matches!(session.handle, HandleKind::Corner(_));
        if keep_aspect && w0 > 0.0 && h0 > 0.0 {
            let min_scale = (min / w0).max(min / h0);
            let scale = (width / w0).max(height / h0).max(min_scale);
            width = w0 * scale;
            height = h0 * scale;
        } else {
            width = width.max(min);
            height = height.max(min);
        }

        let local_center = if fixed_center {
            Point::ZERO
        } else {
            Point::new(
                if sx == 0.0 { 0.0 } else { anchor.x + sx * width / 2.0 },
                if sy == 0.0 { 0.0 } else { anchor.y + sy * height / 2.0 },
            )
        };
        let center = origin.center() + (rotation * local_center).to_vec2();

        Geometry {
            x: center.x,
            y: center.y,
            width,
            height,
            rotation: origin.rotation,
        }
    }

    fn rotate(&self, session: &TransformSession, pointer: Point, modifiers: Modifiers) -> Geometry {
        let offset = pointer - session.origin.center();
        // The handle sits above the object, a quarter turn from the x axis.
        let mut degrees = normalize_degrees(offset.y.atan2(offset.x).to_degrees() + 90.0);
        if modifiers.shift {
            let step = self.settings.rotate_snap_degrees;
            degrees = normalize_degrees((degrees / step).round() * step);
        }
        Geometry {
            rotation: degrees,
            ..session.origin
        }
    }
}
