//! Center-origin object geometry.

use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Position, size and rotation of a scene object.
///
/// `x`/`y` are the center of the object. Rotation is in degrees, clockwise in
/// screen space, applied around the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(deserialize_with = "deserialize_degrees")]
    pub rotation: f64,
}

fn deserialize_degrees<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(normalize_degrees)
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
        }
    }
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = normalize_degrees(rotation);
        self
    }

    /// The same geometry with rotation brought into `[0, 360)`.
    pub fn normalized(mut self) -> Self {
        self.rotation = normalize_degrees(self.rotation);
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn radians(&self) -> f64 {
        self.rotation.to_radians()
    }

    /// The object's rectangle in its own unrotated, center-origin frame.
    pub fn local_rect(&self) -> Rect {
        Rect::from_center_size(Point::ZERO, self.size())
    }

    /// Transform from the local frame to world coordinates
    /// (translate to center, then rotate).
    pub fn to_world(&self) -> Affine {
        Affine::translate(self.center().to_vec2()) * Affine::rotate(self.radians())
    }

    /// Map a world point into the local frame.
    pub fn to_local(&self, point: Point) -> Point {
        self.to_world().inverse() * point
    }

    /// World coordinates of the four corners.
    pub fn corners(&self) -> Corners {
        let world = self.to_world();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Corners {
            ul: world * Point::new(-hw, -hh),
            ur: world * Point::new(hw, -hh),
            ll: world * Point::new(-hw, hh),
            lr: world * Point::new(hw, hh),
        }
    }

    /// Floor every field to an integer, keeping rotation in `[0, 360)`.
    pub fn floored(&self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
            width: self.width.floor(),
            height: self.height.floor(),
            rotation: normalize_degrees(self.rotation.floor()),
        }
    }
}

/// The four corners of a (possibly rotated) object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub ul: Point,
    pub ur: Point,
    pub ll: Point,
    pub lr: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < EPS);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < EPS);
        assert_eq!(normalize_degrees(360.0), 0.0);
    }

    #[test]
    fn test_deserialized_rotation_is_normalized() {
        let g: Geometry = serde_json::from_value(serde_json::json!({"rotation": -90.0})).unwrap();
        assert!((g.rotation - 270.0).abs() < EPS);
        let g: Geometry = serde_json::from_value(serde_json::json!({"x": 5.0, "rotation": 450})).unwrap();
        assert!((g.rotation - 90.0).abs() < EPS);
        assert_eq!(g.x, 5.0);
        let g: Geometry = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(g, Geometry::default());
    }

    #[test]
    fn test_corners_unrotated() {
        let g = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let c = g.corners();
        assert!((c.ul.x - 0.0).abs() < EPS && (c.ul.y - 50.0).abs() < EPS);
        assert!((c.lr.x - 200.0).abs() < EPS && (c.lr.y - 150.0).abs() < EPS);
    }

    #[test]
    fn test_corners_rotated_quarter_turn() {
        let g = Geometry::new(0.0, 0.0, 20.0, 10.0).with_rotation(90.0);
        let c = g.corners();
        // Upper-left (-10, -5) rotated 90° clockwise lands at (5, -10)
        assert!((c.ul.x - 5.0).abs() < EPS);
        assert!((c.ul.y + 10.0).abs() < EPS);
    }

    #[test]
    fn test_local_round_trip() {
        let g = Geometry::new(50.0, 80.0, 40.0, 30.0).with_rotation(33.0);
        let p = Point::new(61.0, 72.0);
        let back = g.to_world() * g.to_local(p);
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_floored() {
        let g = Geometry {
            x: 10.7,
            y: -0.5,
            width: 50.9,
            height: 99.99,
            rotation: 359.6,
        };
        let f = g.floored();
        assert_eq!((f.x, f.y, f.width, f.height, f.rotation), (10.0, -1.0, 50.0, 99.0, 359.0));
    }
}
