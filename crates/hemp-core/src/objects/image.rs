//! Image element attributes.

use super::VerticalAlign;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// An image fetched from a URL and crop-filled into the object box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    #[serde(default)]
    pub src: String,
    /// Which part of an over-tall source survives the crop.
    #[serde(default)]
    pub valign: VerticalAlign,
}

impl ImageProps {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.to_string(),
            valign: VerticalAlign::default(),
        }
    }

    /// The largest sub-rectangle of a `source`-sized image with the aspect
    /// ratio of `dest`.
    ///
    /// Excess width is trimmed equally from both sides; excess height is
    /// trimmed according to `valign`.
    pub fn crop_rect(&self, source: Size, dest: Size) -> Rect {
        if source.width <= 0.0 || source.height <= 0.0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return Rect::from_origin_size((0.0, 0.0), source);
        }
        let dest_aspect = dest.width / dest.height;
        let source_aspect = source.width / source.height;
        if source_aspect > dest_aspect {
            let width = source.height * dest_aspect;
            let x = (source.width - width) / 2.0;
            Rect::new(x, 0.0, x + width, source.height)
        } else {
            let height = source.width / dest_aspect;
            let y = match self.valign {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Middle => (source.height - height) / 2.0,
                VerticalAlign::Bottom => source.height - height,
            };
            Rect::new(0.0, y, source.width, y + height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_crop_wide_source_is_centered() {
        let props = ImageProps::new("a.png");
        let crop = props.crop_rect(Size::new(400.0, 100.0), Size::new(100.0, 100.0));
        assert!((crop.x0 - 150.0).abs() < EPS);
        assert!((crop.width() - 100.0).abs() < EPS);
        assert!((crop.height() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_crop_tall_source_respects_valign() {
        let mut props = ImageProps::new("a.png");
        let source = Size::new(100.0, 400.0);
        let dest = Size::new(200.0, 100.0);

        props.valign = VerticalAlign::Top;
        assert!((props.crop_rect(source, dest).y0 - 0.0).abs() < EPS);

        props.valign = VerticalAlign::Middle;
        assert!((props.crop_rect(source, dest).y0 - 175.0).abs() < EPS);

        props.valign = VerticalAlign::Bottom;
        let crop = props.crop_rect(source, dest);
        assert!((crop.y1 - 400.0).abs() < EPS);
        assert!((crop.height() - 50.0).abs() < EPS);
    }
}
