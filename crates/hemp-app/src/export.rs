//! PNG export of the rendered canvas.

use crate::AppError;
use hemp_render::{PixelSurface, Surface};
use std::path::Path;

pub fn encode_png(surface: &PixelSurface) -> Result<Vec<u8>, AppError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&surface.to_rgba8())?;
    }
    Ok(png_data)
}

pub fn write_png(path: &Path, surface: &PixelSurface) -> Result<(), AppError> {
    let bytes = encode_png(surface)?;
    std::fs::write(path, &bytes).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("wrote {}x{} PNG to {}", surface.width(), surface.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Shape};
    use peniko::Color;

    #[test]
    fn test_png_decodes_back() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_path(&Rect::new(0.0, 0.0, 2.0, 4.0).to_path(0.1), Color::from_rgba8(255, 0, 0, 255));
        let bytes = encode_png(&surface).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 4));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(3, 0).0, [0, 0, 0, 0]);
    }
}
