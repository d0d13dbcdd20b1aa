//! Cropping the selection out of the canvas and encoding it as PNG.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage, imageops};

use crate::capture::VirtualCanvas;
use crate::geometry::{Point, Rect};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("PNG encoding failed")]
    Png(#[from] image::ImageError),
}

/// Pixels cut out of the canvas. Owns its buffer, so it stays valid after
/// the overlay and the canvas are gone.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedRegion {
    rect: Rect,
    image: RgbaImage,
}

impl CroppedRegion {
    /// Canvas-space rectangle the pixels came from.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Lossless PNG bytes for the OCR request.
    pub fn to_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mut png_bytes: Vec<u8> = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
        log::info!(
            "Encoded {}x{} region to {} PNG bytes",
            self.width(),
            self.height(),
            png_bytes.len()
        );
        Ok(png_bytes)
    }
}

/// Crops the area between two drag corners.
///
/// Corners are normalized and clamped to the canvas before the size is
/// taken, so a drag past the screen edge never reads outside the buffer.
/// Returns `None` for a zero-width or zero-height selection.
pub fn extract(canvas: &VirtualCanvas, start: Point, end: Point) -> Option<CroppedRegion> {
    let bounds = canvas.bounds();
    let rect = Rect::from_corners(start.clamp_to(bounds), end.clamp_to(bounds));
    if rect.is_empty() {
        return None;
    }

    let image = imageops::crop_imm(canvas.pixels(), rect.x as u32, rect.y as u32, rect.w, rect.h)
        .to_image();
    Some(CroppedRegion { rect, image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Every pixel encodes its own coordinates.
    fn gradient(w: u32, h: u32) -> VirtualCanvas {
        let pixels = RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]));
        VirtualCanvas::new(Point::new(-1280, 0), pixels)
    }

    #[test]
    fn reversed_drag_is_normalized() {
        let canvas = gradient(200, 120);
        let region = extract(&canvas, Point::new(100, 100), Point::new(50, 50)).unwrap();
        assert_eq!(region.rect(), Rect::new(50, 50, 50, 50));
        assert_eq!((region.width(), region.height()), (50, 50));
        assert_eq!(*region.image().get_pixel(0, 0), Rgba([50, 50, 0, 255]));
        assert_eq!(*region.image().get_pixel(49, 49), Rgba([99, 99, 0, 255]));
    }

    #[test]
    fn zero_area_selection_is_no_result() {
        let canvas = gradient(64, 64);
        assert!(extract(&canvas, Point::new(10, 10), Point::new(10, 10)).is_none());
        assert!(extract(&canvas, Point::new(10, 5), Point::new(40, 5)).is_none());
        assert!(extract(&canvas, Point::new(7, 0), Point::new(7, 60)).is_none());
    }

    #[test]
    fn corners_outside_canvas_are_clamped() {
        let canvas = gradient(64, 48);
        let region = extract(&canvas, Point::new(-20, 40), Point::new(100, -7)).unwrap();
        assert_eq!(region.rect(), Rect::new(0, 0, 64, 40));

        let region = extract(&canvas, Point::new(60, 44), Point::new(500, 500)).unwrap();
        assert_eq!(region.rect(), Rect::new(60, 44, 4, 4));
        assert_eq!(*region.image().get_pixel(3, 3), Rgba([63, 47, 63 ^ 47, 255]));
    }

    #[test]
    fn selection_entirely_outside_is_no_result() {
        let canvas = gradient(64, 48);
        assert!(extract(&canvas, Point::new(70, 10), Point::new(90, 30)).is_none());
        assert!(extract(&canvas, Point::new(-30, -30), Point::new(-1, -1)).is_none());
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let canvas = gradient(90, 70);
        let region = extract(&canvas, Point::new(5, 9), Point::new(77, 61)).unwrap();
        let bytes = region.to_png().unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(&decoded, region.image());
    }
}
