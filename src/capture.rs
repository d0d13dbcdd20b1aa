//! Display capture: grab every active display and stitch them into one
//! canvas laid out in virtual-screen coordinates.

use std::time::Instant;

use image::{RgbaImage, imageops};
use xcap::{Monitor, XCapResult};

use crate::geometry::{Point, Rect, union_all};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate displays: {0}")]
    Enumeration(String),

    #[error("No active display found")]
    NoActiveDisplay,

    #[error("Failed to capture display {index}: {reason}")]
    Capture { index: usize, reason: String },
}

/// Where displays come from. The real one talks to the OS via `xcap`.
pub trait DisplaySource {
    /// Bounding rectangles of the active displays, in virtual-screen pixels.
    fn display_bounds(&self) -> Result<Vec<Rect>, CaptureError>;

    /// Pixels of the display at `index` in the order of `display_bounds`.
    fn capture_display(&self, index: usize) -> Result<RgbaImage, CaptureError>;
}

/// The stitched capture of all displays.
///
/// Pixel `(0, 0)` of the canvas is the virtual-screen point `origin`.
#[derive(Debug, Clone)]
pub struct VirtualCanvas {
    origin: Point,
    pixels: RgbaImage,
}

impl VirtualCanvas {
    pub fn new(origin: Point, pixels: RgbaImage) -> Self {
        VirtualCanvas { origin, pixels }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Canvas-space bounds, always anchored at `(0, 0)`.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Captures every display and stitches them. Any failing display aborts the
/// whole capture.
pub fn capture<S: DisplaySource + ?Sized>(source: &S) -> Result<VirtualCanvas, CaptureError> {
    let start = Instant::now();

    let bounds = source.display_bounds()?;
    let union = union_all(bounds.iter()).ok_or(CaptureError::NoActiveDisplay)?;

    let mut pixels = RgbaImage::new(union.w, union.h);
    for (index, display) in bounds.iter().enumerate() {
        let shot = source.capture_display(index)?;
        let at = display.offset_from(union.origin());
        // replace() clips anything falling outside the canvas.
        imageops::replace(&mut pixels, &shot, at.x as i64, at.y as i64);
    }

    log::info!(
        "Captured {} display(s) into {}x{} canvas at ({},{}) in {}ms",
        bounds.len(),
        union.w,
        union.h,
        union.x,
        union.y,
        start.elapsed().as_millis()
    );

    Ok(VirtualCanvas::new(union.origin(), pixels))
}

/// Active monitors as reported by `xcap`, enumerated once.
pub struct XcapDisplays {
    monitors: Vec<Monitor>,
}

impl XcapDisplays {
    pub fn new() -> Result<Self, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;
        Ok(XcapDisplays { monitors })
    }
}

impl DisplaySource for XcapDisplays {
    fn display_bounds(&self) -> Result<Vec<Rect>, CaptureError> {
        self.monitors
            .iter()
            .map(|m| monitor_rect(m).map_err(|e| CaptureError::Enumeration(e.to_string())))
            .collect()
    }

    fn capture_display(&self, index: usize) -> Result<RgbaImage, CaptureError> {
        let monitor = self.monitors.get(index).ok_or(CaptureError::Capture {
            index,
            reason: "display disappeared".to_string(),
        })?;
        let shot = monitor.capture_image().map_err(|e| CaptureError::Capture {
            index,
            reason: e.to_string(),
        })?;
        // Go through raw bytes so xcap's image version need not match ours.
        let (w, h) = (shot.width(), shot.height());
        RgbaImage::from_raw(w, h, shot.into_raw()).ok_or(CaptureError::Capture {
            index,
            reason: "unexpected pixel buffer size".to_string(),
        })
    }
}

fn monitor_rect(monitor: &Monitor) -> XCapResult<Rect> {
    Ok(Rect::new(
        monitor.x()?,
        monitor.y()?,
        monitor.width()?,
        monitor.height()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Fills each display with a solid colour so the blit can be checked.
    struct FakeDisplays {
        displays: Vec<(Rect, Rgba<u8>)>,
        fail_at: Option<usize>,
    }

    impl DisplaySource for FakeDisplays {
        fn display_bounds(&self) -> Result<Vec<Rect>, CaptureError> {
            Ok(self.displays.iter().map(|(r, _)| *r).collect())
        }

        fn capture_display(&self, index: usize) -> Result<RgbaImage, CaptureError> {
            if self.fail_at == Some(index) {
                return Err(CaptureError::Capture { index, reason: "boom".into() });
            }
            let (r, colour) = self.displays[index];
            Ok(RgbaImage::from_pixel(r.w, r.h, colour))
        }
    }

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn stitches_display_left_of_primary() {
        let source = FakeDisplays {
            displays: vec![
                (Rect::new(0, 0, 40, 20), RED),
                (Rect::new(-30, 0, 30, 16), BLUE),
            ],
            fail_at: None,
        };
        let canvas = capture(&source).unwrap();

        assert_eq!(canvas.origin(), Point::new(-30, 0));
        assert_eq!((canvas.width(), canvas.height()), (70, 20));
        // Primary lands at canvas x = 30.
        assert_eq!(*canvas.pixels().get_pixel(30, 0), RED);
        assert_eq!(*canvas.pixels().get_pixel(69, 19), RED);
        assert_eq!(*canvas.pixels().get_pixel(0, 0), BLUE);
        assert_eq!(*canvas.pixels().get_pixel(29, 15), BLUE);
        // Below the shorter left display nothing was drawn.
        assert_eq!(*canvas.pixels().get_pixel(0, 19), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn no_display_is_an_error() {
        let source = FakeDisplays { displays: vec![], fail_at: None };
        assert!(matches!(capture(&source), Err(CaptureError::NoActiveDisplay)));
    }

    #[test]
    fn one_failing_display_aborts_capture() {
        let source = FakeDisplays {
            displays: vec![
                (Rect::new(0, 0, 10, 10), RED),
                (Rect::new(10, 0, 10, 10), BLUE),
            ],
            fail_at: Some(1),
        };
        assert!(matches!(
            capture(&source),
            Err(CaptureError::Capture { index: 1, .. })
        ));
    }
}
