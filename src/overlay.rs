//! Full-screen selection overlay.
//!
//! `run_selection` owns the tick loop; the window system sits behind
//! `OverlayHost` so the loop can be driven by synthetic input in tests.

use minifb::{CursorStyle, Key, KeyRepeat, MouseButton, MouseMode, Scale, Window, WindowOptions};

use crate::capture::VirtualCanvas;
use crate::geometry::Point;
use crate::selection::{Frame, InputSample, Selection, Tick};

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to open overlay window: {0}")]
    Open(String),

    #[error("Failed to draw overlay: {0}")]
    Present(String),
}

/// The windowing runtime seen from the selection loop.
pub trait OverlayHost {
    /// Shows one frame of `width * height` `0RGB` pixels and pumps events.
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), OverlayError>;

    /// Input state after the last `present`, or `None` once the window is gone.
    fn sample(&mut self) -> Option<InputSample>;
}

/// Runs the drag-to-select loop until the user finishes or cancels.
///
/// Returns the raw corners of a completed drag in canvas pixels.
pub fn run_selection<H: OverlayHost + ?Sized>(
    canvas: &VirtualCanvas,
    host: &mut H,
) -> Result<Option<(Point, Point)>, OverlayError> {
    let mut selection = Selection::new();
    let mut frame = Frame::new(canvas);
    let (width, height) = (frame.width(), frame.height());

    loop {
        host.present(frame.render(&selection), width, height)?;

        let Some(input) = host.sample() else {
            log::info!("Overlay closed by the window system");
            selection.abort();
            break;
        };
        if selection.update(&input) == Tick::Terminate {
            break;
        }
    }

    match selection.result() {
        Some((start, end)) => log::info!("Selection finished: {start:?} -> {end:?}"),
        None => log::info!("Selection cancelled"),
    }
    Ok(selection.result())
}

const TARGET_FPS: usize = 60;

/// Borderless, always-on-top `minifb` window covering the whole canvas.
pub struct MinifbOverlay {
    window: Window,
}

impl MinifbOverlay {
    pub fn open(canvas: &VirtualCanvas) -> Result<Self, OverlayError> {
        let options = WindowOptions {
            borderless: true,
            title: false,
            resize: false,
            topmost: true,
            scale: Scale::X1,
            ..WindowOptions::default()
        };
        let mut window = Window::new(
            "snapocr",
            canvas.width() as usize,
            canvas.height() as usize,
            options,
        )
        .map_err(|e| OverlayError::Open(e.to_string()))?;

        let origin = canvas.origin();
        window.set_position(origin.x as isize, origin.y as isize);
        window.set_cursor_style(CursorStyle::Crosshair);
        window.set_target_fps(TARGET_FPS);

        Ok(MinifbOverlay { window })
    }
}

impl OverlayHost for MinifbOverlay {
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), OverlayError> {
        self.window
            .update_with_buffer(frame, width, height)
            .map_err(|e| OverlayError::Present(e.to_string()))
    }

    fn sample(&mut self) -> Option<InputSample> {
        if !self.window.is_open() {
            return None;
        }
        // Pass, not Clamp: extraction clamps, and a drag past the edge
        // should still reach it.
        let cursor = self
            .window
            .get_mouse_pos(MouseMode::Pass)
            .map(|(x, y)| Point::new(x.floor() as i32, y.floor() as i32));
        Some(InputSample {
            cursor,
            button_down: self.window.get_mouse_down(MouseButton::Left),
            cancel: self.window.is_key_pressed(Key::Escape, KeyRepeat::No),
        })
    }
}
