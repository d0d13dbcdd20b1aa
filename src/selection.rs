//! Selection state machine and the per-tick frame it renders.

use crate::capture::VirtualCanvas;
use crate::geometry::{Point, Rect};

/// What the host saw during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSample {
    /// Cursor in canvas pixels, `None` when the host cannot tell.
    pub cursor: Option<Point>,
    pub button_down: bool,
    /// The cancel key went down this tick.
    pub cancel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging { start: Point, end: Point },
    Completed { start: Point, end: Point },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Terminate,
}

/// Drag-to-select state, advanced once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    phase: Phase,
    cursor: Point,
    button_was_down: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Selection {
            phase: Phase::Idle,
            cursor: Point::default(),
            button_was_down: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Feeds one tick of input.
    ///
    /// Cancel while dragging drops the drag and keeps going; cancel while
    /// idle quits. A new drag needs a fresh press, so a button still held
    /// after a cancelled drag does not start another one.
    pub fn update(&mut self, input: &InputSample) -> Tick {
        if let Some(p) = input.cursor {
            self.cursor = p;
        }
        let pressed = input.button_down && !self.button_was_down;
        self.button_was_down = input.button_down;

        match self.phase {
            Phase::Idle if input.cancel => {
                self.phase = Phase::Cancelled;
                Tick::Terminate
            }
            Phase::Idle => {
                if pressed {
                    self.phase = Phase::Dragging {
                        start: self.cursor,
                        end: self.cursor,
                    };
                }
                Tick::Continue
            }
            Phase::Dragging { .. } if input.cancel => {
                self.phase = Phase::Idle;
                Tick::Continue
            }
            Phase::Dragging { start, end } => {
                if input.button_down {
                    self.phase = Phase::Dragging { start, end: self.cursor };
                    Tick::Continue
                } else {
                    self.phase = Phase::Completed { start, end };
                    Tick::Terminate
                }
            }
            Phase::Completed { .. } | Phase::Cancelled => Tick::Terminate,
        }
    }

    /// Host window went away.
    pub fn abort(&mut self) {
        if !matches!(self.phase, Phase::Completed { .. }) {
            self.phase = Phase::Cancelled;
        }
    }

    /// Normalized rectangle of the drag in progress.
    pub fn live_rect(&self) -> Option<Rect> {
        match self.phase {
            Phase::Dragging { start, end } => Some(Rect::from_corners(start, end)),
            _ => None,
        }
    }

    /// The raw corners of a completed drag.
    pub fn result(&self) -> Option<(Point, Point)> {
        match self.phase {
            Phase::Completed { start, end } => Some((start, end)),
            _ => None,
        }
    }
}

/// Mask strips around `selection`: top, bottom, left, right.
///
/// The selection is clamped to `canvas` first. Top and bottom span the full
/// width; left and right span only the selection's rows, so together they
/// cover `canvas` minus the selection exactly once. Strips may be empty.
pub fn mask_rects(canvas: Rect, selection: Rect) -> [Rect; 4] {
    let s = selection.clamp_to(canvas);
    let band_h = s.h;
    [
        Rect::new(canvas.x, canvas.y, canvas.w, (s.y - canvas.y) as u32),
        Rect::new(canvas.x, s.bottom(), canvas.w, (canvas.bottom() - s.bottom()) as u32),
        Rect::new(canvas.x, s.y, (s.x - canvas.x) as u32, band_h),
        Rect::new(s.right(), s.y, (canvas.right() - s.right()) as u32, band_h),
    ]
}

/// Black at alpha 150 over the capture.
const MASK_ALPHA: u32 = 150;
const BORDER_COLOUR: u32 = 0x00FF_FFFF;
const BORDER_WIDTH: u32 = 2;

/// Per-tick software renderer into a `0RGB` framebuffer.
pub struct Frame {
    width: usize,
    height: usize,
    clear: Vec<u32>,
    dimmed: Vec<u32>,
    buffer: Vec<u32>,
}

impl Frame {
    pub fn new(canvas: &VirtualCanvas) -> Self {
        let clear: Vec<u32> = canvas
            .pixels()
            .pixels()
            .map(|p| pack_rgb(p[0], p[1], p[2]))
            .collect();
        let dimmed = clear.iter().map(|&px| dim(px)).collect();
        Frame {
            width: canvas.width() as usize,
            height: canvas.height() as usize,
            buffer: clear.clone(),
            clear,
            dimmed,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Draws the capture, the mask and the border for the current state.
    pub fn render(&mut self, selection: &Selection) -> &[u32] {
        let Some(sel) = selection.live_rect() else {
            self.buffer.copy_from_slice(&self.dimmed);
            return &self.buffer;
        };

        self.buffer.copy_from_slice(&self.clear);
        let canvas = Rect::new(0, 0, self.width as u32, self.height as u32);
        for strip in mask_rects(canvas, sel) {
            self.copy_from_dimmed(strip);
        }
        self.stroke(sel.clamp_to(canvas));
        &self.buffer
    }

    fn copy_from_dimmed(&mut self, r: Rect) {
        if r.is_empty() {
            return;
        }
        let (x0, x1) = (r.x as usize, r.right() as usize);
        for y in r.y as usize..r.bottom() as usize {
            let row = y * self.width;
            self.buffer[row + x0..row + x1].copy_from_slice(&self.dimmed[row + x0..row + x1]);
        }
    }

    fn fill(&mut self, r: Rect, colour: u32) {
        if r.is_empty() {
            return;
        }
        for y in r.y as usize..r.bottom() as usize {
            let row = y * self.width;
            self.buffer[row + r.x as usize..row + r.right() as usize].fill(colour);
        }
    }

    /// Border drawn on the inside of `r` so it never leaves the canvas.
    fn stroke(&mut self, r: Rect) {
        if r.is_empty() {
            return;
        }
        let t = BORDER_WIDTH.min(r.w).min(r.h);
        self.fill(Rect::new(r.x, r.y, r.w, t), BORDER_COLOUR);
        self.fill(Rect::new(r.x, r.bottom() - t as i32, r.w, t), BORDER_COLOUR);
        self.fill(Rect::new(r.x, r.y, t, r.h), BORDER_COLOUR);
        self.fill(Rect::new(r.right() - t as i32, r.y, t, r.h), BORDER_COLOUR);
    }
}

fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

fn dim(px: u32) -> u32 {
    let keep = 255 - MASK_ALPHA;
    let r = ((px >> 16) & 0xFF) * keep / 255;
    let g = ((px >> 8) & 0xFF) * keep / 255;
    let b = (px & 0xFF) * keep / 255;
    (r << 16) | (g << 8) | b
}
