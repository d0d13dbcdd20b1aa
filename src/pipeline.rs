//! Capture → select → crop → OCR → clipboard.

use crate::capture::{self, DisplaySource, VirtualCanvas};
use crate::clipboard::ClipboardSink;
use crate::error::AppError;
use crate::ocr::OcrGateway;
use crate::overlay::{self, OverlayError, OverlayHost};
use crate::region;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text is on the clipboard.
    Copied { chars: usize },
    /// Cancelled, window closed, or a zero-area drag.
    NoSelection,
}

/// Runs one capture-to-clipboard pass.
///
/// The overlay is opened once the canvas exists and dropped before the
/// gateway is called, so no network I/O happens while the UI is up.
pub fn run<S, H, O, G, C>(
    displays: &S,
    open_overlay: O,
    gateway: &G,
    clipboard: &mut C,
) -> Result<Outcome, AppError>
where
    S: DisplaySource + ?Sized,
    H: OverlayHost,
    O: FnOnce(&VirtualCanvas) -> Result<H, OverlayError>,
    G: OcrGateway + ?Sized,
    C: ClipboardSink + ?Sized,
{
    let canvas = capture::capture(displays)?;

    let corners = {
        let mut host = open_overlay(&canvas)?;
        overlay::run_selection(&canvas, &mut host)?
    };

    let Some((start, end)) = corners else {
        log::warn!("No selection made");
        return Ok(Outcome::NoSelection);
    };
    let Some(region) = region::extract(&canvas, start, end) else {
        log::warn!("Selection {start:?} -> {end:?} has no area");
        return Ok(Outcome::NoSelection);
    };
    log::info!("Selected region {:?}", region.rect());

    let png = region.to_png()?;
    let text = gateway.extract_text(&png)?;

    clipboard.set_text(&text)?;
    let chars = text.chars().count();
    log::info!("Copied {chars} chars to the clipboard");
    Ok(Outcome::Copied { chars })
}
