//! Top-level failure taxonomy.
//!
//! Stage variants carry their cause as `source()` rather than in the message,
//! so `{:#}` prints each link of the chain once.

use crate::capture::CaptureError;
use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::ocr::GatewayError;
use crate::overlay::OverlayError;
use crate::region::EncodeError;

/// Every way a run can fail, in the order the stages execute.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Precondition(#[from] ConfigError),

    #[error("Failed to capture screen")]
    Capture(#[from] CaptureError),

    #[error("UI error")]
    Overlay(#[from] OverlayError),

    #[error("Failed to encode image")]
    Encoding(#[from] EncodeError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}
