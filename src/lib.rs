//! Drag-select a region of the screen, OCR it with Gemini and put the text
//! on the clipboard.

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod geometry;
pub mod notify;
pub mod ocr;
pub mod overlay;
pub mod pipeline;
pub mod region;
pub mod selection;

pub use error::AppError;
pub use pipeline::Outcome;
