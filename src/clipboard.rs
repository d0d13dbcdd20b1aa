//! Clipboard helpers.

use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;

#[derive(Debug, thiserror::Error)]
#[error("Failed to copy to clipboard")]
pub struct ClipboardError(#[from] arboard::Error);

/// Where the recognised text ends up.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard.
pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(SystemClipboard { clipboard: Clipboard::new()? })
    }
}

impl ClipboardSink for SystemClipboard {
    /// On Linux the selection lives only as long as its owner, and the app
    /// exits right after copying. Block and keep serving the text until
    /// another client takes ownership of the clipboard.
    #[cfg(target_os = "linux")]
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        log::info!("Serving clipboard until another application replaces it");
        self.clipboard.set().wait().text(text.to_string())?;
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
