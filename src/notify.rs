//! User-facing failure channel. The app normally runs without a console, so
//! every fatal error goes to a blocking dialog as well as the log.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

pub const ERROR_TITLE: &str = "Screenshot OCR Error";

/// Dialog text for a failure: the message followed by each cause.
pub fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

pub fn show_error(message: &str) {
    log::error!("{message}");
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(ERROR_TITLE)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Routes panics to the dialog before the default unwinding runs.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        show_error(&format!("Panic: {info}"));
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use crate::capture::CaptureError;

    #[test]
    fn describe_prints_each_cause_once() {
        let err = anyhow::Error::from(AppError::from(CaptureError::NoActiveDisplay));
        assert_eq!(describe(&err), "Failed to capture screen: No active display found");
    }
}
