#![windows_subsystem = "windows"]

use anyhow::Result;

use snapocr::capture::XcapDisplays;
use snapocr::clipboard::SystemClipboard;
use snapocr::config::Config;
use snapocr::ocr::GeminiGateway;
use snapocr::overlay::MinifbOverlay;
use snapocr::{AppError, Outcome, notify, pipeline};

fn main() {
    env_logger::init();
    notify::install_panic_hook();

    if let Err(e) = try_main() {
        notify::show_error(&notify::describe(&e));
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Before any capture: no point grabbing the screen without a key.
    let config = Config::from_env().map_err(AppError::from)?;
    log::info!("Starting with {config:?}");

    let displays = XcapDisplays::new().map_err(AppError::from)?;
    let gateway = GeminiGateway::new(config).map_err(AppError::from)?;

    let outcome = pipeline::run(&displays, MinifbOverlay::open, &gateway, &mut LazyClipboard)?;
    if outcome == Outcome::NoSelection {
        log::info!("Nothing selected, exiting");
    }
    Ok(())
}

/// Opens the system clipboard only when there is text to write.
struct LazyClipboard;

impl snapocr::clipboard::ClipboardSink for LazyClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), snapocr::clipboard::ClipboardError> {
        SystemClipboard::new()?.set_text(text)
    }
}
