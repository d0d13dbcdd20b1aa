//! Lists the Gemini models the configured key can use.

use anyhow::{Context, Result};

use snapocr::config::Config;
use snapocr::ocr::GeminiGateway;

fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let gateway = GeminiGateway::new(config).context("Error creating client")?;
    let models = gateway.list_models().context("Error listing models")?;

    println!("Available Models:");
    for m in models {
        println!("- {} ({})", m.name, m.display_name);
    }
    Ok(())
}
