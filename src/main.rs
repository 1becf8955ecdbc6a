use anyhow::{bail, Context, Result};
use card_cv::{
    detection::{RecognitionConfig, RecognitionEngine},
    service::SinkRegistry,
    utils::ImageUtils,
    MatchResult, SlotLayout,
};
use flexi_logger::Logger;
use log::{info, warn};
use std::path::Path;

const CONFIG_PATH: &str = "config/detector.json";

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?
        .start()
        .context("Logger initialization failed")?;

    let composites: Vec<String> = std::env::args().skip(1).collect();
    if composites.is_empty() {
        bail!("usage: card-detector COMPOSITE_IMAGE...");
    }

    let config = if Path::new(CONFIG_PATH).exists() {
        RecognitionConfig::from_json_file(CONFIG_PATH)
            .with_context(|| format!("Failed to load config: {}", CONFIG_PATH))?
    } else {
        RecognitionConfig::default()
    };

    let (engine, report) =
        RecognitionEngine::from_config(&config).context("Failed to build the card catalog")?;
    for (path, e) in &report.skipped {
        warn!("skipped {:?}: {}", path, e);
    }
    info!("{} cards ready", engine.catalog().len());

    let mut sinks = SinkRegistry::new();
    for slot in SlotLayout::ALL {
        sinks.register(slot, move |result: &MatchResult<'_>| {
            println!("{:>12}: {}", slot, result.label());
        });
    }

    // Every named file is recognized in turn; none are coalesced away.
    for path in &composites {
        let composite = ImageUtils::load_grayscale(path)
            .with_context(|| format!("Failed to load image: {}", path))?;
        let results = engine
            .recognize(&composite)
            .with_context(|| format!("Recognition failed: {}", path))?;
        println!("{}", path);
        sinks.dispatch(&results);
    }

    Ok(())
}
