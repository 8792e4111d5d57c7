//! Main entry point for ytdash.

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{debug, error};
use ytdash::{Args, Dashboard};
use ytdash_common::init_logging;
use ytdash_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    init_logging(config.logging.to_logging_config(args.log_level.as_deref()))
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    debug!("Configuration loaded");

    let dashboard = Dashboard::new(config)?;
    match dashboard.execute(&args.command, args.format).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
