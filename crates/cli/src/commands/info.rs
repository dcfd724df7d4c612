//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use tracing::info;

use crate::cli::InfoArgs;
use crate::settings;

/// Execute the `info` command: print the effective configuration
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading configuration info");

    let config = settings::load_config(args.config.as_deref())?;

    let rendered = if args.json {
        ConfigLoader::to_json(&config).context("Failed to serialize config as JSON")?
    } else {
        ConfigLoader::to_toml(&config).context("Failed to serialize config as TOML")?
    };
    println!("{}", rendered.trim_end());

    Ok(())
}
