//! Effective configuration: file (or defaults) plus CLI overrides.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::BulkConfig;
use std::path::Path;
use tracing::info;

use crate::cli::PipelineArgs;

/// Load `path`, or the built-in defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<BulkConfig> {
    let Some(path) = path else {
        info!("No configuration file given, using defaults");
        return Ok(BulkConfig::default());
    };

    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    info!(config = %path.display(), "Loading configuration");
    ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Apply command-line overrides on top of a loaded configuration
pub fn apply_overrides(config: &mut BulkConfig, args: &PipelineArgs, threshold: Option<usize>) {
    if let Some(threshold) = threshold {
        info!(threshold, "Overriding threshold from CLI");
        config.threshold = threshold;
    }
    if let Some(ref dir) = args.output_dir {
        info!(output_dir = %dir.display(), "Overriding output directory from CLI");
        config.file.output_dir = dir.clone();
    }
    if let Some(workers) = args.file_workers {
        info!(workers, "Overriding file workers from CLI");
        config.file.workers = workers;
    }
    if args.no_console {
        config.console.enabled = false;
    }
    if args.no_file {
        config.file.enabled = false;
    }
}

/// Load, override and validate
pub fn resolve(args: &PipelineArgs, threshold: Option<usize>) -> Result<BulkConfig> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args, threshold);
    ConfigLoader::validate(&config).context("Invalid configuration after CLI overrides")?;
    Ok(config)
}
