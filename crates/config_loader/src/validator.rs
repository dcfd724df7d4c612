//! Configuration validation.
//!
//! Rules:
//! - at least one sink enabled
//! - file sink: workers >= 1, output_dir non-empty
//! - server: bind address non-empty
//!
//! A zero threshold is not an error, the aggregator clamps it to 1.

use contracts::{BulkConfig, ContractError};

/// Validate a BulkConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &BulkConfig) -> Result<(), ContractError> {
    validate_sinks(config)?;
    validate_file_sink(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_sinks(config: &BulkConfig) -> Result<(), ContractError> {
    if !config.console.enabled && !config.file.enabled {
        return Err(ContractError::config_validation(
            "console.enabled/file.enabled",
            "at least one sink must be enabled",
        ));
    }
    Ok(())
}

fn validate_file_sink(config: &BulkConfig) -> Result<(), ContractError> {
    let file = &config.file;
    if !file.enabled {
        return Ok(());
    }
    if file.workers == 0 {
        return Err(ContractError::config_validation(
            "file.workers",
            "file sink needs at least one worker",
        ));
    }
    if file.output_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "file.output_dir",
            "output directory must not be empty",
        ));
    }
    Ok(())
}

fn validate_server(config: &BulkConfig) -> Result<(), ContractError> {
    if config.server.bind.trim().is_empty() {
        return Err(ContractError::config_validation(
            "server.bind",
            "bind address must not be empty",
        ));
    }
    Ok(())
}
