//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::BulkConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    threshold: usize,
    sinks: Vec<String>,
    file_workers: usize,
    output_dir: String,
    listen: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &BulkConfig) -> ConfigSummary {
    let mut sinks = Vec::new();
    if config.console.enabled {
        sinks.push("console".to_string());
    }
    if config.file.enabled {
        sinks.push("file".to_string());
    }
    ConfigSummary {
        threshold: config.effective_threshold(),
        sinks,
        file_workers: config.file.workers,
        output_dir: config.file.output_dir.display().to_string(),
        listen: config.server.addr(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &BulkConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.threshold == 0 {
        warnings.push("threshold is 0 - every command becomes its own block".to_string());
    }
    if config.console.enabled && config.console.label.is_empty() {
        warnings.push("console.label is empty - blocks are printed without a prefix".to_string());
    }
    if !config.file.enabled {
        warnings.push("file sink disabled - blocks are not persisted".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Threshold: {}", summary.threshold);
            println!("  Sinks: {}", summary.sinks.join(", "));
            println!("  File workers: {}", summary.file_workers);
            println!("  Output dir: {}", summary.output_dir);
            println!("  Listen: {}", summary.listen);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args_for(path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config: path,
            json: true,
        }
    }

    #[test]
    fn test_valid_file_with_warnings() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "threshold = 0\n[file]\nenabled = false").unwrap();

        let result = validate_config(&args_for(file.path().to_path_buf()));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 2);
        let summary = result.summary.unwrap();
        assert_eq!(summary.threshold, 1);
        assert_eq!(summary.sinks, vec!["console".to_string()]);
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"file": {{"workers": 0}}}}"#).unwrap();

        let result = validate_config(&args_for(file.path().to_path_buf()));
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&args_for(PathBuf::from("/nonexistent/bulk.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
