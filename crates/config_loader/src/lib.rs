//! # Config Loader
//!
//! Turns a `.toml` or `.json` file into a checked [`BulkConfig`]. Missing
//! sections and fields fall back to their defaults.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("bulk.toml")).unwrap();
//! println!("threshold: {}", config.threshold);
//! ```

mod parser;
mod validator;

pub use contracts::BulkConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Reads, checks and renders [`BulkConfig`]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a `.toml` or `.json` file
    pub fn load_from_path(path: &Path) -> Result<BulkConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate config text
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<BulkConfig, ContractError> {
        let config = parser::parse(content, format)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Re-check a config after CLI overrides
    pub fn validate(config: &BulkConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Render as TOML (what `bulk info` prints)
    pub fn to_toml(config: &BulkConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("cannot render TOML: {e}")))
    }

    /// Render as JSON (`bulk info --json`)
    pub fn to_json(config: &BulkConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("cannot render JSON: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ContractError::config_parse("config file needs a .toml or .json extension"))?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
