//! Pipeline configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Label printed in front of every console block
pub const DEFAULT_CONSOLE_LABEL: &str = "bulk: ";

/// Top-level pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Commands per size-triggered block (0 is treated as 1)
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Console sink configuration
    #[serde(default)]
    pub console: ConsoleConfig,

    /// File sink configuration
    #[serde(default)]
    pub file: FileConfig,

    /// TCP listener configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl BulkConfig {
    /// Threshold actually used by the static aggregator
    pub fn effective_threshold(&self) -> usize {
        self.threshold.max(1)
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_threshold() -> usize {
    3
}

/// Console sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub label: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: DEFAULT_CONSOLE_LABEL.to_string(),
        }
    }
}

/// File sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    /// Directory the block files are written to, created on demand
    pub output_dir: PathBuf,
    /// Number of workers competing for the file queue
    pub workers: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("log"),
            workers: 2,
        }
    }
}

/// TCP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Drop one trailing `\r` from every received line
    pub strip_carriage_return: bool,
    /// How long connected clients may keep sending after shutdown starts
    pub shutdown_grace_ms: u64,
}

impl ServerConfig {
    /// `bind:port` string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 9000,
            strip_carriage_return: true,
            shutdown_grace_ms: 5000,
        }
    }
}
