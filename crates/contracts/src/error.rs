//! Errors shared by the configuration and sink layers

use std::io;
use thiserror::Error;

/// Error raised by config loading or by a consumer writing a block
#[derive(Debug, Error)]
pub enum ContractError {
    /// Config text could not be parsed or rendered
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A parsed config breaks a rule
    #[error("invalid config field '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A consumer failed to output a block
    #[error("sink '{sink}' failed to write block: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sink_write(sink: impl Into<String>, source: io::Error) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_write_keeps_source() {
        let err = ContractError::sink_write("file", io::Error::other("disk full"));
        assert_eq!(err.to_string(), "sink 'file' failed to write block: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
