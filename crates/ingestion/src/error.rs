//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Reading from the transport failed
    #[error("read failed on connection {connection}: {source}")]
    Read {
        /// Connection id
        connection: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
