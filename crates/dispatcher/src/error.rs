//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Worker thread could not be spawned
    #[error("failed to spawn worker {worker} for sink '{sink}': {source}")]
    WorkerSpawn {
        sink: String,
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    /// Sink error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a worker spawn error
    pub fn worker_spawn(sink: impl Into<String>, worker: usize, source: std::io::Error) -> Self {
        Self::WorkerSpawn {
            sink: sink.into(),
            worker,
            source,
        }
    }
}
