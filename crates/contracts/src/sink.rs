//! BlockSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for consumers.

use crate::{Block, ContractError};

/// Index of a worker inside its consumer class, starting at 1
pub type WorkerId = usize;

/// Block output trait
///
/// Every worker thread owns one sink instance and calls it for one block at
/// a time. Sinks are driven from plain threads, so the interface is blocking.
pub trait BlockSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one block
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, block: &Block) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Close sink
    fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
