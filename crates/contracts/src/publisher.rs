//! BlockPublisher trait - aggregator output interface

use crate::Block;

/// Accepts completed blocks for delivery.
///
/// Implementations must not block beyond a brief critical section:
/// aggregators call this while producers are waiting.
pub trait BlockPublisher: Send + Sync {
    /// Hand a completed block over for fan-out
    fn publish(&self, block: Block);
}
