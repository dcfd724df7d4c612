//! Marker-delimited aggregator, one per connection.

use contracts::{BlockPublisher, Timestamp};
use tracing::{debug, trace};

use crate::batch::PendingBatch;
use crate::StaticAggregator;

/// Dynamic batching state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// No block open (depth 0), literals go to the static aggregator
    Idle,
    /// Inside at least one open marker
    Collecting,
}

/// Per-connection nested block collector
///
/// Only the outermost close publishes; inner open/close pairs just move
/// the depth counter.
#[derive(Debug, Default)]
pub struct DynamicAggregator {
    pending: PendingBatch,
    depth: usize,
}

impl DynamicAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> BatchState {
        if self.depth == 0 {
            BatchState::Idle
        } else {
            BatchState::Collecting
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Commands collected in the open block
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Open marker. Entering the outermost block flushes `statics` first so
    /// static and dynamic content never share a block.
    pub fn open(&mut self, statics: &StaticAggregator) {
        if self.depth == 0 {
            statics.flush();
            trace!("dynamic block opened");
        }
        self.depth += 1;
    }

    /// Literal command inside an open block
    pub fn literal(&mut self, command: String, timestamp: Timestamp) {
        self.pending.push(command, timestamp);
    }

    /// Close marker. Returns true if a block was published.
    ///
    /// An unmatched close (depth already 0) is ignored.
    pub fn close(&mut self, publisher: &dyn BlockPublisher) -> bool {
        if self.depth == 0 {
            trace!("unmatched close marker ignored");
            return false;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return false;
        }

        match self.pending.take() {
            Some(block) => {
                debug!(commands = block.len(), ts = block.timestamp(), "dynamic block complete");
                observability::record_block_published("dynamic", block.len());
                publisher.publish(block);
                true
            }
            None => false,
        }
    }

    /// Teardown: forget any open block without publishing it.
    ///
    /// Returns the number of commands discarded.
    pub fn reset(&mut self) -> usize {
        let discarded = self.pending.clear();
        if self.depth > 0 {
            debug!(depth = self.depth, discarded, "unterminated dynamic block discarded");
        }
        self.depth = 0;
        discarded
    }
}
