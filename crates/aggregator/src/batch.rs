//! Pending command list shared by both aggregators.

use std::mem;

use contracts::{Block, Timestamp};

/// Commands collected so far plus the time the first one arrived
#[derive(Debug, Default)]
pub(crate) struct PendingBatch {
    commands: Vec<String>,
    timestamp: Timestamp,
}

impl PendingBatch {
    pub(crate) fn push(&mut self, command: String, timestamp: Timestamp) {
        if self.commands.is_empty() {
            self.timestamp = timestamp;
        }
        self.commands.push(command);
    }

    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }

    /// Swap the list out, leaving an empty batch behind
    pub(crate) fn take(&mut self) -> Option<Block> {
        let timestamp = mem::take(&mut self.timestamp);
        Block::new(mem::take(&mut self.commands), timestamp)
    }

    /// Drop everything, returns how many commands were discarded
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.commands.len();
        self.commands.clear();
        self.timestamp = 0;
        discarded
    }
}
