//! In-memory publisher for tests and dry runs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{Block, BlockPublisher};

/// Publisher that records every block it receives, in order
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    blocks: Mutex<Vec<Block>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn blocks(&self) -> Vec<Block> {
        self.lock().clone()
    }

    /// Published blocks rendered as `"a, b"` strings
    pub fn rendered(&self) -> Vec<String> {
        self.lock().iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Block>> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlockPublisher for RecordingPublisher {
    fn publish(&self, block: Block) {
        self.lock().push(block);
    }
}
