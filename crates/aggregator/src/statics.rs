//! Size-triggered aggregator shared by every connection.
//!
//! Commands from different connections may land in the same block; the
//! aggregator only cares about arrival order under its lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Block, BlockPublisher, Timestamp};
use tracing::{debug, trace};

use crate::batch::PendingBatch;

/// Shared size-triggered aggregator
///
/// A block is published once `threshold` commands are pending, or on
/// [`flush`](Self::flush). Publishing happens outside the lock, so other
/// producers keep accumulating while the block is fanned out.
pub struct StaticAggregator {
    threshold: usize,
    pending: Mutex<PendingBatch>,
    publisher: Arc<dyn BlockPublisher>,
    published: AtomicU64,
}

impl fmt::Debug for StaticAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAggregator")
            .field("threshold", &self.threshold)
            .field("pending", &self.pending_len())
            .field("published", &self.published_count())
            .finish()
    }
}

impl StaticAggregator {
    /// Create an aggregator; a threshold of 0 behaves like 1
    pub fn new(threshold: usize, publisher: Arc<dyn BlockPublisher>) -> Self {
        Self {
            threshold: threshold.max(1),
            pending: Mutex::new(PendingBatch::default()),
            publisher,
            published: AtomicU64::new(0),
        }
    }

    /// Effective threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Add one literal command, publishing if the threshold is reached
    pub fn feed(&self, command: String, timestamp: Timestamp) {
        let ready = {
            let mut pending = self.lock();
            pending.push(command, timestamp);
            trace!(pending = pending.len(), threshold = self.threshold, "static command queued");
            if pending.len() >= self.threshold {
                pending.take()
            } else {
                None
            }
        };

        if let Some(block) = ready {
            self.emit(block, "threshold");
        }
    }

    /// Publish whatever is pending; no-op when empty
    pub fn flush(&self) {
        let ready = self.lock().take();
        if let Some(block) = ready {
            self.emit(block, "flush");
        }
    }

    /// Commands waiting for the next block
    pub fn pending_len(&self) -> usize {
        self.lock().len()
    }

    /// Blocks published since creation
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn emit(&self, block: Block, reason: &'static str) {
        self.published.fetch_add(1, Ordering::Relaxed);
        debug!(
            commands = block.len(),
            ts = block.timestamp(),
            reason,
            "static block complete"
        );
        observability::record_block_published("static", block.len());
        self.publisher.publish(block);
    }

    fn lock(&self) -> MutexGuard<'_, PendingBatch> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingPublisher;
    use std::thread;

    fn setup(threshold: usize) -> (Arc<RecordingPublisher>, StaticAggregator) {
        let publisher = Arc::new(RecordingPublisher::new());
        let aggregator = StaticAggregator::new(threshold, publisher.clone());
        (publisher, aggregator)
    }

    #[test]
    fn test_exactly_threshold_publishes_one_block() {
        for n in 1..=5 {
            let (publisher, aggregator) = setup(n);
            for i in 0..n {
                aggregator.feed(format!("cmd{i}"), 100 + i as i64);
            }

            let blocks = publisher.blocks();
            assert_eq!(blocks.len(), 1, "threshold {n}");
            let expected: Vec<String> = (0..n).map(|i| format!("cmd{i}")).collect();
            assert_eq!(blocks[0].commands(), expected.as_slice());
            assert_eq!(blocks[0].timestamp(), 100);
            assert_eq!(aggregator.pending_len(), 0);
        }
    }

    #[test]
    fn test_below_threshold_waits() {
        let (publisher, aggregator) = setup(3);
        aggregator.feed("a".into(), 1);
        aggregator.feed("b".into(), 2);

        assert!(publisher.is_empty());
        assert_eq!(aggregator.pending_len(), 2);
    }

    #[test]
    fn test_flush_publishes_partial() {
        let (publisher, aggregator) = setup(3);
        aggregator.feed("a".into(), 5);
        aggregator.feed("b".into(), 6);
        aggregator.flush();

        assert_eq!(publisher.rendered(), ["a, b"]);
        assert_eq!(publisher.blocks()[0].timestamp(), 5);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let (publisher, aggregator) = setup(3);
        aggregator.flush();
        aggregator.flush();
        assert!(publisher.is_empty());
        assert_eq!(aggregator.published_count(), 0);
    }

    #[test]
    fn test_zero_threshold_clamped() {
        let (publisher, aggregator) = setup(0);
        assert_eq!(aggregator.threshold(), 1);
        aggregator.feed("a".into(), 1);
        aggregator.feed("b".into(), 2);
        assert_eq!(publisher.rendered(), ["a", "b"]);
    }

    #[test]
    fn test_consecutive_blocks_keep_order() {
        let (publisher, aggregator) = setup(2);
        for (i, cmd) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            aggregator.feed(cmd.to_string(), i as i64);
        }
        aggregator.flush();

        assert_eq!(publisher.rendered(), ["a, b", "c, d", "e"]);
        let timestamps: Vec<_> = publisher.blocks().iter().map(Block::timestamp).collect();
        assert_eq!(timestamps, [0, 2, 4]);
        assert_eq!(aggregator.published_count(), 3);
    }

    #[test]
    fn test_concurrent_feeders_lose_nothing() {
        let (publisher, aggregator) = setup(4);
        let aggregator = Arc::new(aggregator);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    for i in 0..100 {
                        aggregator.feed(format!("{t}-{i}"), 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        aggregator.flush();

        let blocks = publisher.blocks();
        assert!(blocks.iter().all(|b| b.len() <= 4));
        let mut all: Vec<String> = blocks.iter().flat_map(|b| b.commands().to_vec()).collect();
        assert_eq!(all.len(), 800);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
