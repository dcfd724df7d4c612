//! Per-class delivery counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one consumer class, shared by its queue and workers
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    written: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks waiting in the queue as last observed
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// One block left a worker, successfully or not
    pub fn record_write(&self, ok: bool) {
        let counter = if ok { &self.written } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A publish found the queue closed
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len.load(Ordering::Relaxed),
            write_count: self.written.load(Ordering::Relaxed),
            failure_count: self.failed.load(Ordering::Relaxed),
            rejected_count: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub rejected_count: u64,
}
