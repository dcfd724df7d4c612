//! SinkHandle - one consumer class: an unbounded queue and its worker threads

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{Block, BlockSink, WorkerId};
use tracing::{debug, error, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;

type SinkFactory = Box<dyn Fn(WorkerId) -> Box<dyn BlockSink> + Send + Sync>;

/// Handle to a consumer class
///
/// All workers of the class compete for the same FIFO queue; each block is
/// taken by exactly one of them and fully written before that worker takes
/// the next one.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Workers spawned on start
    worker_count: usize,
    /// Builds one sink instance per worker
    factory: SinkFactory,
    /// Producer side of the queue
    tx: Sender<Block>,
    /// Consumer side, cloned into every worker
    rx: Receiver<Block>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker thread handles
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkHandle")
            .field("name", &self.name)
            .field("worker_count", &self.worker_count)
            .field("queued", &self.tx.len())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl SinkHandle {
    /// Create a consumer class; workers are spawned by [`Dispatcher::start`].
    ///
    /// `factory` is called once per worker with ids `1..=worker_count`.
    /// A worker count of 0 is treated as 1.
    ///
    /// [`Dispatcher::start`]: crate::Dispatcher::start
    pub fn new<S, F>(name: impl Into<String>, worker_count: usize, factory: F) -> Self
    where
        S: BlockSink + 'static,
        F: Fn(WorkerId) -> S + Send + Sync + 'static,
    {
        let (tx, rx) = async_channel::unbounded();
        Self {
            name: name.into(),
            worker_count: worker_count.max(1),
            factory: Box::new(move |worker| Box::new(factory(worker)) as Box<dyn BlockSink>),
            tx,
            rx,
            metrics: Arc::new(SinkMetrics::new()),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of workers draining the queue
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Enqueue a block (never blocks)
    ///
    /// Returns false if the queue is already closed (block dropped)
    pub fn enqueue(&self, block: Block) -> bool {
        match self.tx.try_send(block) {
            Ok(()) => {
                let depth = self.tx.len();
                self.metrics.set_queue_len(depth);
                observability::record_queue_depth(&self.name, depth);
                true
            }
            Err(TrySendError::Closed(block)) | Err(TrySendError::Full(block)) => {
                self.metrics.record_rejected();
                observability::record_block_rejected(&self.name);
                debug!(
                    sink = %self.name,
                    commands = block.len(),
                    "Queue closed, block dropped"
                );
                false
            }
        }
    }

    /// Spawn the worker threads
    #[instrument(name = "sink_handle_spawn", skip(self), fields(sink = %self.name))]
    pub(crate) fn spawn_workers(&self) -> Result<(), DispatcherError> {
        let mut workers = self.lock_workers();
        for worker in 1..=self.worker_count {
            let sink = (self.factory)(worker);
            let rx = self.rx.clone();
            let metrics = Arc::clone(&self.metrics);
            let name = self.name.clone();

            let handle = thread::Builder::new()
                .name(format!("{}-{}", self.name, worker))
                .spawn(move || sink_worker(sink, rx, metrics, name, worker))
                .map_err(|e| DispatcherError::worker_spawn(&self.name, worker, e))?;
            workers.push(handle);
        }
        debug!(sink = %self.name, workers = workers.len(), "Sink workers spawned");
        Ok(())
    }

    /// Close the queue for writers; workers drain what is left, then exit
    pub(crate) fn close(&self) {
        self.tx.close();
    }

    /// Wait for every worker to finish draining
    #[instrument(name = "sink_handle_join", skip(self), fields(sink = %self.name))]
    pub(crate) fn join(&self) {
        let workers = std::mem::take(&mut *self.lock_workers());
        for handle in workers {
            if handle.join().is_err() {
                error!(sink = %self.name, "Worker thread panicked");
            }
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker loop: take one block, write it, repeat until the queue is closed
/// and empty
fn sink_worker(
    mut sink: Box<dyn BlockSink>,
    rx: Receiver<Block>,
    metrics: Arc<SinkMetrics>,
    name: String,
    worker: WorkerId,
) {
    debug!(sink = %name, worker, "Sink worker started");

    while let Ok(block) = rx.recv_blocking() {
        metrics.set_queue_len(rx.len());

        match sink.write(&block) {
            Ok(()) => {
                metrics.record_write(true);
                observability::record_block_delivered(&name, true);
            }
            Err(e) => {
                // Dropped for this sink only
                metrics.record_write(false);
                observability::record_block_delivered(&name, false);
                warn!(
                    sink = %name,
                    worker,
                    ts = block.timestamp(),
                    error = %e,
                    "Write failed, block dropped"
                );
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush() {
        error!(sink = %name, worker, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close() {
        error!(sink = %name, worker, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, worker, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use std::time::Duration;

    fn block(i: i64) -> Block {
        Block::new(vec![format!("cmd{i}")], i).unwrap()
    }

    #[test]
    fn test_sink_handle_basic() {
        let (sink, log) = MemorySink::new("test");
        let handle = SinkHandle::new("test", 1, move |w| sink.for_worker(w));
        handle.spawn_workers().unwrap();

        for i in 0..5 {
            assert!(handle.enqueue(block(i)));
        }

        handle.close();
        handle.join();

        let delivered = MemorySink::deliveries(&log);
        let timestamps: Vec<_> = delivered.iter().map(|d| d.block.timestamp()).collect();
        assert_eq!(timestamps, [0, 1, 2, 3, 4]);
        assert_eq!(handle.metrics().snapshot().write_count, 5);
    }

    #[test]
    fn test_enqueue_after_close_is_rejected() {
        let (sink, log) = MemorySink::new("test");
        let handle = SinkHandle::new("test", 1, move |w| sink.for_worker(w));
        handle.spawn_workers().unwrap();
        handle.close();

        assert!(!handle.enqueue(block(1)));
        handle.join();

        assert_eq!(handle.metrics().snapshot().rejected_count, 1);
        assert!(MemorySink::deliveries(&log).is_empty());
    }

    #[test]
    fn test_competing_workers_share_queue() {
        let (sink, log) = MemorySink::new("file");
        let sink = sink.with_delay(Duration::from_millis(2));
        let handle = SinkHandle::new("file", 2, move |w| sink.for_worker(w));
        handle.spawn_workers().unwrap();

        for i in 0..40 {
            handle.enqueue(block(i));
        }
        handle.close();
        handle.join();

        let delivered = MemorySink::deliveries(&log);
        assert_eq!(delivered.len(), 40);
        let mut timestamps: Vec<_> = delivered.iter().map(|d| d.block.timestamp()).collect();
        timestamps.sort_unstable();
        assert_eq!(timestamps, (0..40).collect::<Vec<_>>());
        assert!(delivered.iter().all(|d| d.worker == 1 || d.worker == 2));
    }

    #[test]
    fn test_sink_handle_failure_isolation() {
        let (sink, _log) = MemorySink::new("failing");
        let sink = sink.failing();
        let handle = SinkHandle::new("failing", 1, move |w| sink.for_worker(w));
        handle.spawn_workers().unwrap();

        for i in 0..3 {
            handle.enqueue(block(i));
        }
        handle.close();
        handle.join();

        assert_eq!(handle.metrics().snapshot().failure_count, 3);
        assert_eq!(handle.metrics().snapshot().write_count, 0);
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        let (sink, _log) = MemorySink::new("test");
        let handle = SinkHandle::new("test", 0, move |w| sink.for_worker(w));
        assert_eq!(handle.worker_count(), 1);
    }
}
