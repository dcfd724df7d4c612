//! Dispatcher - lifecycle and fan-out to consumer classes

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{Block, BlockPublisher, BulkConfig};
use tracing::{debug, info, instrument};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{ConsoleSink, FileSink, FileSinkConfig};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Created, workers not spawned yet; published blocks wait in the queues
    Idle,
    /// Workers draining queues
    Running,
    /// Queues closed, workers joined
    Stopped,
}

/// Builder for creating a Dispatcher
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    handles: Vec<SinkHandle>,
}

impl DispatcherBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer class
    pub fn sink(mut self, handle: SinkHandle) -> Self {
        self.handles.push(handle);
        self
    }

    /// Register the console and file classes enabled in `config`
    pub fn with_config(mut self, config: &BulkConfig) -> Self {
        if config.console.enabled {
            let label = config.console.label.clone();
            self.handles.push(SinkHandle::new("console", 1, move |_| {
                ConsoleSink::stdout("console", label.clone())
            }));
        }
        if config.file.enabled {
            let file_config = FileSinkConfig {
                output_dir: config.file.output_dir.clone(),
            };
            self.handles.push(SinkHandle::new(
                "file",
                config.file.workers,
                FileSink::factory("file", file_config),
            ));
        }
        self
    }

    /// Build the dispatcher (not started)
    pub fn build(self) -> Dispatcher {
        Dispatcher::with_handles(self.handles)
    }
}

/// Fans every published block out to all consumer classes
///
/// `publish` only takes each queue's lock long enough to enqueue. `stop`
/// closes the queues and waits until every already-queued block has been
/// processed.
#[derive(Debug)]
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    state: AtomicU8,
    /// Held by `start` and `stop` so workers are never spawned behind a stop
    lifecycle: Mutex<()>,
}

impl Dispatcher {
    /// Console and file classes as enabled in `config` (not started)
    pub fn from_config(config: &BulkConfig) -> Self {
        DispatcherBuilder::new().with_config(config).build()
    }

    /// Create a dispatcher with custom sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            state: AtomicU8::new(IDLE),
            lifecycle: Mutex::new(()),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DispatcherState {
        match self.state.load(Ordering::Acquire) {
            IDLE => DispatcherState::Idle,
            RUNNING => DispatcherState::Running,
            _ => DispatcherState::Stopped,
        }
    }

    /// Names of the registered consumer classes
    pub fn sink_names(&self) -> Vec<&str> {
        self.handles.iter().map(SinkHandle::name).collect()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Spawn the workers. Only the first call from `Idle` does anything.
    #[instrument(name = "dispatcher_start", skip(self), fields(sinks = self.handles.len()))]
    pub fn start(&self) -> Result<(), DispatcherError> {
        let _lifecycle = self.lock_lifecycle();
        if self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Dispatcher already started");
            return Ok(());
        }

        for handle in &self.handles {
            handle.spawn_workers()?;
        }
        info!(
            sinks = self.handles.len(),
            workers = self.handles.iter().map(SinkHandle::worker_count).sum::<usize>(),
            "Dispatcher started"
        );
        Ok(())
    }

    /// Close every queue and join every worker after it drained its queue.
    ///
    /// Redundant calls are no-ops. Blocks published afterwards are rejected.
    #[instrument(name = "dispatcher_stop", skip(self))]
    pub fn stop(&self) {
        let _lifecycle = self.lock_lifecycle();
        let previous = self.state.swap(STOPPED, Ordering::AcqRel);
        if previous == STOPPED {
            return;
        }

        for handle in &self.handles {
            handle.close();
        }
        if previous == RUNNING {
            for handle in &self.handles {
                handle.join();
            }
        }
        info!(metrics = ?self.metrics(), "Dispatcher stopped");
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlockPublisher for Dispatcher {
    fn publish(&self, block: Block) {
        let Some((last, rest)) = self.handles.split_last() else {
            return;
        };
        for handle in rest {
            handle.enqueue(block.clone());
        }
        last.enqueue(block);
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Convenience function to create a dispatcher from the pipeline config
pub fn create_dispatcher(config: &BulkConfig) -> Dispatcher {
    Dispatcher::from_config(config)
}
