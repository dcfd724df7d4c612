//! # Dispatcher
//!
//! Block fan-out module.
//!
//! Responsibilities:
//! - Accept completed `Block`s from the aggregators
//! - Fan out to every consumer class, each with its own unbounded queue
//! - Isolate slow sinks: a lagging consumer never blocks producers or peers
//! - Drain every queued block on shutdown

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{Block, BlockPublisher, BlockSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherState};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{ConsoleSink, Delivery, FileSink, FileSinkConfig, MemorySink};
