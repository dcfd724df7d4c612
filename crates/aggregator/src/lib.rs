//! # Aggregator
//!
//! Groups literal commands into blocks.
//!
//! Responsibilities:
//! - Size-triggered batching shared by every connection ([`StaticAggregator`])
//! - Marker-delimited nested batching per connection ([`DynamicAggregator`])
//! - Hand completed `Block`s to a [`BlockPublisher`]
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use aggregator::{DynamicAggregator, RecordingPublisher, StaticAggregator};
//!
//! let publisher = Arc::new(RecordingPublisher::new());
//! let statics = StaticAggregator::new(3, publisher.clone());
//! let mut dynamic = DynamicAggregator::new();
//!
//! statics.feed("cmd1".to_string(), 1);
//! dynamic.open(&statics); // flushes "cmd1"
//! dynamic.literal("cmd2".to_string(), 2);
//! dynamic.close(publisher.as_ref());
//!
//! assert_eq!(publisher.len(), 2);
//! ```

mod batch;
mod dynamic;
mod mock;
mod statics;

pub use contracts::{Block, BlockPublisher, Timestamp};
pub use dynamic::{BatchState, DynamicAggregator};
pub use mock::RecordingPublisher;
pub use statics::StaticAggregator;
