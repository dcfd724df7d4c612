//! # Contracts
//!
//! Frozen interface contracts shared by every pipeline stage.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Block timestamps are Unix epoch seconds of the first command in the block
//! - The clock is read by the transport edge, everything below it takes the
//!   timestamp as an argument

mod block;
mod config;
mod error;
mod publisher;
mod sink;

pub use block::*;
pub use config::*;
pub use error::*;
pub use publisher::BlockPublisher;
pub use sink::{BlockSink, WorkerId};
