//! # Ingestion
//!
//! Turns raw input bytes into routed commands.
//!
//! Responsibilities:
//! - Newline framing across arbitrary chunk boundaries ([`LineBuffer`])
//! - Marker / command classification ([`Line`])
//! - Per-session state and routing ([`Connection`]): literals go to the shared
//!   static aggregator, or to the connection's own dynamic block while one is open
//! - Pumping an async byte stream into a connection ([`pump`])
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{Batching, Connection, ConnectionOptions};
//!
//! let batching = Batching::new(statics, dispatcher);
//! let conn = Connection::open(batching, ConnectionOptions::default());
//! conn.feed(b"cmd1\ncmd2\n{\ncmd3\n}\n");
//! conn.finish();
//! ```

mod connection;
mod error;
mod framing;
mod line;
mod transport;

// Re-exports
pub use connection::{Batching, Connection, ConnectionOptions};
pub use error::{IngestionError, Result};
pub use framing::LineBuffer;
pub use line::{Line, CLOSE_MARKER, OPEN_MARKER};
pub use transport::{pump, READ_CHUNK};
