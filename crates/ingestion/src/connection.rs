//! Connection - per-session parser and nested-block state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aggregator::{BatchState, DynamicAggregator, StaticAggregator};
use contracts::{BlockPublisher, Timestamp};
use tracing::{debug, trace};

use crate::framing::LineBuffer;
use crate::line::Line;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Per-connection parsing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Remove one trailing `\r` from every line (network transports)
    pub strip_carriage_return: bool,
}

/// Shared pieces every connection routes into
#[derive(Clone)]
pub struct Batching {
    pub statics: Arc<StaticAggregator>,
    pub publisher: Arc<dyn BlockPublisher>,
}

impl Batching {
    pub fn new(statics: Arc<StaticAggregator>, publisher: Arc<dyn BlockPublisher>) -> Self {
        Self { statics, publisher }
    }
}

struct ConnectionState {
    buffer: LineBuffer,
    dynamic: DynamicAggregator,
    finished: bool,
}

/// One input session: buffers raw bytes, splits lines and routes them to
/// the shared static aggregator or this connection's dynamic aggregator.
///
/// Teardown runs exactly once, either through [`finish`](Self::finish) or
/// when the connection is dropped.
pub struct Connection {
    id: u64,
    batching: Batching,
    state: Mutex<ConnectionState>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("depth", &state.dynamic.depth())
            .field("buffered", &state.buffer.pending_len())
            .field("finished", &state.finished)
            .finish()
    }
}

impl Connection {
    /// Open a connection on the shared aggregators
    pub fn open(batching: Batching, options: ConnectionOptions) -> Self {
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(connection = id, "connection opened");
        Self {
            id,
            batching,
            state: Mutex::new(ConnectionState {
                buffer: LineBuffer::new(options.strip_carriage_return),
                dynamic: DynamicAggregator::new(),
                finished: false,
            }),
        }
    }

    /// Process-unique connection id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.lock().dynamic.depth()
    }

    /// Consume a chunk stamped with the wall clock
    pub fn feed(&self, data: &[u8]) {
        self.feed_at(data, contracts::now());
    }

    /// Consume a chunk; every line completed by it gets `timestamp`
    pub fn feed_at(&self, data: &[u8], timestamp: Timestamp) {
        if data.is_empty() {
            return;
        }
        let mut state = self.lock();
        if state.finished {
            return;
        }
        state.buffer.extend(data);
        while let Some(line) = state.buffer.next_line() {
            self.route(&mut state.dynamic, Line::classify(line), timestamp);
        }
    }

    /// End the session using the wall clock for a trailing partial line
    pub fn finish(self) {
        self.teardown(contracts::now());
    }

    /// End the session
    ///
    /// An unterminated last line counts as one literal command (never a
    /// marker). Any open dynamic block is discarded; otherwise the shared
    /// static batch is flushed.
    pub fn finish_at(self, timestamp: Timestamp) {
        self.teardown(timestamp);
    }

    fn teardown(&self, timestamp: Timestamp) {
        let mut state = self.lock();
        if state.finished {
            return;
        }
        state.finished = true;

        if let Some(tail) = state.buffer.take_remainder() {
            self.route(&mut state.dynamic, Line::Command(tail), timestamp);
        }

        let collecting = state.dynamic.state() == BatchState::Collecting;
        let discarded = state.dynamic.reset();
        if !collecting {
            self.batching.statics.flush();
        }
        debug!(connection = self.id, discarded, "connection closed");
    }

    fn route(&self, dynamic: &mut DynamicAggregator, line: Line, timestamp: Timestamp) {
        trace!(connection = self.id, ?line, "line");
        match line {
            Line::Open => dynamic.open(&self.batching.statics),
            Line::Close => {
                dynamic.close(self.batching.publisher.as_ref());
            }
            Line::Command(command) => match dynamic.state() {
                BatchState::Collecting => dynamic.literal(command, timestamp),
                BatchState::Idle => self.batching.statics.feed(command, timestamp),
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.teardown(contracts::now());
    }
}
