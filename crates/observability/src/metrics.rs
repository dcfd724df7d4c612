//! Pipeline metrics.
//!
//! Thin wrappers around the `metrics` facade so every crate records the same
//! names and labels. Without an installed recorder these calls are no-ops.

use metrics::{counter, gauge, histogram};

/// Record a completed block leaving an aggregator
///
/// `origin` is `"static"` (size/flush triggered) or `"dynamic"` (markers).
pub fn record_block_published(origin: &'static str, commands: usize) {
    counter!("bulk_blocks_published_total", "origin" => origin).increment(1);
    histogram!("bulk_block_commands", "origin" => origin).record(commands as f64);
}

/// Record the outcome of one sink write
pub fn record_block_delivered(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "bulk_blocks_delivered_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a block refused by a closed queue
pub fn record_block_rejected(sink_name: &str) {
    counter!("bulk_blocks_rejected_total", "sink" => sink_name.to_string()).increment(1);
}

/// Record the current depth of a sink queue
pub fn record_queue_depth(sink_name: &str, depth: usize) {
    gauge!("bulk_queue_depth", "sink" => sink_name.to_string()).set(depth as f64);
}

/// Record connection open/close on the network transport
pub fn record_connection(opened: bool) {
    if opened {
        counter!("bulk_connections_total").increment(1);
        gauge!("bulk_connections_active").increment(1.0);
    } else {
        gauge!("bulk_connections_active").decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_block_published("static", 3);
        record_block_delivered("console", true);
        record_block_delivered("file", false);
        record_block_rejected("file");
        record_queue_depth("console", 4);
        record_connection(true);
        record_connection(false);
    }
}
