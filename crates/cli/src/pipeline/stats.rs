//! Pipeline statistics collection.

use dispatcher::MetricsSnapshot;
use std::time::Duration;
use tracing::info;

/// Totals reported once the pipeline has shut down
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Connections opened (stdin counts as one)
    pub connections: u64,
    /// Raw bytes read from all connections
    pub bytes_read: u64,
    /// Blocks emitted by the shared static aggregator
    pub static_blocks: u64,
    /// Per-sink delivery counters
    pub sinks: Vec<(String, MetricsSnapshot)>,
    /// Wall time from start to shutdown
    pub duration: Duration,
}

impl PipelineStats {
    /// Blocks written successfully, summed across sinks
    pub fn delivered(&self) -> u64 {
        self.sinks.iter().map(|(_, m)| m.write_count).sum()
    }

    /// Failed writes plus rejected publishes, summed across sinks
    pub fn lost(&self) -> u64 {
        self.sinks
            .iter()
            .map(|(_, m)| m.failure_count + m.rejected_count)
            .sum()
    }

    /// Log the summary; stdout stays reserved for the console sink
    pub fn log_summary(&self) {
        info!(
            connections = self.connections,
            bytes_read = self.bytes_read,
            static_blocks = self.static_blocks,
            delivered = self.delivered(),
            lost = self.lost(),
            duration_secs = self.duration.as_secs_f64(),
            "Pipeline finished"
        );
        for (name, m) in &self.sinks {
            info!(
                sink = %name,
                writes = m.write_count,
                failures = m.failure_count,
                rejected = m.rejected_count,
                "Sink totals"
            );
        }
    }
}
