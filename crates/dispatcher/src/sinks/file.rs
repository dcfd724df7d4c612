//! FileSink - one file per block

use contracts::{Block, BlockSink, ContractError, Timestamp, WorkerId};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory, created on demand
    pub output_dir: PathBuf,
}

/// Process-wide file sequence: unique across every sink, class and dispatcher
static FILE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Sink that writes every block to a fresh file
///
/// File names are `bulk{ts}_{worker}_{seq}.log`. `seq` comes from one
/// process-wide counter, so no two writes ever share a name.
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    worker: WorkerId,
}

impl FileSink {
    /// Create a FileSink for one worker
    pub fn new(name: impl Into<String>, config: FileSinkConfig, worker: WorkerId) -> Self {
        Self {
            name: name.into(),
            config,
            worker,
        }
    }

    /// Per-worker constructor (for SinkHandle)
    pub fn factory(
        name: impl Into<String>,
        config: FileSinkConfig,
    ) -> impl Fn(WorkerId) -> FileSink + Send + Sync + 'static {
        let name = name.into();
        move |worker| FileSink::new(name.clone(), config.clone(), worker)
    }

    /// File name for a block
    pub fn file_name(timestamp: Timestamp, worker: WorkerId, seq: u64) -> String {
        format!("bulk{timestamp}_{worker}_{seq}.log")
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn write_block_to_disk(&self, block: &Block, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(&self.config.output_dir)?;
        let mut file = File::create(path)?;
        writeln!(file, "{block}")?;
        Ok(())
    }
}

impl BlockSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, block),
        fields(sink = %self.name, worker = self.worker, ts = block.timestamp())
    )]
    fn write(&mut self, block: &Block) -> Result<(), ContractError> {
        let seq = FILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let path = self
            .config
            .output_dir
            .join(Self::file_name(block.timestamp(), self.worker, seq));

        self.write_block_to_disk(block, &path).map_err(|e| {
            let source = std::io::Error::new(e.kind(), format!("{}: {e}", path.display()));
            ContractError::sink_write(&self.name, source)
        })?;
        debug!(sink = %self.name, path = %path.display(), "block written");
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, worker = self.worker, "FileSink closed");
        Ok(())
    }
}
