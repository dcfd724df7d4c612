//! ConsoleSink - one line per block on stdout

use std::io::{self, Write};

use contracts::{Block, BlockSink, ContractError};
use tracing::{debug, instrument};

/// Sink that prints `label` followed by the block's commands
pub struct ConsoleSink<W = io::Stdout> {
    name: String,
    label: String,
    writer: W,
}

impl ConsoleSink {
    /// Console sink writing to process stdout
    pub fn stdout(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_writer(name, label, io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Console sink writing to any writer
    pub fn with_writer(name: impl Into<String>, label: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            writer,
        }
    }

    fn print_block(&mut self, block: &Block) -> io::Result<()> {
        // One write per line so concurrent stdout users never split it
        let line = format!("{}{}\n", self.label, block);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }
}

impl<W: Write + Send> BlockSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_write",
        skip(self, block),
        fields(sink = %self.name, commands = block.len())
    )]
    fn write(&mut self, block: &Block) -> Result<(), ContractError> {
        self.print_block(block)
            .map_err(|e| ContractError::sink_write(&self.name, e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "ConsoleSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(commands: &[&str]) -> Block {
        Block::new(commands.iter().map(|c| c.to_string()).collect(), 1).unwrap()
    }

    #[test]
    fn test_console_format() {
        let mut sink = ConsoleSink::with_writer("console", "bulk: ", Vec::new());
        sink.write(&block(&["cmd1", "cmd2", "cmd3"])).unwrap();
        sink.write(&block(&["cmd4"])).unwrap();

        let output = String::from_utf8(sink.writer.clone()).unwrap();
        assert_eq!(output, "bulk: cmd1, cmd2, cmd3\nbulk: cmd4\n");
    }

    #[test]
    fn test_console_custom_label() {
        let mut sink = ConsoleSink::with_writer("console", "", Vec::new());
        sink.write(&block(&["a", "b"])).unwrap();
        assert_eq!(sink.writer, b"a, b\n");
    }

    #[test]
    fn test_console_name() {
        let sink = ConsoleSink::stdout("my_console", "bulk: ");
        assert_eq!(sink.name(), "my_console");
    }
}
