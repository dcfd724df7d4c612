//! Block - the unit of delivery to consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unix epoch seconds
pub type Timestamp = i64;

/// Current wall-clock time as a block timestamp
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

/// An immutable, ordered batch of commands sharing one timestamp.
///
/// A block is never empty: [`Block::new`] refuses an empty command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    commands: Vec<String>,
    timestamp: Timestamp,
}

impl Block {
    /// Create a block, or `None` if `commands` is empty
    pub fn new(commands: Vec<String>, timestamp: Timestamp) -> Option<Self> {
        if commands.is_empty() {
            return None;
        }
        Some(Self {
            commands,
            timestamp,
        })
    }

    /// Commands in the order they were observed
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Time the first command of the block was observed
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Number of commands (always >= 1)
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Renders the commands joined with `", "`, without any label.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(command)?;
        }
        Ok(())
    }
}
