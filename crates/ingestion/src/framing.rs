//! Newline framing over arbitrary byte chunks.

use bytes::BytesMut;

/// Accumulates raw bytes and yields complete `\n`-terminated lines.
///
/// The unterminated tail stays buffered until more bytes arrive or the
/// connection ends.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Prefix of `buf` already known to contain no newline
    scanned: usize,
    strip_carriage_return: bool,
}

impl LineBuffer {
    pub fn new(strip_carriage_return: bool) -> Self {
        Self {
            strip_carriage_return,
            ..Default::default()
        }
    }

    /// Append a chunk
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Next complete line without its terminator, if any
    pub fn next_line(&mut self) -> Option<String> {
        match self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset;
                let mut line = self.buf.split_to(end + 1);
                line.truncate(end);
                self.scanned = 0;
                Some(self.decode(line))
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }

    /// Take the unterminated tail, `None` if nothing is buffered
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let tail = self.buf.split();
        self.scanned = 0;
        Some(self.decode(tail))
    }

    /// Bytes waiting for a terminator
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Commands are text: valid UTF-8 passes through unchanged, each invalid
    /// sequence becomes U+FFFD.
    fn decode(&self, mut line: BytesMut) -> String {
        if self.strip_carriage_return && line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        String::from_utf8_lossy(&line).into_owned()
    }
}
