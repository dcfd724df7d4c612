//! Byte-stream transport glue.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::connection::Connection;
use crate::error::{IngestionError, Result};

/// Read chunk size
pub const READ_CHUNK: usize = 4096;

/// Feed everything `reader` yields into `connection` until EOF.
///
/// Returns the number of bytes consumed. The connection is left open: the
/// caller finishes it whether this returns `Ok` or `Err`.
pub async fn pump<R>(mut reader: R, connection: &Connection) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK];
    let mut total = 0u64;
    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|source| IngestionError::Read {
                connection: connection.id(),
                source,
            })?;
        if n == 0 {
            break;
        }
        trace!(connection = connection.id(), bytes = n, "chunk received");
        connection.feed(&chunk[..n]);
        total += n as u64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Batching, ConnectionOptions};
    use aggregator::{RecordingPublisher, StaticAggregator};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pump_until_eof() {
        let publisher = Arc::new(RecordingPublisher::new());
        let statics = Arc::new(StaticAggregator::new(2, publisher.clone()));
        let batching = Batching::new(statics, publisher.clone());
        let conn = Connection::open(batching, ConnectionOptions::default());

        let input: &[u8] = b"a\nb\nc\n{\nd\n}\ne";
        let total = pump(input, &conn).await.unwrap();
        assert_eq!(total, input.len() as u64);
        assert_eq!(publisher.rendered(), ["a, b", "c", "d"]);

        conn.finish();
        assert_eq!(publisher.rendered(), ["a, b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_pump_from_duplex_stream() {
        use tokio::io::AsyncWriteExt;

        let publisher = Arc::new(RecordingPublisher::new());
        let statics = Arc::new(StaticAggregator::new(3, publisher.clone()));
        let conn = Connection::open(
            Batching::new(statics, publisher.clone()),
            ConnectionOptions {
                strip_carriage_return: true,
            },
        );

        let (mut client, server) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            client.write_all(b"x\r\ny\r\nz\r\n").await.unwrap();
        });
        pump(server, &conn).await.unwrap();
        writer.await.unwrap();

        assert_eq!(publisher.rendered(), ["x, y, z"]);
    }
}
