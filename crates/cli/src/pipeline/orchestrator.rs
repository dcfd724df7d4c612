//! Pipeline orchestrator - wires transports, aggregators and the dispatcher.

use aggregator::StaticAggregator;
use anyhow::{Context, Result};
use contracts::{BlockPublisher, BulkConfig};
use dispatcher::Dispatcher;
use ingestion::{pump, Batching, Connection, ConnectionOptions};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncRead;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::stats::PipelineStats;

/// A started dispatcher plus the shared static aggregator feeding it
pub struct Pipeline {
    config: BulkConfig,
    dispatcher: Arc<Dispatcher>,
    statics: Arc<StaticAggregator>,
    batching: Batching,
    connections: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    active_clients: Arc<AtomicU64>,
    started: Instant,
}

impl Pipeline {
    /// Build the sinks from `config` and start their workers
    pub fn new(config: BulkConfig) -> Result<Self> {
        let dispatcher = Arc::new(dispatcher::create_dispatcher(&config));
        dispatcher.start().context("Failed to start dispatcher")?;

        let publisher: Arc<dyn BlockPublisher> = dispatcher.clone();
        let statics = Arc::new(StaticAggregator::new(
            config.effective_threshold(),
            publisher.clone(),
        ));
        let batching = Batching::new(statics.clone(), publisher);

        info!(
            threshold = statics.threshold(),
            sinks = ?dispatcher.sink_names(),
            "Pipeline started"
        );

        Ok(Self {
            config,
            dispatcher,
            statics,
            batching,
            connections: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            active_clients: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
        })
    }

    /// TCP clients currently being served
    pub fn active_clients(&self) -> u64 {
        self.active_clients.load(Ordering::Relaxed)
    }

    /// Open a new input session
    pub fn connect(&self, options: ConnectionOptions) -> Connection {
        self.connections.fetch_add(1, Ordering::Relaxed);
        Connection::open(self.batching.clone(), options)
    }

    /// Batch everything `reader` yields until EOF or `shutdown` resolves
    ///
    /// Lines are taken as-is: no carriage-return stripping.
    pub async fn run_reader<R, S>(&self, reader: R, shutdown: S) -> Result<()>
    where
        R: AsyncRead + Unpin,
        S: Future<Output = ()>,
    {
        let connection = self.connect(ConnectionOptions::default());
        let result = tokio::select! {
            result = pump(reader, &connection) => result.map(Some),
            _ = shutdown => {
                warn!("Received shutdown signal, closing input");
                Ok(None)
            }
        };
        connection.finish();

        match result {
            Ok(Some(bytes)) => {
                self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
                debug!(bytes, "Input reached EOF");
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }

    /// Accept clients until `shutdown` resolves
    ///
    /// Every client gets its own connection. On shutdown the listener stops
    /// accepting and in-flight clients get `server.shutdown_grace_ms` to
    /// finish before they are torn down.
    #[instrument(name = "serve", skip_all)]
    pub async fn serve<S>(&self, listener: TcpListener, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let options = ConnectionOptions {
            strip_carriage_return: self.config.server.strip_carriage_return,
        };
        let mut clients = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!(active = self.active_clients(), "Received shutdown signal, no longer accepting");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let connection = self.connect(options);
                        let active = ActiveClient::register(self.active_clients.clone());
                        clients.spawn(handle_client(
                            stream,
                            peer,
                            connection,
                            active,
                            self.bytes_read.clone(),
                        ));
                    }
                    Err(e) => warn!(error = %e, "Failed to accept client"),
                },
                Some(joined) = clients.join_next(), if !clients.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Client task failed");
                    }
                }
            }
        }

        let grace = Duration::from_millis(self.config.server.shutdown_grace_ms);
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = clients.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Client task failed");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(remaining = self.active_clients(), "Clients still connected, closing them");
            // Aborted tasks drop their connection, which tears it down.
            clients.shutdown().await;
        }
        Ok(())
    }

    /// Flush the static batch, drain every sink and report totals
    pub fn shutdown(self) -> PipelineStats {
        info!("Shutting down pipeline");
        self.statics.flush();
        self.dispatcher.stop();

        PipelineStats {
            connections: self.connections.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            static_blocks: self.statics.published_count(),
            sinks: self.dispatcher.metrics(),
            duration: self.started.elapsed(),
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    connection: Connection,
    _active: ActiveClient,
    bytes_read: Arc<AtomicU64>,
) {
    let id = connection.id();
    info!(connection = id, %peer, "Client connected");

    match pump(stream, &connection).await {
        Ok(bytes) => {
            bytes_read.fetch_add(bytes, Ordering::Relaxed);
            info!(connection = id, bytes, "Client disconnected");
        }
        Err(e) => warn!(connection = id, error = %e, "Client read failed"),
    }

    connection.finish();
}

/// Counts one client as active (gauge and pipeline counter) while alive
///
/// The decrement runs on drop, so aborted client tasks are uncounted too.
struct ActiveClient(Arc<AtomicU64>);

impl ActiveClient {
    fn register(active: Arc<AtomicU64>) -> Self {
        active.fetch_add(1, Ordering::Relaxed);
        observability::record_connection(true);
        Self(active)
    }
}

impl Drop for ActiveClient {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
        observability::record_connection(false);
    }
}
