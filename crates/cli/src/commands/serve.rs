//! `serve` command implementation.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::ServeArgs;
use crate::pipeline::Pipeline;
use crate::settings;
use crate::signal::shutdown_signal;

/// Execute the `serve` command: batch TCP clients until a shutdown signal
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let mut config = settings::load_config(args.pipeline.config.as_deref())?;
    settings::apply_overrides(&mut config, &args.pipeline, args.threshold);
    if let Some(ref bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        info!(port, "Overriding port from CLI");
        config.server.port = port;
    }
    config_loader::ConfigLoader::validate(&config)
        .context("Invalid configuration after CLI overrides")?;

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %listener.local_addr().context("Listener has no local address")?,
        threshold = config.effective_threshold(),
        "Listening for clients"
    );

    let pipeline = Pipeline::new(config)?;
    let result = pipeline.serve(listener, shutdown_signal()).await;

    let stats = pipeline.shutdown();
    stats.log_summary();

    result
}
