//! `run` command implementation.

use anyhow::Result;
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::Pipeline;
use crate::settings;
use crate::signal::shutdown_signal;

/// Execute the `run` command: batch stdin until EOF or a shutdown signal
pub async fn run_stdin(args: &RunArgs) -> Result<()> {
    let config = settings::resolve(&args.pipeline, args.threshold)?;

    info!(
        threshold = config.effective_threshold(),
        console = config.console.enabled,
        file = config.file.enabled,
        output_dir = %config.file.output_dir.display(),
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(config)?;
    let result = pipeline
        .run_reader(tokio::io::stdin(), shutdown_signal())
        .await;

    // Whatever was read still gets flushed and delivered.
    let stats = pipeline.shutdown();
    stats.log_summary();

    result
}
