//! The `gatehouse` server binary.
//!
//! Configuration comes from an optional file named by `GATEHOUSE_CONFIG`,
//! a `.env` file and `GATEHOUSE__SECTION__KEY` variables. The process exits
//! non-zero if configuration, telemetry or binding fails.

use anyhow::Context;
use gatehouse::app;
use gatehouse_core::ShutdownSignal;
use gatehouse_server::DrainOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = app::load_config().context("failed to load configuration")?;

    gatehouse_telemetry::init_telemetry(&app::telemetry_config(&config.telemetry))
        .context("failed to initialize telemetry")?;

    tracing::info!(
        http_addr = %config.server.http_addr,
        shutdown_timeout_secs = config.server.shutdown_timeout_secs,
        metrics = config.telemetry.metrics.enabled,
        "Starting gatehouse"
    );

    let shutdown = ShutdownSignal::with_os_signals();
    let server = app::build_server(&config, shutdown.clone())?;

    match server.run_with_shutdown(shutdown).await? {
        DrainOutcome::Clean => tracing::info!("Shutdown complete"),
        DrainOutcome::Forced { aborted } => {
            tracing::warn!(aborted, "Shutdown complete with aborted connections");
        }
    }
    Ok(())
}
