//! Rental Price Estimator - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, telemetry, AppState, ServiceConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load configuration")?;
    init_logging(&config.log_level, config.json_logs).context("failed to initialize logging")?;

    info!("=== Rental Price Estimator v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Schema {}, model {}",
        config.schema,
        config.model_path.display()
    );

    let metrics = telemetry::install_recorder();
    let state = Arc::new(AppState::from_config(&config, metrics));

    run_server(&config.bind_addr, state).await?;

    Ok(())
}
