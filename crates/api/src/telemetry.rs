//! Logging and Prometheus Metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{subscriber::SetGlobalDefaultError, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Counter of estimate requests, labelled by outcome
pub const ESTIMATES_TOTAL: &str = "price_estimates_total";

/// Install the global recorder; `None` if one is already installed
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

pub fn record_outcome(outcome: &'static str) {
    ::metrics::counter!(ESTIMATES_TOTAL, "outcome" => outcome).increment(1);
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> Result<(), SetGlobalDefaultError> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}
