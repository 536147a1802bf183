//! Service Configuration
//!
//! Defaults, then an optional `pricing.toml`, then `PRICING_*` environment
//! variables. `PRICING_CONFIG` points at a different file.

use config::{Config, ConfigError, Environment, File, FileFormat};
use feature_encoder::SchemaId;
use serde::Deserialize;
use std::path::PathBuf;

/// Default config file stem
pub const DEFAULT_CONFIG_FILE: &str = "pricing";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Schema variant the model artifact was trained for
    pub schema: SchemaId,
    /// Path to the model artifact (`.json` or `.onnx`)
    pub model_path: PathBuf,
    /// Max tracing level
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Serve a constant log price instead of loading a model
    #[serde(default)]
    pub mock_log_price: Option<f64>,
}

impl ServiceConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("PRICING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::builder()?
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix("PRICING"))
            .build()?
            .try_deserialize()
    }

    /// Load from an in-memory TOML document on top of the defaults
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("schema", SchemaId::ShortTermFull.as_str())?
            .set_default("model_path", "model.json")?
            .set_default("log_level", "info")?
            .set_default("json_logs", false)
    }
}
