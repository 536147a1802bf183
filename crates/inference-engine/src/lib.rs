//! Price Model Inference
//!
//! Loads a persisted nightly-price model once, binds it to a schema
//! variant and runs it on encoded records. Linear JSON artifacts are
//! evaluated in-process; ONNX graphs run through tract-onnx.

mod artifact;
mod engine;
mod onnx;

pub use artifact::LinearModel;
pub use engine::{InferenceEngine, MockModel, PriceModel};
pub use onnx::{InputLayout, InputSlot, OnnxModel};

use feature_encoder::SchemaId;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("model artifact was trained for schema {artifact}, service is configured for {configured}")]
    SchemaBinding {
        artifact: SchemaId,
        configured: SchemaId,
    },
    #[error("schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}
