//! Inference Engine Implementation

use crate::artifact::LinearModel;
use crate::onnx::OnnxModel;
use crate::InferenceError;
use feature_encoder::{EncodedRecord, SchemaId, SchemaVariant};
use std::path::Path;
use tracing::{debug, info, warn};

/// A loaded regression model producing log1p nightly prices
pub trait PriceModel: Send + Sync {
    /// Schema the model was trained against
    fn schema(&self) -> SchemaId;

    /// Columns the model takes, in any order
    fn expected_columns(&self) -> &[String];

    /// Run the model on a record whose columns already match
    fn predict_log(&self, record: &EncodedRecord) -> Result<f64, InferenceError>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Constant-output model for development and testing
#[derive(Debug, Clone)]
pub struct MockModel {
    schema: SchemaId,
    columns: Vec<String>,
    log_price: f64,
}

impl MockModel {
    pub fn new(schema: &SchemaVariant, log_price: f64) -> Self {
        Self {
            schema: schema.id,
            columns: schema.column_names().into_iter().map(String::from).collect(),
            log_price,
        }
    }
}

impl PriceModel for MockModel {
    fn schema(&self) -> SchemaId {
        self.schema
    }

    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict_log(&self, _record: &EncodedRecord) -> Result<f64, InferenceError> {
        Ok(self.log_price)
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}

/// Read-only model handle bound to one schema variant
pub struct InferenceEngine {
    /// Where the model came from
    model_path: String,
    schema: &'static SchemaVariant,
    model: Box<dyn PriceModel>,
}

impl InferenceEngine {
    /// Load a model artifact, choosing the backend by file extension
    pub fn load(
        path: impl AsRef<Path>,
        schema: &'static SchemaVariant,
    ) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!(
            "Loading price model {} for schema {}",
            path.display(),
            schema.id
        );

        let model: Box<dyn PriceModel> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Box::new(LinearModel::from_path(path)?),
            Some("onnx") => Box::new(OnnxModel::from_path(path)?),
            other => {
                return Err(InferenceError::ModelLoadError(format!(
                    "unsupported model format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };

        Self::from_model(path.display().to_string(), schema, model)
    }

    /// Wrap an already constructed model
    pub fn from_model(
        model_path: impl Into<String>,
        schema: &'static SchemaVariant,
        model: Box<dyn PriceModel>,
    ) -> Result<Self, InferenceError> {
        if model.schema() != schema.id {
            return Err(InferenceError::SchemaBinding {
                artifact: model.schema(),
                configured: schema.id,
            });
        }

        let mut expected: Vec<&str> = model.expected_columns().iter().map(String::as_str).collect();
        let mut declared = schema.column_names();
        expected.sort_unstable();
        declared.sort_unstable();
        if expected != declared {
            warn!(
                "Model columns {:?} differ from schema {} columns {:?}; requests will fail",
                expected, schema.id, declared
            );
        }

        let engine = Self {
            model_path: model_path.into(),
            schema,
            model,
        };
        info!(
            "Price model ready: backend={}, schema={}, columns={}",
            engine.backend(),
            schema.id,
            engine.expected_columns().len()
        );
        Ok(engine)
    }

    /// Create a mock engine that always answers `log_price`
    pub fn mock(schema: &'static SchemaVariant, log_price: f64) -> Self {
        info!("Creating mock inference engine for schema {}", schema.id);
        Self {
            model_path: "mock".to_string(),
            schema,
            model: Box::new(MockModel::new(schema, log_price)),
        }
    }

    /// Run the model on one encoded record, returning the log1p price
    pub fn predict(&self, record: &EncodedRecord) -> Result<f64, InferenceError> {
        let start = std::time::Instant::now();

        let diff = record.column_diff(self.model.expected_columns());
        if !diff.is_empty() {
            return Err(InferenceError::SchemaMismatch {
                missing: diff.missing,
                unexpected: diff.unexpected,
            });
        }

        let log_price = self.model.predict_log(record)?;

        debug!(
            "Inference completed in {}us (log_price={:.4})",
            start.elapsed().as_micros(),
            log_price
        );
        Ok(log_price)
    }

    pub fn expected_columns(&self) -> &[String] {
        self.model.expected_columns()
    }

    pub fn schema(&self) -> &'static SchemaVariant {
        self.schema
    }

    pub fn backend(&self) -> &'static str {
        self.model.backend()
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}
