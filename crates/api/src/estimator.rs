//! Estimate Pipeline
//!
//! validate → encode → predict → inverse transform, for one request.

use data_validator::Validator;
use feature_encoder::{FeatureEncoder, PriceEstimate, PropertyAttributes, SchemaVariant};
use inference_engine::InferenceEngine;
use std::path::Path;
use tracing::{debug, error};

use crate::error::PredictionError;

/// The process-wide model, or why it is missing
pub enum ModelHandle {
    Ready(InferenceEngine),
    Unavailable(String),
}

impl ModelHandle {
    /// Load once at startup; a failure is kept, not raised
    pub fn load(path: impl AsRef<Path>, schema: &'static SchemaVariant) -> Self {
        match InferenceEngine::load(path, schema) {
            Ok(engine) => ModelHandle::Ready(engine),
            Err(e) => {
                error!("Price model unavailable: {}", e);
                ModelHandle::Unavailable(e.to_string())
            }
        }
    }

    pub fn engine(&self) -> Result<&InferenceEngine, PredictionError> {
        match self {
            ModelHandle::Ready(engine) => Ok(engine),
            ModelHandle::Unavailable(reason) => {
                Err(PredictionError::GatewayUnavailable(reason.clone()))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelHandle::Ready(_))
    }
}

/// Serves estimate requests for one schema variant
pub struct Estimator {
    encoder: FeatureEncoder,
    validator: Validator,
    model: ModelHandle,
}

impl Estimator {
    pub fn new(schema: &'static SchemaVariant, model: ModelHandle) -> Self {
        Self {
            encoder: FeatureEncoder::new(schema),
            validator: Validator::for_schema(schema),
            model,
        }
    }

    pub fn schema(&self) -> &'static SchemaVariant {
        self.encoder.schema()
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Estimate the nightly price for a set of attributes
    pub fn estimate(&self, attrs: &PropertyAttributes) -> Result<PriceEstimate, PredictionError> {
        self.validator.validate(attrs).into_result()?;
        let record = self.encoder.encode(attrs)?;
        let engine = self.model.engine()?;
        let log_price = engine.predict(&record)?;
        let estimate = PriceEstimate::from_log(log_price)?;

        debug!("Estimated {:.2} for {}", estimate.price, attrs.borough);
        Ok(estimate)
    }

    /// Estimate and render the user-facing outcome line
    pub fn render(&self, attrs: &PropertyAttributes) -> String {
        match self.estimate(attrs) {
            Ok(estimate) => estimate.to_string(),
            Err(e) => e.user_message(),
        }
    }
}
