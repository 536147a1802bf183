//! Request Boundary Errors
//!
//! Every failure on the estimate path ends up here and is rendered once
//! as `"Prediction failed: {reason}"`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use feature_encoder::EncodeError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;

/// Failure of a single estimate request
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Request body could not be read as property attributes
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Attributes outside the form's constraints
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Borough has no crime-rate entry
    #[error("{0}")]
    LookupKey(String),

    /// Record columns differ from what the model expects
    #[error("{0}")]
    SchemaMismatch(String),

    /// Model output has no finite price
    #[error("{0}")]
    NonFiniteResult(String),

    /// The model artifact did not load
    #[error("model unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("{0}")]
    Inference(String),
}

impl PredictionError {
    /// Stable machine-readable kind, also used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::MalformedRequest(_) => "malformed_request",
            PredictionError::InvalidInput(_) => "invalid_input",
            PredictionError::LookupKey(_) => "lookup_key",
            PredictionError::SchemaMismatch(_) => "schema_mismatch",
            PredictionError::NonFiniteResult(_) => "non_finite_result",
            PredictionError::GatewayUnavailable(_) => "gateway_unavailable",
            PredictionError::Inference(_) => "inference",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PredictionError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            PredictionError::InvalidInput(_) | PredictionError::LookupKey(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PredictionError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PredictionError::SchemaMismatch(_)
            | PredictionError::NonFiniteResult(_)
            | PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the user
    pub fn user_message(&self) -> String {
        format!("Prediction failed: {self}")
    }
}

impl From<EncodeError> for PredictionError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnknownBorough(_) => PredictionError::LookupKey(err.to_string()),
            EncodeError::MissingField { .. } => PredictionError::SchemaMismatch(err.to_string()),
            EncodeError::NonFiniteResult(_) => PredictionError::NonFiniteResult(err.to_string()),
            EncodeError::UnknownOption { field, value } => {
                PredictionError::InvalidInput(ValidationError::NotAnOption { field, value })
            }
        }
    }
}

impl From<InferenceError> for PredictionError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::SchemaMismatch { .. } => {
                PredictionError::SchemaMismatch(err.to_string())
            }
            InferenceError::ModelLoadError(_) | InferenceError::SchemaBinding { .. } => {
                PredictionError::GatewayUnavailable(err.to_string())
            }
            InferenceError::InferenceFailed(_) | InferenceError::InvalidInputShape { .. } => {
                PredictionError::Inference(err.to_string())
            }
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind(),
            message: self.user_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_encoder::Column;

    #[test]
    fn test_encode_error_mapping() {
        let err = PredictionError::from(EncodeError::UnknownBorough("Ealing".into()));
        assert_eq!(err.kind(), "lookup_key");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.user_message(),
            "Prediction failed: no crime rate for borough \"Ealing\""
        );

        let err = PredictionError::from(EncodeError::MissingField {
            column: Column::MinimumNights,
        });
        assert_eq!(err.kind(), "schema_mismatch");
    }

    #[test]
    fn test_inference_error_mapping() {
        let err = PredictionError::from(InferenceError::ModelLoadError("model.json: not found".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.user_message().starts_with("Prediction failed: model unavailable"));

        let err = PredictionError::from(InferenceError::SchemaMismatch {
            missing: vec!["crime_rate".into()],
            unexpected: vec![],
        });
        assert_eq!(err.kind(), "schema_mismatch");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
