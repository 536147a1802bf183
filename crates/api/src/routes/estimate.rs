//! Estimate Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_encoder::{PropertyAttributes, SchemaId};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::PredictionError;
use crate::telemetry::record_outcome;
use crate::AppState;

/// Successful estimate
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    /// Nightly price in GBP
    pub price: f64,
    /// Raw model output (log1p scale)
    pub log_price: f64,
    pub schema: SchemaId,
    pub message: String,
}

/// Estimate the nightly price for the posted attributes
pub async fn post_estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertyAttributes>, JsonRejection>,
) -> Result<Json<EstimateResponse>, PredictionError> {
    let result = payload
        .map_err(|rejection| PredictionError::MalformedRequest(rejection.body_text()))
        .and_then(|Json(attrs)| {
            state.estimate_count.fetch_add(1, Ordering::Relaxed);
            state.estimator.estimate(&attrs)
        });

    record_outcome(match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    });

    let estimate = result?;
    Ok(Json(EstimateResponse {
        price: estimate.price,
        log_price: estimate.log_price,
        schema: state.estimator.schema().id,
        message: estimate.to_string(),
    }))
}
