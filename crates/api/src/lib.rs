//! Rental Price Estimation API
//!
//! HTTP service around the feature encoder and the price model: one
//! schema variant and one read-only model per process.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_encoder::{CrimeRateTable, SchemaId};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod estimator;
mod routes;
pub mod telemetry;

pub use crate::config::ServiceConfig;
pub use crate::error::PredictionError;
pub use crate::estimator::{Estimator, ModelHandle};
pub use crate::telemetry::init_logging;

/// Application state shared across handlers; immutable after startup
pub struct AppState {
    pub estimator: Estimator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Well-formed estimate requests, successful or not
    pub estimate_count: AtomicU64,
    /// Prometheus handle, when a recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(estimator: Estimator, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            estimator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            estimate_count: AtomicU64::new(0),
            metrics,
        }
    }

    /// Build state from configuration, loading the model once
    pub fn from_config(config: &ServiceConfig, metrics: Option<PrometheusHandle>) -> Self {
        let schema = config.schema.variant();

        if schema.include_crime_rate() {
            let audit = CrimeRateTable::london().audit(schema.boroughs);
            if !audit.is_clean() {
                warn!(
                    "Crime-rate table disagrees with schema {} boroughs: unmatched={:?}, unreachable={:?}",
                    schema.id, audit.unmatched, audit.unreachable
                );
            }
        }

        let model = match config.mock_log_price {
            Some(log_price) => ModelHandle::Ready(InferenceEngine::mock(schema, log_price)),
            None => ModelHandle::load(&config.model_path, schema),
        };

        Self::new(Estimator::new(schema, model), metrics)
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub schema: SchemaId,
    pub model: ModelStatus,
    pub estimate_count: u64,
}

/// Model gateway status
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub status: String,
    pub backend: Option<String>,
    pub path: Option<String>,
    pub reason: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/api/v1/estimate", post(routes::estimate::post_estimate))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let model = match state.estimator.model() {
        ModelHandle::Ready(engine) => ModelStatus {
            status: "ok".to_string(),
            backend: Some(engine.backend().to_string()),
            path: Some(engine.model_path().to_string()),
            reason: None,
        },
        ModelHandle::Unavailable(reason) => ModelStatus {
            status: "unavailable".to_string(),
            backend: None,
            path: None,
            reason: Some(reason.clone()),
        },
    };

    let status = if state.estimator.model().is_ready() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        schema: state.estimator.schema().id,
        model,
        estimate_count: state.estimate_count.load(Ordering::Relaxed),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Run the server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_with(schema: SchemaId, model: ModelHandle) -> Arc<AppState> {
        Arc::new(AppState::new(Estimator::new(schema.variant(), model), None))
    }

    fn mock_state(schema: SchemaId, log_price: f64) -> Arc<AppState> {
        state_with(
            schema,
            ModelHandle::Ready(InferenceEngine::mock(schema.variant(), log_price)),
        )
    }

    async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_estimate(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/estimate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn full_payload(borough: &str) -> Value {
        json!({
            "property_type": "Entire condo",
            "room_type": "Entire home/apt",
            "accommodates": 2,
            "bedrooms": 1,
            "bathrooms": 1,
            "borough": borough,
            "distance_to_nearest_tube_station": 0.5,
            "availability_365": 100,
            "days_from_last_review": 20,
            "amenities": ["Dining and Drinking", "Retail", "None"]
        })
    }

    #[tokio::test]
    async fn test_estimate_success() {
        let state = mock_state(SchemaId::ShortTermFull, 5.0);
        let (status, body) = send(state.clone(), post_estimate(full_payload("Camden"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Recommended Price: £147.41 per night");
        assert_eq!(body["schema"], "short-term-full");
        assert_eq!(state.estimate_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_estimate_lookup_failure() {
        let state = mock_state(SchemaId::ShortTermFull, 5.0);
        let (status, body) = send(state.clone(), post_estimate(full_payload("Ealing"))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "lookup_key");
        assert_eq!(state.estimate_count.load(Ordering::Relaxed), 1);
        assert_eq!(
            body["message"],
            "Prediction failed: no crime rate for borough \"Ealing\""
        );
    }

    #[tokio::test]
    async fn test_estimate_invalid_input() {
        let state = mock_state(SchemaId::ShortTermFull, 5.0);
        let mut payload = full_payload("Camden");
        payload["bedrooms"] = json!(50);
        let (status, body) = send(state, post_estimate(payload)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_estimate_malformed_body() {
        let state = mock_state(SchemaId::ShortTermFull, 5.0);
        let (status, body) = send(
            state.clone(),
            post_estimate(json!({ "borough": "Camden" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed_request");
        assert_eq!(state.estimate_count.load(Ordering::Relaxed), 0);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Prediction failed: malformed request"));
    }

    #[tokio::test]
    async fn test_estimate_gateway_unavailable() {
        let state = state_with(
            SchemaId::ShortTermFull,
            ModelHandle::Unavailable("model.json: No such file or directory".into()),
        );
        let (status, body) = send(state, post_estimate(full_payload("Camden"))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "gateway_unavailable");
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let state = state_with(
            SchemaId::MidTerm,
            ModelHandle::Unavailable("missing artifact".into()),
        );
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["schema"], "mid-term");
        assert_eq!(body["model"]["status"], "unavailable");
        assert_eq!(body["model"]["reason"], "missing artifact");
    }

    #[tokio::test]
    async fn test_schema_endpoint() {
        let state = mock_state(SchemaId::ShortTermCrime, 5.0);
        let request = Request::builder()
            .uri("/api/v1/schema")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["include_crime_rate"], true);
        assert_eq!(body["normalize_borough_whitespace"], true);
        assert_eq!(body["amenities"].as_array().unwrap().len(), 17);
        assert_eq!(body["boroughs"].as_array().unwrap().len(), 32);
        assert!(body["room_types"].as_array().unwrap().is_empty());
        assert_eq!(body["bounds"]["distance_km"], json!([0.0, 20.0]));
    }

    #[tokio::test]
    async fn test_from_config_with_mock() {
        let config = ServiceConfig::from_toml(
            r#"
            schema = "short-term-crime"
            mock_log_price = 5.0
            "#,
        )
        .unwrap();
        let state = Arc::new(AppState::from_config(&config, None));
        assert!(state.estimator.model().is_ready());

        let payload = json!({
            "property_type": "Entire rental unit",
            "bedrooms": 2,
            "bathrooms": 1,
            "borough": "Kensington and Chelsea",
            "distance_to_nearest_tube_station": 12.5,
            "minimum_nights": 3,
            "amenities": ["Pub", "Park", "Museum"]
        });
        let (status, body) = send(state, post_estimate(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["price"].as_f64().unwrap() - 147.4132).abs() < 1e-3);
    }
}
