//! HTTP API for house price predictions

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::json;
use server_lib::{
    dataset::ReferenceData,
    insights::{feature_report, insights_report},
    observability::ApiMetrics,
    predictor::resolve,
    registry::ModelRegistry,
    ModelMetrics, PredictionRequest, PredictionResult, ResolveError,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
///
/// Registry and reference data are built once at startup and never
/// mutated; the metrics handle points at the process-global registry.
pub struct AppState {
    pub registry: ModelRegistry,
    pub reference: ReferenceData,
    pub metrics: ApiMetrics,
}

impl AppState {
    pub fn new(registry: ModelRegistry, reference: ReferenceData, metrics: ApiMetrics) -> Self {
        Self {
            registry,
            reference,
            metrics,
        }
    }
}

/// Error wrapper mapping resolver failures onto HTTP statuses with a
/// `{"detail": ...}` body.
struct ApiError(ResolveError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ResolveError::ModelNotFound(_) | ResolveError::NoModels => StatusCode::NOT_FOUND,
            ResolveError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

/// Service metadata and endpoint listing
async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "House Price Prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/", "/models", "/features", "/insights",
            "/predict", "/health", "/metrics",
        ],
    }))
}

#[derive(Serialize)]
struct ModelSummary<'a> {
    metrics: &'a ModelMetrics,
    features: &'a [String],
}

/// List all available models and their performance metrics
async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models: std::collections::BTreeMap<_, _> = state
        .registry
        .iter()
        .map(|entry| {
            (
                entry.name.as_str(),
                ModelSummary {
                    metrics: &entry.metrics,
                    features: &entry.features,
                },
            )
        })
        .collect();

    Json(models).into_response()
}

/// Feature defaults and best-model importance report
async fn features(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(feature_report(&state.registry, &state.reference))
}

/// Dataset and model insights
async fn insights(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(insights_report(&state.registry, &state.reference))
}

/// Make a house price prediction
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    let start = Instant::now();

    match resolve(&request, &state.registry, &state.reference.defaults) {
        Ok(result) => {
            let latency = start.elapsed().as_secs_f64();
            state.metrics.record_prediction(latency);
            info!(
                event = "prediction_served",
                model = %result.model_used,
                missing_features = result.missing_features.len(),
                latency_secs = latency,
                "Served prediction"
            );
            Ok(Json(result))
        }
        Err(err) => {
            state.metrics.inc_prediction_errors();
            Err(ApiError(err))
        }
    }
}

/// Liveness and load status
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "models_loaded": state.registry.len(),
        "has_reference_data": state.reference.is_loaded(),
    }))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Count every request against its matched route
async fn track_requests(
    State(state): State<Arc<AppState>>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let path = matched_path
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    state.metrics.inc_request(&path);
    next.run(request).await
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/models", get(list_models))
        .route("/features", get(features))
        .route("/insights", get(insights))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
