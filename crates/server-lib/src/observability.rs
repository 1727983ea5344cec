//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus counters for requests and predictions
//! - Prediction latency histogram
//! - Structured logging via tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ApiMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ApiMetricsInner {
    http_requests_total: IntCounter,
    http_requests_by_path: IntCounterVec,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    prediction_latency_seconds: Histogram,
    last_prediction_timestamp: IntGauge,
    models_loaded: IntGauge,
}

impl ApiMetricsInner {
    fn new() -> Self {
        Self {
            http_requests_total: register_int_counter!(
                "price_api_http_requests_total",
                "Total number of HTTP requests served"
            )
            .expect("Failed to register http_requests_total"),

            http_requests_by_path: register_int_counter_vec!(
                "price_api_http_requests_by_path",
                "HTTP requests served, per matched route",
                &["path"]
            )
            .expect("Failed to register http_requests_by_path"),

            predictions_total: register_int_counter!(
                "price_api_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "price_api_prediction_errors_total",
                "Total number of failed prediction requests"
            )
            .expect("Failed to register prediction_errors_total"),

            prediction_latency_seconds: register_histogram!(
                "price_api_prediction_latency_seconds",
                "Time spent resolving and running a prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            last_prediction_timestamp: register_int_gauge!(
                "price_api_last_prediction_timestamp",
                "Unix timestamp of the most recent successful prediction"
            )
            .expect("Failed to register last_prediction_timestamp"),

            models_loaded: register_int_gauge!(
                "price_api_models_loaded",
                "Number of models loaded into the registry at startup"
            )
            .expect("Failed to register models_loaded"),
        }
    }
}

/// Metrics handle for the prediction API.
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics. Counters are
/// diagnostic, not correctness-critical; prometheus primitives give
/// at-least-approximately-consistent updates under concurrency.
#[derive(Clone)]
pub struct ApiMetrics {
    // This is just a marker - we use the global instance
    _private: (),
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ApiMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ApiMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Count one served request against the matched route.
    pub fn inc_request(&self, path: &str) {
        self.inner().http_requests_total.inc();
        self.inner()
            .http_requests_by_path
            .with_label_values(&[path])
            .inc();
    }

    /// Record a successful prediction and stamp its completion time.
    pub fn record_prediction(&self, latency_secs: f64) {
        self.inner().predictions_total.inc();
        self.inner()
            .prediction_latency_seconds
            .observe(latency_secs);
        self.inner()
            .last_prediction_timestamp
            .set(chrono::Utc::now().timestamp());
    }

    /// Count a failed prediction request.
    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    /// Record how many models the registry loaded.
    pub fn set_models_loaded(&self, count: i64) {
        self.inner().models_loaded.set(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_metrics_creation() {
        // Note: metrics live in the process-global Prometheus registry,
        // so this only checks that the handle records without panicking.
        let metrics = ApiMetrics::new();

        metrics.inc_request("/predict");
        metrics.inc_request("/models");
        metrics.record_prediction(0.002);
        metrics.inc_prediction_errors();
        metrics.set_models_loaded(2);
    }
}
