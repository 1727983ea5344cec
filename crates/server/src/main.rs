//! House Price Prediction API server
//!
//! Loads pre-trained regression models and reference-dataset statistics
//! once at startup, then serves predictions over HTTP.

use anyhow::Result;
use price_server::{api, config::ServerConfig};
use server_lib::{dataset::ReferenceData, observability::ApiMetrics, registry::ModelRegistry};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-server");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        models_dir = %config.models_dir.display(),
        data_path = %config.data_path.display(),
        "Server configured"
    );

    // A failed load leaves an empty registry so diagnostic endpoints stay
    // reachable; /predict then fails with a 404-equivalent.
    let registry = match ModelRegistry::load(&config.models_dir) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to load model registry");
            ModelRegistry::default()
        }
    };

    let reference = match ReferenceData::load(&config.data_path, &config.target_column) {
        Ok(reference) => reference,
        Err(e) => {
            error!(error = %e, "Failed to load reference dataset");
            ReferenceData::empty()
        }
    };

    let metrics = ApiMetrics::new();
    metrics.set_models_loaded(registry.len() as i64);

    info!(
        models_loaded = registry.len(),
        has_reference_data = reference.is_loaded(),
        "Startup state ready"
    );

    let state = Arc::new(api::AppState::new(registry, reference, metrics));
    api::serve(config.port, state).await
}
