//! API client for the House Price Prediction API

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// HTTP client for the prediction API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub metrics: serde_json::Value,
    pub features: Vec<String>,
}

/// Map of model name to its metadata, as returned by GET /models.
pub type ModelListing = BTreeMap<String, ModelInfo>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceEntry {
    pub importance: f64,
    pub rank: usize,
    pub is_top_10: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub feature_defaults: BTreeMap<String, serde_json::Value>,
    pub feature_importance: BTreeMap<String, ImportanceEntry>,
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub top_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_price: f64,
    pub model_used: String,
    pub confidence_metrics: serde_json::Value,
    pub features_used: BTreeMap<String, serde_json::Value>,
    pub missing_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: usize,
    pub has_reference_data: bool,
}

/// Pull a metric out of either nested-split or flat metrics JSON.
pub fn test_metric(metrics: &serde_json::Value, name: &str) -> Option<f64> {
    metrics
        .get("test")
        .and_then(|split| split.get(name))
        .or_else(|| metrics.get(name))
        .and_then(|v| v.as_f64())
}
