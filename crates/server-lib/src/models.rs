//! Core data models for the prediction service

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single feature value as supplied by a caller or a default table.
///
/// Numeric JSON values (integers included) deserialize as `Number`;
/// everything string-valued deserializes as `Text`. Estimators decide
/// for themselves whether they accept text input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(n: f64) -> Self {
        FeatureValue::Number(n)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

/// Regression quality metrics for one evaluation split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Evaluation metrics as recorded in a model's metadata file.
///
/// Metadata written by newer training runs nests one `MetricSet` per split
/// (`train`, `test`, ...); older files carry a single flat set. Both shapes
/// are accepted and echoed back unfiltered in prediction responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelMetrics {
    PerSplit(BTreeMap<String, MetricSet>),
    Flat(MetricSet),
}

impl ModelMetrics {
    /// MAE used for model ranking: the `test` split when present,
    /// otherwise the flat top-level value.
    pub fn test_mae(&self) -> Option<f64> {
        match self {
            ModelMetrics::PerSplit(splits) => splits.get("test").map(|s| s.mae),
            ModelMetrics::Flat(set) => Some(set.mae),
        }
    }

    /// R² on the same split preference as [`test_mae`](Self::test_mae).
    pub fn test_r2(&self) -> Option<f64> {
        match self {
            ModelMetrics::PerSplit(splits) => splits.get("test").map(|s| s.r2),
            ModelMetrics::Flat(set) => Some(set.r2),
        }
    }
}

/// Inbound prediction request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Partial feature mapping; may be a subset of (or disjoint from)
    /// the selected model's schema.
    pub features: BTreeMap<String, FeatureValue>,
    /// Explicit model selector. When absent the best model by test MAE
    /// is used.
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Outbound prediction response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    /// Name of the model that actually produced the estimate, whether it
    /// was requested explicitly or auto-selected.
    pub model_used: String,
    pub confidence_metrics: ModelMetrics,
    /// The fully reconciled feature mapping, exactly the selected model's
    /// schema in its declared order, with caller values, defaults, or the
    /// numeric fallback zero. Insertion-ordered so the serialized body
    /// preserves schema order.
    pub features_used: IndexMap<String, FeatureValue>,
    /// Schema features the caller did not supply, in schema order.
    pub missing_features: Vec<String>,
}
