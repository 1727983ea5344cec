//! Prediction request resolution
//!
//! Pure request/response transform: pick a model, reconcile the caller's
//! partial feature mapping against its schema, run inference, shape the
//! result. No state is retained across calls.

use crate::error::{EstimatorError, ResolveError};
use crate::models::{FeatureValue, PredictionRequest, PredictionResult};
use crate::registry::{ModelEntry, ModelRegistry};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Resolve a prediction request against the registry and default table.
///
/// Feature reconciliation walks the selected model's schema in order:
/// caller value verbatim, else default-table value, else numeric zero.
/// Zero is deliberate for both unresolvable numeric columns and
/// dummy-encoded categoricals, whose natural "absent" encoding is 0.
/// Extra caller keys outside the schema are ignored.
pub fn resolve(
    request: &PredictionRequest,
    registry: &ModelRegistry,
    defaults: &BTreeMap<String, FeatureValue>,
) -> Result<PredictionResult, ResolveError> {
    let entry = match &request.model_name {
        Some(name) => registry
            .get(name)
            .ok_or_else(|| ResolveError::ModelNotFound(name.clone()))?,
        None => registry.best_by_test_mae()?,
    };

    // Insertion-ordered so the reported mapping follows the schema, not
    // lexicographic key order.
    let mut features_used = IndexMap::with_capacity(entry.features.len());
    let mut row = Vec::with_capacity(entry.features.len());
    let mut missing_features = Vec::new();

    for feature in &entry.features {
        let value = match request.features.get(feature) {
            Some(value) => value.clone(),
            None => {
                missing_features.push(feature.clone());
                defaults
                    .get(feature)
                    .cloned()
                    .unwrap_or(FeatureValue::Number(0.0))
            }
        };
        features_used.insert(feature.clone(), value.clone());
        row.push(value);
    }

    let predicted_price = entry
        .estimator
        .predict(&row)
        .map_err(|err| prediction_error(entry, err))?;

    debug!(
        model = %entry.name,
        missing = missing_features.len(),
        "Resolved prediction"
    );

    Ok(PredictionResult {
        predicted_price,
        model_used: entry.name.clone(),
        confidence_metrics: entry.metrics.clone(),
        features_used,
        missing_features,
    })
}

/// Convert an estimator failure into a prediction error, resolving
/// positional references back to schema feature names.
fn prediction_error(entry: &ModelEntry, err: EstimatorError) -> ResolveError {
    let message = match &err {
        EstimatorError::NonNumericFeature { index, value } => match entry.features.get(*index) {
            Some(name) => format!("feature '{}' has non-numeric value '{}'", name, value),
            None => err.to_string(),
        },
        _ => err.to_string(),
    };
    ResolveError::Prediction(message)
}
