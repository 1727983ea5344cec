//! Report shaping for the features and insights endpoints

use crate::dataset::{Histogram, ReferenceData};
use crate::models::FeatureValue;
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many features count as "top" in the importance report.
const TOP_FEATURES: usize = 10;

/// Per-feature importance entry, ranked 1..N descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceEntry {
    pub importance: f64,
    pub rank: usize,
    pub is_top_10: bool,
}

/// Body of the features endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub feature_defaults: BTreeMap<String, FeatureValue>,
    /// Empty when the best model does not expose importances.
    pub feature_importance: BTreeMap<String, ImportanceEntry>,
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
    /// The highest-importance feature names, best first.
    pub top_features: Vec<String>,
}

/// Body of the insights endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub feature_counts: FeatureCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saleprice_histogram: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_model_r2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCounts {
    pub numerical: usize,
    pub categorical: usize,
}

/// Rank the best model's importances, when that model has any.
fn ranked_importances(registry: &ModelRegistry) -> Vec<(String, f64)> {
    let Ok(best) = registry.best_by_test_mae() else {
        return Vec::new();
    };
    let Some(importances) = best.estimator.feature_importances() else {
        return Vec::new();
    };

    let mut ranked: Vec<(String, f64)> = best
        .features
        .iter()
        .cloned()
        .zip(importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Build the features endpoint body.
pub fn feature_report(registry: &ModelRegistry, reference: &ReferenceData) -> FeatureReport {
    let ranked = ranked_importances(registry);

    let feature_importance = ranked
        .iter()
        .enumerate()
        .map(|(idx, (name, importance))| {
            (
                name.clone(),
                ImportanceEntry {
                    importance: *importance,
                    rank: idx + 1,
                    is_top_10: idx < TOP_FEATURES,
                },
            )
        })
        .collect();

    let top_features = ranked
        .iter()
        .take(TOP_FEATURES)
        .map(|(name, _)| name.clone())
        .collect();

    FeatureReport {
        feature_defaults: reference.defaults.clone(),
        feature_importance,
        numerical_features: reference.numerical_features.clone(),
        categorical_features: reference.categorical_features.clone(),
        top_features,
    }
}

/// Build the insights endpoint body.
pub fn insights_report(registry: &ModelRegistry, reference: &ReferenceData) -> InsightsReport {
    let best = registry.best_by_test_mae().ok();

    InsightsReport {
        feature_counts: FeatureCounts {
            numerical: reference.numerical_features.len(),
            categorical: reference.categorical_features.len(),
        },
        saleprice_histogram: reference.target_histogram.clone(),
        best_model: best.map(|entry| entry.name.clone()),
        best_model_r2: best.and_then(|entry| entry.metrics.test_r2()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimatorError;
    use crate::models::{MetricSet, ModelMetrics};
    use crate::predictor::Estimator;
    use crate::registry::ModelEntry;

    struct ConstEstimator {
        importances: Option<Vec<f64>>,
    }

    impl Estimator for ConstEstimator {
        fn predict(&self, _row: &[FeatureValue]) -> Result<f64, EstimatorError> {
            Ok(0.0)
        }

        fn feature_importances(&self) -> Option<&[f64]> {
            self.importances.as_deref()
        }
    }

    fn metrics(mae: f64) -> ModelMetrics {
        ModelMetrics::Flat(MetricSet {
            mae,
            rmse: mae,
            r2: 0.9,
        })
    }

    fn registry(importances: Option<Vec<f64>>, features: Vec<&str>) -> ModelRegistry {
        ModelRegistry::from_entries(vec![ModelEntry {
            name: "random_forest".to_string(),
            estimator: Box::new(ConstEstimator { importances }),
            features: features.into_iter().map(String::from).collect(),
            metrics: metrics(1000.0),
        }])
    }

    #[test]
    fn importances_are_ranked_descending() {
        let registry = registry(
            Some(vec![0.1, 0.6, 0.3]),
            vec!["LotArea", "GrLivArea", "YearBuilt"],
        );
        let report = feature_report(&registry, &ReferenceData::empty());

        let grliv = &report.feature_importance["GrLivArea"];
        assert_eq!(grliv.rank, 1);
        assert!(grliv.is_top_10);
        assert_eq!(report.feature_importance["YearBuilt"].rank, 2);
        assert_eq!(report.feature_importance["LotArea"].rank, 3);
        assert_eq!(
            report.top_features,
            vec!["GrLivArea", "YearBuilt", "LotArea"]
        );
    }

    #[test]
    fn only_ten_features_count_as_top() {
        let names: Vec<String> = (0..12).map(|i| format!("F{i:02}")).collect();
        let importances: Vec<f64> = (0..12).map(|i| 1.0 - i as f64 * 0.05).collect();
        let registry = registry(
            Some(importances),
            names.iter().map(String::as_str).collect(),
        );

        let report = feature_report(&registry, &ReferenceData::empty());
        assert_eq!(report.top_features.len(), 10);
        assert!(report.feature_importance["F09"].is_top_10);
        assert!(!report.feature_importance["F10"].is_top_10);
        assert_eq!(report.feature_importance["F11"].rank, 12);
    }

    #[test]
    fn no_capability_means_empty_report() {
        let registry = registry(None, vec!["LotArea"]);
        let report = feature_report(&registry, &ReferenceData::empty());

        assert!(report.feature_importance.is_empty());
        assert!(report.top_features.is_empty());
    }

    #[test]
    fn insights_without_models_or_data() {
        let report = insights_report(&ModelRegistry::default(), &ReferenceData::empty());

        assert_eq!(report.feature_counts.numerical, 0);
        assert!(report.saleprice_histogram.is_none());
        assert!(report.best_model.is_none());
        assert!(report.best_model_r2.is_none());

        // Optional fields are dropped from the serialized body entirely.
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("best_model").is_none());
        assert!(json.get("saleprice_histogram").is_none());
    }

    #[test]
    fn insights_report_names_the_best_model() {
        let registry = registry(None, vec!["LotArea"]);
        let report = insights_report(&registry, &ReferenceData::empty());

        assert_eq!(report.best_model.as_deref(), Some("random_forest"));
        assert_eq!(report.best_model_r2, Some(0.9));
    }
}
