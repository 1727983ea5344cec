//! Model registry: startup loading and lookup of trained estimators
//!
//! Models live on disk as `<name>.onnx` graphs paired with
//! `<name>_metadata.json` files describing the feature schema and
//! evaluation metrics. The registry is built once at startup and is
//! read-only afterwards.

use crate::error::ResolveError;
use crate::models::ModelMetrics;
use crate::predictor::{Estimator, OnnxEstimator};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Per-model metadata file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMetadata {
    /// Ordered feature schema the estimator expects.
    pub features: Vec<String>,
    pub metrics: ModelMetrics,
    /// Training-time importances, present for tree-ensemble exports.
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// One loaded model: estimator plus its metadata.
pub struct ModelEntry {
    pub name: String,
    pub estimator: Box<dyn Estimator>,
    /// Non-empty, ordered; fixed for the process lifetime.
    pub features: Vec<String>,
    pub metrics: ModelMetrics,
}

/// Registry of loaded models, keyed by name.
///
/// Backed by a `BTreeMap` so iteration (and therefore every tie-break in
/// best-model selection) is lexicographic by name.
#[derive(Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// Build a registry from pre-constructed entries. Used for tests and
    /// any caller that wants to inject estimators directly.
    pub fn from_entries(entries: Vec<ModelEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        Self { entries }
    }

    /// Scan a directory for model/metadata pairs and load every one that
    /// deserializes cleanly. Broken pairs are logged and skipped; an empty
    /// result is not an error here (prediction will fail with NoModels).
    pub fn load(dir: &Path) -> Result<Self> {
        let mut registry = Self::default();

        let listing = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read models directory {}", dir.display()))?;

        for dir_entry in listing {
            let path = match dir_entry {
                Ok(e) => e.path(),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            // Metadata-named files are never models, whatever their extension.
            if name.ends_with("_metadata") {
                continue;
            }

            match Self::load_pair(&path, &name) {
                Ok(entry) => {
                    info!(model = %name, features = entry.features.len(), "Loaded model");
                    registry.entries.insert(name, entry);
                }
                Err(e) => {
                    warn!(model = %name, error = %e, "Failed to load model, skipping");
                }
            }
        }

        if registry.is_empty() {
            warn!(dir = %dir.display(), "No models loaded");
        }

        Ok(registry)
    }

    fn load_pair(model_path: &Path, name: &str) -> Result<ModelEntry> {
        let metadata_path = model_path.with_file_name(format!("{}_metadata.json", name));

        let metadata_bytes = std::fs::read(&metadata_path).with_context(|| {
            format!("Failed to read metadata file {}", metadata_path.display())
        })?;
        let metadata: ModelMetadata =
            serde_json::from_slice(&metadata_bytes).context("Failed to parse metadata")?;

        if metadata.features.is_empty() {
            anyhow::bail!("metadata declares an empty feature schema");
        }

        let model_bytes = std::fs::read(model_path)
            .with_context(|| format!("Failed to read model file {}", model_path.display()))?;
        let estimator = OnnxEstimator::from_bytes(
            &model_bytes,
            metadata.features.len(),
            metadata.feature_importances,
        )?;

        Ok(ModelEntry {
            name: name.to_string(),
            estimator: Box::new(estimator),
            features: metadata.features,
            metrics: metadata.metrics,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.get(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    /// The entry with the lowest test-split MAE. Models whose metadata has
    /// neither a `test` split nor a flat MAE are not eligible. Ties go to
    /// the lexicographically first name.
    pub fn best_by_test_mae(&self) -> Result<&ModelEntry, ResolveError> {
        let mut best: Option<(&ModelEntry, f64)> = None;

        for entry in self.entries.values() {
            let Some(mae) = entry.metrics.test_mae() else {
                continue;
            };
            match best {
                Some((_, best_mae)) if mae >= best_mae => {}
                _ => best = Some((entry, mae)),
            }
        }

        best.map(|(entry, _)| entry).ok_or(ResolveError::NoModels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimatorError;
    use crate::models::{FeatureValue, MetricSet};

    struct ConstEstimator(f64);

    impl Estimator for ConstEstimator {
        fn predict(&self, _row: &[FeatureValue]) -> Result<f64, EstimatorError> {
            Ok(self.0)
        }
    }

    fn entry(name: &str, metrics: ModelMetrics) -> ModelEntry {
        ModelEntry {
            name: name.to_string(),
            estimator: Box::new(ConstEstimator(0.0)),
            features: vec!["LotArea".to_string()],
            metrics,
        }
    }

    fn split_metrics(test_mae: f64) -> ModelMetrics {
        let mut splits = BTreeMap::new();
        splits.insert(
            "test".to_string(),
            MetricSet {
                mae: test_mae,
                rmse: test_mae * 1.2,
                r2: 0.9,
            },
        );
        ModelMetrics::PerSplit(splits)
    }

    fn flat_metrics(mae: f64) -> ModelMetrics {
        ModelMetrics::Flat(MetricSet {
            mae,
            rmse: mae * 1.1,
            r2: 0.85,
        })
    }

    #[test]
    fn best_prefers_lowest_test_mae() {
        let registry = ModelRegistry::from_entries(vec![
            entry("random_forest", split_metrics(1000.0)),
            entry("xgboost", flat_metrics(2000.0)),
        ]);

        let best = registry.best_by_test_mae().unwrap();
        assert_eq!(best.name, "random_forest");
    }

    #[test]
    fn flat_mae_is_used_when_no_test_split() {
        let registry = ModelRegistry::from_entries(vec![
            entry("random_forest", split_metrics(3000.0)),
            entry("xgboost", flat_metrics(2000.0)),
        ]);

        let best = registry.best_by_test_mae().unwrap();
        assert_eq!(best.name, "xgboost");
    }

    #[test]
    fn tie_breaks_lexicographically() {
        let registry = ModelRegistry::from_entries(vec![
            entry("xgboost", split_metrics(1000.0)),
            entry("random_forest", split_metrics(1000.0)),
        ]);

        let best = registry.best_by_test_mae().unwrap();
        assert_eq!(best.name, "random_forest");
    }

    #[test]
    fn entries_without_usable_mae_are_skipped() {
        let mut splits = BTreeMap::new();
        splits.insert(
            "train".to_string(),
            MetricSet {
                mae: 1.0,
                rmse: 1.0,
                r2: 1.0,
            },
        );
        let registry = ModelRegistry::from_entries(vec![
            entry("broken", ModelMetrics::PerSplit(splits)),
            entry("xgboost", flat_metrics(2000.0)),
        ]);

        let best = registry.best_by_test_mae().unwrap();
        assert_eq!(best.name, "xgboost");
    }

    #[test]
    fn empty_registry_yields_no_models() {
        let registry = ModelRegistry::default();
        assert!(matches!(
            registry.best_by_test_mae(),
            Err(ResolveError::NoModels)
        ));
    }

    #[test]
    fn load_skips_broken_pairs() {
        let dir = tempfile::tempdir().unwrap();

        // Model bytes that are not a valid ONNX graph.
        std::fs::write(dir.path().join("garbage.onnx"), b"not a model").unwrap();
        std::fs::write(
            dir.path().join("garbage_metadata.json"),
            r#"{"features": ["LotArea"], "metrics": {"mae": 1.0, "rmse": 1.0, "r2": 1.0}}"#,
        )
        .unwrap();
        // Metadata with no model file should be ignored entirely.
        std::fs::write(
            dir.path().join("orphan_metadata.json"),
            r#"{"features": ["LotArea"], "metrics": {"mae": 1.0, "rmse": 1.0, "r2": 1.0}}"#,
        )
        .unwrap();

        let registry = ModelRegistry::load(dir.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn load_ignores_metadata_named_model_files() {
        let dir = tempfile::tempdir().unwrap();

        // A stray .onnx whose stem marks it as metadata must not be
        // treated as a model, even with a matching metadata file present.
        std::fs::write(dir.path().join("pricing_metadata.onnx"), b"not a model").unwrap();
        std::fs::write(
            dir.path().join("pricing_metadata_metadata.json"),
            r#"{"features": ["LotArea"], "metrics": {"mae": 1.0, "rmse": 1.0, "r2": 1.0}}"#,
        )
        .unwrap();

        let registry = ModelRegistry::load(dir.path()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get("pricing_metadata").is_none());
    }

    #[test]
    fn load_fails_on_missing_directory() {
        assert!(ModelRegistry::load(Path::new("/nonexistent/models")).is_err());
    }
}
