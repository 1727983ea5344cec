//! Estimator abstraction and prediction resolution

mod onnx;
mod resolver;

pub use onnx::OnnxEstimator;
pub use resolver::resolve;

use crate::error::EstimatorError;
use crate::models::FeatureValue;

/// Trait for trained regression estimators.
///
/// Implementations are opaque predictors over an ordered feature row. Any
/// type coercion (or refusal to coerce) happens inside `predict`; the
/// resolver passes caller-supplied values through verbatim.
pub trait Estimator: Send + Sync {
    /// Run single-row inference and return the scalar estimate.
    fn predict(&self, row: &[FeatureValue]) -> Result<f64, EstimatorError>;

    /// Per-feature importances, for estimators that carry them.
    ///
    /// This is an optional capability: tree ensembles exported with
    /// training-time importances report `Some`, everything else keeps the
    /// default `None`. Callers must check presence explicitly instead of
    /// assuming every model can rank its features.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}
