//! Error taxonomy for prediction resolution

use thiserror::Error;

/// Failures inside an estimator's predict call.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// A schema feature resolved to a value the estimator cannot consume.
    /// Estimators see positions only; the resolver maps the index back to
    /// the schema feature name before surfacing the error.
    #[error("feature at position {index} has non-numeric value '{value}'")]
    NonNumericFeature { index: usize, value: String },

    /// The assembled row does not match the model's input shape.
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The underlying inference engine failed.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failures surfaced by the prediction resolver.
///
/// `ModelNotFound` and `NoModels` map to a 404 at the API boundary,
/// `Prediction` to a 500. Nothing here is retryable.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Model {0} not found")]
    ModelNotFound(String),

    #[error("No models loaded")]
    NoModels,

    #[error("Prediction error: {0}")]
    Prediction(String),
}
