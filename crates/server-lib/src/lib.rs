//! Library for the house price prediction service
//!
//! This crate provides the core functionality for:
//! - Model registry loading and lookup
//! - Reference dataset statistics (feature defaults, histogram)
//! - Prediction request resolution
//! - Feature importance and insights reports
//! - Prometheus metrics

pub mod dataset;
pub mod error;
pub mod insights;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;

pub use dataset::{Histogram, ReferenceData};
pub use error::{EstimatorError, ResolveError};
pub use models::*;
pub use observability::ApiMetrics;
pub use predictor::{resolve, Estimator, OnnxEstimator};
pub use registry::{ModelEntry, ModelMetadata, ModelRegistry};
