//! ONNX estimator backed by tract
//!
//! Serialized models are ONNX graphs loaded once at startup and kept
//! optimized in memory. Inference runs on a single `[1, n]` row of f32s.

use super::Estimator;
use crate::error::EstimatorError;
use crate::models::FeatureValue;
use anyhow::{Context, Result};
use tract_onnx::prelude::*;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Estimator over a tract-loaded ONNX regression graph.
pub struct OnnxEstimator {
    model: TractModel,
    input_width: usize,
    /// Training-time feature importances from the metadata file, when the
    /// exported model was a tree ensemble. The ONNX graph itself carries
    /// none, so absence here means the capability is absent.
    importances: Option<Vec<f64>>,
}

impl OnnxEstimator {
    /// Load and optimize an ONNX model from bytes.
    pub fn from_bytes(
        model_bytes: &[u8],
        input_width: usize,
        importances: Option<Vec<f64>>,
    ) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, input_width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self {
            model,
            input_width,
            importances,
        })
    }

    /// Convert a reconciled feature row into the model's input tensor.
    fn row_to_tensor(&self, row: &[FeatureValue]) -> Result<Tensor, EstimatorError> {
        if row.len() != self.input_width {
            return Err(EstimatorError::ShapeMismatch {
                expected: self.input_width,
                actual: row.len(),
            });
        }

        let mut data = Vec::with_capacity(row.len());
        for (idx, value) in row.iter().enumerate() {
            match value.as_f64() {
                Some(n) => data.push(n as f32),
                None => {
                    return Err(EstimatorError::NonNumericFeature {
                        index: idx,
                        value: value.to_string(),
                    })
                }
            }
        }

        tract_ndarray::Array2::from_shape_vec((1, self.input_width), data)
            .map(Into::into)
            .map_err(|e| EstimatorError::Inference(e.to_string()))
    }
}

impl Estimator for OnnxEstimator {
    fn predict(&self, row: &[FeatureValue]) -> Result<f64, EstimatorError> {
        let input = self.row_to_tensor(row)?;

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| EstimatorError::Inference(e.to_string()))?;

        let output = result
            .first()
            .ok_or_else(|| EstimatorError::Inference("no output from model".to_string()))?;

        let view = output
            .to_array_view::<f32>()
            .map_err(|e| EstimatorError::Inference(e.to_string()))?;

        view.iter()
            .next()
            .map(|v| *v as f64)
            .ok_or_else(|| EstimatorError::Inference("empty output tensor".to_string()))
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}
