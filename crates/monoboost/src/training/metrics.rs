//! Pinball-loss evaluation.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use super::objectives::check_loss;
use crate::data::QuantileSet;
use crate::engine::CustomMetric;
use crate::error::ValidationError;

/// Mean check loss over stacked rows, reported by the engine each round.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileMetric {
    alphas: Vec<f32>,
    n_rows: usize,
}

impl QuantileMetric {
    pub fn new(alphas: &QuantileSet, n_rows: usize) -> Self {
        Self {
            alphas: alphas.as_slice().to_vec(),
            n_rows,
        }
    }
}

impl CustomMetric for QuantileMetric {
    fn evaluate(&self, predictions: &[f32], labels: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let block = self.n_rows.max(1);
        let total: f64 = self
            .alphas
            .iter()
            .zip(predictions.chunks(block).zip(labels.chunks(block)))
            .flat_map(|(&alpha, (preds, ys))| {
                preds
                    .iter()
                    .zip(ys)
                    .map(move |(&p, &y)| check_loss(y - p, alpha) as f64)
            })
            .sum();
        total / predictions.len() as f64
    }

    fn name(&self) -> &'static str {
        "quantile"
    }
}

/// Mean pinball loss of each row of a `(K, N)` prediction matrix.
///
/// # Errors
///
/// [`ValidationError::PredictionLengthMismatch`] if the matrix is not
/// `(alphas.len(), y.len())`.
pub fn pinball_loss_per_alpha(
    predictions: ArrayView2<'_, f32>,
    y: ArrayView1<'_, f32>,
    alphas: &QuantileSet,
) -> Result<Array1<f64>, ValidationError> {
    let (n_alphas, n_rows) = (alphas.len(), y.len());
    if predictions.dim() != (n_alphas, n_rows) {
        return Err(ValidationError::PredictionLengthMismatch {
            expected: n_alphas * n_rows,
            got: predictions.len(),
            n_alphas,
            n_rows,
        });
    }

    Ok(predictions
        .axis_iter(Axis(0))
        .zip(alphas.iter())
        .map(|(row, alpha)| {
            let total: f64 = row
                .iter()
                .zip(y.iter())
                .map(|(&p, &t)| check_loss(t - p, alpha) as f64)
                .sum();
            if n_rows == 0 {
                0.0
            } else {
                total / n_rows as f64
            }
        })
        .collect())
}
