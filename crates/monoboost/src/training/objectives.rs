//! Quantile objectives over stacked rows.
//!
//! Residuals are `r = y - p`. Gradients are taken with respect to the
//! prediction `p`, so a positive residual (under-prediction) gives a
//! negative gradient.
//!
//! # Check loss
//!
//! - Loss: `a·r` if `r >= 0`, else `(a - 1)·r`
//! - Gradient: `-a` if `r >= 0`, else `1 - a`
//! - Hessian: `1.0`
//!
//! The true hessian is zero almost everywhere; the constant stands in for
//! curvature so the Newton step is defined.
//!
//! # Huber-smoothed check loss
//!
//! With `w = a` for `r >= 0` and `w = 1 - a` for `r < 0`:
//!
//! | region      | loss                    | gradient    | hessian |
//! |-------------|-------------------------|-------------|---------|
//! | `|r| <= δ`  | `w·r² / (2δ)`           | `-w·r / δ`  | `1 / δ` |
//! | `|r| > δ`   | `check(r) - w·δ / 2`    | `check'(r)` | `1.0`   |
//!
//! Loss and gradient are continuous at `|r| = δ`, where the gradient equals
//! the check-loss gradient exactly.

use std::fmt;
use std::str::FromStr;

use crate::data::{validate_delta, QuantileSet};
use crate::engine::{CustomObjective, GradsTuple};
use crate::error::ValidationError;

/// Which quantile loss to train with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossKind {
    /// Pinball loss.
    #[default]
    Check,
    /// Pinball loss with a quadratic band of width `delta` around zero.
    Huber,
}

impl LossKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Huber => "huber",
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check" => Ok(Self::Check),
            "huber" => Ok(Self::Huber),
            other => Err(ValidationError::UnknownObjective(other.to_string())),
        }
    }
}

/// A loss with its parameters bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loss {
    Check,
    Huber { delta: f32 },
}

impl Loss {
    /// Bind `delta` to `kind`. The width is only validated for huber.
    pub fn new(kind: LossKind, delta: f32) -> Result<Self, ValidationError> {
        match kind {
            LossKind::Check => Ok(Self::Check),
            LossKind::Huber => Ok(Self::Huber {
                delta: validate_delta(delta)?,
            }),
        }
    }

    pub fn kind(&self) -> LossKind {
        match self {
            Self::Check => LossKind::Check,
            Self::Huber { .. } => LossKind::Huber,
        }
    }

    /// Gradient and hessian at residual `r` for level `alpha`.
    #[inline]
    pub fn grad_hess(&self, r: f32, alpha: f32) -> GradsTuple {
        match *self {
            Self::Check => GradsTuple {
                grad: check_gradient(r, alpha),
                hess: 1.0,
            },
            Self::Huber { delta } if r.abs() <= delta => GradsTuple {
                grad: -side_weight(r, alpha) * r / delta,
                hess: 1.0 / delta,
            },
            Self::Huber { .. } => GradsTuple {
                grad: check_gradient(r, alpha),
                hess: 1.0,
            },
        }
    }

    /// Loss value at residual `r` for level `alpha`.
    #[inline]
    pub fn value(&self, r: f32, alpha: f32) -> f32 {
        match *self {
            Self::Check => check_loss(r, alpha),
            Self::Huber { delta } => {
                let w = side_weight(r, alpha);
                if r.abs() <= delta {
                    w * r * r / (2.0 * delta)
                } else {
                    check_loss(r, alpha) - w * delta / 2.0
                }
            }
        }
    }
}

/// Pinball loss at residual `r = y - p`.
#[inline]
pub fn check_loss(r: f32, alpha: f32) -> f32 {
    if r >= 0.0 {
        alpha * r
    } else {
        (alpha - 1.0) * r
    }
}

/// Pinball gradient with respect to the prediction: `I(r < 0) - alpha`.
#[inline]
pub fn check_gradient(r: f32, alpha: f32) -> f32 {
    if r < 0.0 {
        1.0 - alpha
    } else {
        -alpha
    }
}

#[inline]
fn side_weight(r: f32, alpha: f32) -> f32 {
    if r >= 0.0 {
        alpha
    } else {
        1.0 - alpha
    }
}

// =============================================================================
// QuantileObjective
// =============================================================================

/// Objective over `K` stacked blocks of `n_rows` rows each.
///
/// Row `i` of the stacked data is scored with `alphas[i / n_rows]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileObjective {
    alphas: Vec<f32>,
    n_rows: usize,
    loss: Loss,
}

impl QuantileObjective {
    pub fn new(alphas: &QuantileSet, n_rows: usize, loss: Loss) -> Self {
        Self {
            alphas: alphas.as_slice().to_vec(),
            n_rows,
            loss,
        }
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    /// Rows per block.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    fn check_lengths(&self, predictions: &[f32], labels: &[f32]) -> Result<(), ValidationError> {
        let expected = self.alphas.len() * self.n_rows;
        for got in [predictions.len(), labels.len()] {
            if got != expected {
                return Err(ValidationError::PredictionLengthMismatch {
                    expected,
                    got,
                    n_alphas: self.alphas.len(),
                    n_rows: self.n_rows,
                });
            }
        }
        Ok(())
    }

    /// Per-row gradients and hessians, in stacked block order.
    ///
    /// # Errors
    ///
    /// [`ValidationError::PredictionLengthMismatch`] unless both inputs
    /// have `K · n_rows` entries.
    pub fn gradients(
        &self,
        predictions: &[f32],
        labels: &[f32],
    ) -> Result<Vec<GradsTuple>, ValidationError> {
        self.check_lengths(predictions, labels)?;
        let mut grad_hess = vec![GradsTuple::default(); predictions.len()];
        self.gradients_into(predictions, labels, &mut grad_hess);
        Ok(grad_hess)
    }

    /// Per-row loss values, in stacked block order.
    pub fn losses(&self, predictions: &[f32], labels: &[f32]) -> Result<Vec<f32>, ValidationError> {
        self.check_lengths(predictions, labels)?;
        Ok(self
            .blocks(predictions, labels)
            .flat_map(|(alpha, preds, ys)| {
                preds
                    .iter()
                    .zip(ys)
                    .map(move |(&p, &y)| self.loss.value(y - p, alpha))
            })
            .collect())
    }

    /// `(alpha, predictions, labels)` for each block.
    fn blocks<'a>(
        &'a self,
        predictions: &'a [f32],
        labels: &'a [f32],
    ) -> impl Iterator<Item = (f32, &'a [f32], &'a [f32])> + 'a {
        let block = self.n_rows.max(1);
        self.alphas
            .iter()
            .zip(predictions.chunks(block).zip(labels.chunks(block)))
            .map(|(&alpha, (preds, ys))| (alpha, preds, ys))
    }
}

impl CustomObjective for QuantileObjective {
    fn gradients_into(&self, predictions: &[f32], labels: &[f32], grad_hess: &mut [GradsTuple]) {
        let block = self.n_rows.max(1);
        for ((alpha, preds, ys), out) in self
            .blocks(predictions, labels)
            .zip(grad_hess.chunks_mut(block))
        {
            for ((gh, &p), &y) in out.iter_mut().zip(preds).zip(ys) {
                *gh = self.loss.grad_hess(y - p, alpha);
            }
        }
    }

    fn name(&self) -> &'static str {
        self.loss.kind().as_str()
    }
}
