//! Row stacking across quantile levels.
//!
//! An `[N, F]` matrix and `K` levels become an `[N·K, F + 1]` matrix made
//! of `K` contiguous blocks. Block `k` is a copy of the input with the
//! extra column set to `alphas[k]`:
//!
//! ```text
//! rows 0      .. N-1    -> x | alphas[0]
//! rows N      .. 2N-1   -> x | alphas[1]
//! ...
//! rows (K-1)N .. KN-1   -> x | alphas[K-1]
//! ```
//!
//! Gradients, labels, and predictions all follow this block order, which
//! is what lets [`reshape`](crate::model::reshape) split the flat output
//! back into one row per level.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use super::QuantileSet;
use crate::error::ValidationError;

/// Name of the appended quantile-identifier column.
pub const QUANTILE_FEATURE: &str = "_tau";

/// Stack features and labels for training.
///
/// # Errors
///
/// - [`ValidationError::EmptyInput`] if `x` has no rows
/// - [`ValidationError::LabelLengthMismatch`] if `y` does not have one
///   label per row of `x`
pub fn prepare_train(
    x: ArrayView2<'_, f32>,
    y: ArrayView1<'_, f32>,
    alphas: &QuantileSet,
) -> Result<(Array2<f32>, Array1<f32>), ValidationError> {
    if x.nrows() != y.len() {
        return Err(ValidationError::LabelLengthMismatch {
            x_rows: x.nrows(),
            y_len: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(ValidationError::EmptyInput);
    }

    let labels: Array1<f32> = alphas
        .iter()
        .flat_map(|_| y.iter().copied())
        .collect();
    Ok((prepare_predict(x, alphas), labels))
}

/// Stack features for prediction. Same block order as [`prepare_train`].
pub fn prepare_predict(x: ArrayView2<'_, f32>, alphas: &QuantileSet) -> Array2<f32> {
    let (n_rows, n_features) = x.dim();
    let mut stacked = Array2::<f32>::zeros((n_rows * alphas.len(), n_features + 1));

    for (block, alpha) in alphas.iter().enumerate() {
        let mut rows = stacked.slice_mut(s![block * n_rows..(block + 1) * n_rows, ..]);
        rows.slice_mut(s![.., ..n_features]).assign(&x);
        rows.column_mut(n_features).fill(alpha);
    }
    stacked
}
