//! Synthetic data shared by integration tests.

#![allow(dead_code)]

use monoboost::Params;
use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `y = x0 + 0.5·u` with `x0, x1 ~ U(-1, 1)` and `u ~ U(-1, 1)`.
///
/// The `alpha` quantile of `y` given `x` is `x0 + (alpha - 0.5)`; `x1` is
/// noise the model should learn to ignore.
pub fn linear_with_noise(n_rows: usize, seed: u64) -> (Array2<f32>, Array1<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n_rows, 2), |_| rng.random::<f32>() * 2.0 - 1.0);
    let y = Array1::from_shape_fn(n_rows, |i| {
        let u = rng.random::<f32>() * 2.0 - 1.0;
        x[[i, 0]] + 0.5 * u
    });
    (x, y)
}

/// Enough rounds for the low quantiles to reach the data.
pub fn leaf_wise_params() -> Params {
    Params::new()
        .with("num_iterations", 150)
        .with("learning_rate", 0.3)
        .with("num_leaves", 15)
        .with("min_data_in_leaf", 5)
        .with("verbosity", -1)
}

pub fn depth_wise_params() -> Params {
    Params::new()
        .with("num_boost_round", 150)
        .with("eta", 0.3)
        .with("max_depth", 4)
        .with("verbosity", 0)
}

/// Fraction of columns `j` with `preds[k, j] <= preds[k + 1, j]` for all `k`.
pub fn ordered_fraction(preds: ArrayView2<'_, f32>) -> f64 {
    let n_cols = preds.ncols();
    if n_cols == 0 {
        return 1.0;
    }
    let ordered = (0..n_cols)
        .filter(|&j| {
            let column = preds.column(j);
            column.windows(2).into_iter().all(|w| w[0] <= w[1])
        })
        .count();
    ordered as f64 / n_cols as f64
}

/// Fraction of `y` at or below the prediction.
pub fn coverage(preds: &[f32], y: &[f32]) -> f64 {
    let below = preds.iter().zip(y).filter(|(p, t)| t <= p).count();
    below as f64 / y.len() as f64
}
