//! Flat stacked predictions back to one row per quantile level.

use ndarray::{Array1, Array2};

use crate::error::ValidationError;

/// Reshape a block-ordered vector of `n_alphas · n_rows` predictions into
/// a `(n_alphas, n_rows)` matrix. Row `k` is block `k`, row order within a
/// block is preserved. Values are not touched.
///
/// # Errors
///
/// [`ValidationError::PredictionLengthMismatch`] if the length is not
/// `n_alphas · n_rows`.
pub fn reshape(
    flat: Array1<f32>,
    n_alphas: usize,
    n_rows: usize,
) -> Result<Array2<f32>, ValidationError> {
    let mismatch = |got: usize| ValidationError::PredictionLengthMismatch {
        expected: n_alphas * n_rows,
        got,
        n_alphas,
        n_rows,
    };
    let got = flat.len();
    if got != n_alphas * n_rows {
        return Err(mismatch(got));
    }
    flat.into_shape_with_order((n_alphas, n_rows))
        .map_err(|_| mismatch(got))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn splits_into_contiguous_blocks() {
        let flat = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let matrix = reshape(flat, 3, 2).unwrap();
        assert_eq!(matrix, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    }

    #[test]
    fn empty_rows_give_empty_columns() {
        let matrix = reshape(Array1::zeros(0), 3, 0).unwrap();
        assert_eq!(matrix.dim(), (3, 0));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = reshape(Array1::zeros(5), 2, 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PredictionLengthMismatch {
                expected: 6,
                got: 5,
                n_alphas: 2,
                n_rows: 3
            }
        );
    }
}
