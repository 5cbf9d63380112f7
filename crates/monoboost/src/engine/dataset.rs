//! Training dataset handle.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::EngineError;

/// Dense training data owned by the engine.
///
/// Features are kept twice: sample-major for prediction updates and
/// feature-major for split search, where each feature column is scanned
/// in sorted order.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// `[n_rows, n_features]`
    rows: Array2<f32>,
    /// `[n_features, n_rows]`
    columns: Array2<f32>,
    labels: Vec<f32>,
}

impl Dataset {
    /// Build a dataset from a `[n_rows, n_features]` matrix and labels.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EmptyDataset`] if there are no rows
    /// - [`EngineError::LabelMismatch`] if `labels.len() != n_rows`
    /// - [`EngineError::NonFiniteFeature`] / [`EngineError::NonFiniteLabel`]
    ///   for NaN or infinite inputs
    pub fn new(features: Array2<f32>, labels: Array1<f32>) -> Result<Self, EngineError> {
        let (n_rows, _) = features.dim();
        if n_rows == 0 {
            return Err(EngineError::EmptyDataset);
        }
        if labels.len() != n_rows {
            return Err(EngineError::LabelMismatch {
                n_rows,
                n_labels: labels.len(),
            });
        }
        if let Some(((row, feature), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::NonFiniteFeature { row, feature });
        }
        if let Some(row) = labels.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::NonFiniteLabel { row });
        }

        let columns = features.t().as_standard_layout().into_owned();
        let rows = features.as_standard_layout().into_owned();
        Ok(Self {
            rows,
            columns,
            labels: labels.to_vec(),
        })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.rows.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.rows.view()
    }

    /// All values of one feature, indexed by row.
    #[inline]
    pub fn feature_column(&self, feature: usize) -> ArrayView1<'_, f32> {
        self.columns.row(feature)
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn keeps_both_layouts() {
        let ds = Dataset::new(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], array![0.0, 1.0, 2.0])
            .unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.feature_column(1).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(ds.features().row(2).to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn rejects_bad_shapes() {
        let err = Dataset::new(Array2::zeros((0, 2)), Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));

        let err = Dataset::new(Array2::zeros((3, 1)), Array1::zeros(2)).unwrap_err();
        assert!(matches!(err, EngineError::LabelMismatch { n_rows: 3, n_labels: 2 }));
    }

    #[test]
    fn rejects_non_finite() {
        let err = Dataset::new(array![[1.0], [f32::NAN]], array![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, EngineError::NonFiniteFeature { row: 1, feature: 0 }));

        let err = Dataset::new(array![[1.0], [2.0]], array![0.0, f32::INFINITY]).unwrap_err();
        assert!(matches!(err, EngineError::NonFiniteLabel { row: 1 }));
    }
}
