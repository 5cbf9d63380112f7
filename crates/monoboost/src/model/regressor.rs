//! Non-crossing multi-quantile regressor.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::assemble::reshape;
use super::backend::{Backend, TrainedModel, TrainingBackend};
use super::config::RegressorConfig;
use crate::data::{prepare_predict, prepare_train, validate_alphas, AlphaLike, QuantileSet};
use crate::error::{MqError, Result, ValidationError};
use crate::params::Params;
use crate::training::{
    pinball_loss_per_alpha, prepare_params, Loss, QuantileMetric, QuantileObjective,
};

/// Training lifecycle of a regressor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FitState {
    #[default]
    Unfit,
    Fitting,
    Fitted(TrainedModel),
}

/// Trains one shared model over all quantile levels and predicts a
/// `(K, N)` matrix whose rows never cross.
///
/// ```
/// use monoboost::{MQRegressor, Params, RegressorConfig};
/// use ndarray::{Array1, Array2};
///
/// let x = Array2::from_shape_fn((200, 1), |(i, _)| i as f32 / 200.0);
/// let y = Array1::from_shape_fn(200, |i| (i % 7) as f32 / 7.0 + i as f32 / 200.0);
///
/// let mut model = MQRegressor::new(x.clone(), y, [0.1f32, 0.5, 0.9], RegressorConfig::default())?;
/// model.train(&Params::new().with("num_iterations", 20).with("verbosity", -1))?;
///
/// let preds = model.predict(x.view(), [0.1f32, 0.5, 0.9])?;
/// assert_eq!(preds.dim(), (3, 200));
/// for j in 0..200 {
///     assert!(preds[[0, j]] <= preds[[1, j]] && preds[[1, j]] <= preds[[2, j]]);
/// }
/// # Ok::<(), monoboost::MqError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MQRegressor {
    x: Array2<f32>,
    y: Array1<f32>,
    alphas: QuantileSet,
    config: RegressorConfig,
    loss: Loss,
    backend: Backend,
    state: FitState,
}

impl MQRegressor {
    /// Validate inputs and configuration. Nothing is trained yet.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for malformed `alphas`, an invalid huber
    /// `delta`, or `x`/`y` of mismatched or empty shape.
    pub fn new(
        x: Array2<f32>,
        y: Array1<f32>,
        alphas: impl Into<AlphaLike>,
        config: RegressorConfig,
    ) -> Result<Self> {
        let alphas = validate_alphas(alphas)?;
        let loss = config.bound_loss()?;
        if x.nrows() != y.len() {
            return Err(ValidationError::LabelLengthMismatch {
                x_rows: x.nrows(),
                y_len: y.len(),
            }
            .into());
        }
        if x.nrows() == 0 {
            return Err(ValidationError::EmptyInput.into());
        }

        Ok(Self {
            x,
            y,
            alphas,
            backend: Backend::from_kind(config.backend),
            config,
            loss,
            state: FitState::Unfit,
        })
    }

    /// Training quantile levels, ascending.
    pub fn alphas(&self) -> &QuantileSet {
        &self.alphas
    }

    pub fn config(&self) -> &RegressorConfig {
        &self.config
    }

    /// Number of original feature columns.
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn state(&self) -> &FitState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, FitState::Fitted(_))
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        match &self.state {
            FitState::Fitted(model) => Some(model),
            _ => None,
        }
    }

    /// Train on the stacked data with the backend parameters in `params`.
    ///
    /// A `monotone_constraints` entry covers the original columns only;
    /// the quantile-identifier constraint is appended. A failed run leaves
    /// the regressor unfit, discarding any previous model.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError`](crate::ConfigurationError) for an
    ///   `objective` key or malformed constraints
    /// - [`MqError::Engine`] for anything the engine rejects
    pub fn train(&mut self, params: &Params) -> Result<&TrainedModel> {
        self.state = FitState::Fitting;
        match self.fit(params) {
            Ok(model) => self.state = FitState::Fitted(model),
            Err(err) => {
                self.state = FitState::Unfit;
                return Err(err);
            }
        }
        self.model().ok_or(MqError::TrainingNotReady)
    }

    fn fit(&self, params: &Params) -> Result<TrainedModel> {
        let n_rows = self.x.nrows();
        let (features, labels) = prepare_train(self.x.view(), self.y.view(), &self.alphas)?;
        let (mut params, constraints) = prepare_params(params, features.ncols())?;
        self.backend.encode_constraints(&mut params, &constraints);

        let dataset = self.backend.make_dataset(features, labels)?;
        let objective = QuantileObjective::new(&self.alphas, n_rows, self.loss);
        let metric = QuantileMetric::new(&self.alphas, n_rows);
        Ok(self
            .backend
            .train(&dataset, &params, &objective, Some(&metric))?)
    }

    /// Predict every row of `x` at each level in `alphas`.
    ///
    /// `alphas` need not match the training levels. Row `k` of the result
    /// belongs to the `k`-th level in ascending order.
    ///
    /// # Errors
    ///
    /// - [`MqError::TrainingNotReady`] before a successful [`train`](Self::train)
    /// - [`ValidationError`] for malformed `alphas` or a wrong column count
    pub fn predict(
        &self,
        x: ArrayView2<'_, f32>,
        alphas: impl Into<AlphaLike>,
    ) -> Result<Array2<f32>> {
        let model = self.model().ok_or(MqError::TrainingNotReady)?;
        let alphas = validate_alphas(alphas)?;
        if x.ncols() != self.n_features() {
            return Err(ValidationError::FeatureCountMismatch {
                expected: self.n_features(),
                got: x.ncols(),
            }
            .into());
        }

        let stacked = prepare_predict(x, &alphas);
        let flat = self.backend.predict(model, stacked.view())?;
        Ok(reshape(flat, alphas.len(), x.nrows())?)
    }

    /// Mean pinball loss per training level on `(x, y)`.
    pub fn score(&self, x: ArrayView2<'_, f32>, y: ArrayView1<'_, f32>) -> Result<Array1<f64>> {
        if x.nrows() != y.len() {
            return Err(ValidationError::LabelLengthMismatch {
                x_rows: x.nrows(),
                y_len: y.len(),
            }
            .into());
        }
        let preds = self.predict(x, &self.alphas)?;
        Ok(pinball_loss_per_alpha(preds.view(), y, &self.alphas)?)
    }
}
