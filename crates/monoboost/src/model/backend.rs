//! Training backends.
//!
//! Both backends drive the same engine and differ the way two external
//! boosting libraries would: parameter names and defaults, tree growth
//! policy, and how a monotone constraint vector is written into the
//! parameter mapping.
//!
//! | backend    | name         | growth     | constraint encoding |
//! |------------|--------------|------------|---------------------|
//! | leaf-wise  | `"lightgbm"` | best-first | `[0, 0, 1]`         |
//! | depth-wise | `"xgboost"`  | level      | `"(0,0,1)"`         |
//!
//! [`Backend`] is the closed set of variants; it implements
//! [`TrainingBackend`] by delegation.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView2};
use serde_json::Value;

use crate::engine::{
    self, BoosterParams, CustomMetric, CustomObjective, Dataset, EngineError, Forest, ParamStyle,
    MONOTONE_CONSTRAINTS,
};
use crate::error::ValidationError;
use crate::params::Params;
use crate::training::ConstraintVector;
use crate::utils::run_with_threads;

// =============================================================================
// BackendKind
// =============================================================================

/// Which backend trains the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Leaf-wise growth, LightGBM-style parameters.
    #[default]
    LeafWise,
    /// Depth-wise growth, XGBoost-style parameters.
    DepthWise,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeafWise => "lightgbm",
            Self::DepthWise => "xgboost",
        }
    }

    pub fn param_style(self) -> ParamStyle {
        match self {
            Self::LeafWise => ParamStyle::LeafWise,
            Self::DepthWise => ParamStyle::DepthWise,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lightgbm" => Ok(Self::LeafWise),
            "xgboost" => Ok(Self::DepthWise),
            other => Err(ValidationError::UnknownBackend(other.to_string())),
        }
    }
}

// =============================================================================
// TrainedModel
// =============================================================================

/// A trained forest and the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    forest: Forest,
    backend: BackendKind,
    n_threads: usize,
}

impl TrainedModel {
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Number of (stacked) input columns.
    pub fn n_features(&self) -> usize {
        self.forest.n_features()
    }

    /// Raw predictions, one per row of `features`.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Array1<f32>, EngineError> {
        run_with_threads(self.n_threads, |parallelism| {
            self.forest.predict(features, parallelism)
        })?
    }
}

// =============================================================================
// TrainingBackend
// =============================================================================

/// Contract every backend fulfils.
pub trait TrainingBackend {
    fn kind(&self) -> BackendKind;

    /// Wrap stacked features and labels into an engine dataset.
    fn make_dataset(
        &self,
        features: Array2<f32>,
        labels: Array1<f32>,
    ) -> Result<Dataset, EngineError> {
        Dataset::new(features, labels)
    }

    /// Write `constraints` into `params` in this backend's encoding.
    fn encode_constraints(&self, params: &mut Params, constraints: &ConstraintVector);

    /// Train with a custom objective. `params` must already carry the
    /// encoded constraints.
    fn train(
        &self,
        dataset: &Dataset,
        params: &Params,
        objective: &dyn CustomObjective,
        metric: Option<&dyn CustomMetric>,
    ) -> Result<TrainedModel, EngineError> {
        let booster = BoosterParams::from_params(params, self.kind().param_style())?;
        let n_threads = booster.n_threads;
        let forest = engine::train(dataset, &booster, objective, metric)?;
        Ok(TrainedModel {
            forest,
            backend: self.kind(),
            n_threads,
        })
    }

    /// Flat predictions, one per row of `features`.
    fn predict(
        &self,
        model: &TrainedModel,
        features: ArrayView2<'_, f32>,
    ) -> Result<Array1<f32>, EngineError> {
        model.predict(features)
    }
}

/// LightGBM-style backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafWiseBackend;

impl TrainingBackend for LeafWiseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LeafWise
    }

    /// JSON array: `[0, 0, 1]`.
    fn encode_constraints(&self, params: &mut Params, constraints: &ConstraintVector) {
        let values = constraints
            .as_slice()
            .iter()
            .map(|&c| Value::from(c))
            .collect();
        params.insert(MONOTONE_CONSTRAINTS, Value::Array(values));
    }
}

/// XGBoost-style backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthWiseBackend;

impl TrainingBackend for DepthWiseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::DepthWise
    }

    /// Tuple string: `"(0,0,1)"`.
    fn encode_constraints(&self, params: &mut Params, constraints: &ConstraintVector) {
        let joined = constraints
            .as_slice()
            .iter()
            .map(i8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.insert(MONOTONE_CONSTRAINTS, format!("({joined})"));
    }
}

// =============================================================================
// Backend
// =============================================================================

/// The backend selected at construction time.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    LeafWise(LeafWiseBackend),
    DepthWise(DepthWiseBackend),
}

impl Default for Backend {
    fn default() -> Self {
        Self::from_kind(BackendKind::default())
    }
}

impl Backend {
    pub fn from_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::LeafWise => Self::LeafWise(LeafWiseBackend),
            BackendKind::DepthWise => Self::DepthWise(DepthWiseBackend),
        }
    }

    fn inner(&self) -> &dyn TrainingBackend {
        match self {
            Self::LeafWise(b) => b,
            Self::DepthWise(b) => b,
        }
    }
}

impl TrainingBackend for Backend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn make_dataset(
        &self,
        features: Array2<f32>,
        labels: Array1<f32>,
    ) -> Result<Dataset, EngineError> {
        self.inner().make_dataset(features, labels)
    }

    fn encode_constraints(&self, params: &mut Params, constraints: &ConstraintVector) {
        self.inner().encode_constraints(params, constraints)
    }

    fn train(
        &self,
        dataset: &Dataset,
        params: &Params,
        objective: &dyn CustomObjective,
        metric: Option<&dyn CustomMetric>,
    ) -> Result<TrainedModel, EngineError> {
        self.inner().train(dataset, params, objective, metric)
    }

    fn predict(
        &self,
        model: &TrainedModel,
        features: ArrayView2<'_, f32>,
    ) -> Result<Array1<f32>, EngineError> {
        self.inner().predict(model, features)
    }
}
