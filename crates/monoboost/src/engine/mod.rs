//! Gradient-boosted regression trees with custom objectives.
//!
//! A compact exact-greedy booster: every boundary between two distinct
//! feature values is a split candidate, leaves are Newton steps with L1/L2
//! regularization, and per-feature monotone constraints are enforced
//! exactly through node bounds (see [`constraints`]).
//!
//! The loss is never built in. Callers implement [`CustomObjective`] and
//! the [`Trainer`] asks it for gradients once per round.
//!
//! # Example
//!
//! ```
//! use monoboost::engine::{BoosterParams, CustomObjective, Dataset, GradsTuple, ParamStyle, Trainer};
//! use monoboost::Params;
//! use ndarray::{array, Array1};
//!
//! struct Squared;
//!
//! impl CustomObjective for Squared {
//!     fn gradients_into(&self, preds: &[f32], labels: &[f32], out: &mut [GradsTuple]) {
//!         for ((gh, p), y) in out.iter_mut().zip(preds).zip(labels) {
//!             *gh = GradsTuple { grad: p - y, hess: 1.0 };
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "squared"
//!     }
//! }
//!
//! let ds = Dataset::new(array![[0.0], [1.0], [2.0], [3.0]], Array1::from(vec![0.0, 0.0, 1.0, 1.0]))?;
//! let params = BoosterParams::from_params(&Params::new(), ParamStyle::DepthWise)?;
//! let forest = Trainer::new(&Squared, None, params).train(&ds)?;
//! assert_eq!(forest.n_trees(), 10);
//! # Ok::<(), monoboost::engine::EngineError>(())
//! ```

pub mod constraints;
pub mod dataset;
pub mod grower;
pub mod logger;
pub mod params;
pub mod split;
pub mod trainer;
pub mod tree;

pub use constraints::{MonotonicBounds, MonotonicConstraint};
pub use dataset::Dataset;
pub use grower::{GrowerParams, GrowthStrategy, TreeGrower};
pub use logger::{TrainingLogger, Verbosity};
pub use params::{parse_constraints, BoosterParams, ParamStyle, MONOTONE_CONSTRAINTS};
pub use split::GainParams;
pub use trainer::Trainer;
pub use tree::{Forest, NodeId, Tree};

/// Gradient and hessian of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

/// Errors raised by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("dataset must contain at least one row")]
    EmptyDataset,

    #[error("dataset has {n_rows} rows but {n_labels} labels")]
    LabelMismatch { n_rows: usize, n_labels: usize },

    #[error("feature {feature} of row {row} is not finite")]
    NonFiniteFeature { row: usize, feature: usize },

    #[error("label of row {row} is not finite")]
    NonFiniteLabel { row: usize },

    #[error("input has {got} features, model expects {expected}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("invalid value for parameter {key:?}: {reason}")]
    InvalidParam { key: String, reason: String },

    #[error("{got} monotone constraints given for {expected} features")]
    ConstraintLength { expected: usize, got: usize },

    #[error("objective returned a non-finite gradient or hessian for row {row} in round {round}")]
    NonFiniteGradient { round: usize, row: usize },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-row gradients for the current predictions.
///
/// `predictions`, `labels`, and `grad_hess` have one entry per training row
/// in dataset order.
pub trait CustomObjective: Send + Sync {
    fn gradients_into(&self, predictions: &[f32], labels: &[f32], grad_hess: &mut [GradsTuple]);

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Evaluation metric reported after every round. Lower is better.
pub trait CustomMetric: Send + Sync {
    fn evaluate(&self, predictions: &[f32], labels: &[f32]) -> f64;

    fn name(&self) -> &'static str;
}

/// Train a forest in one call. Shorthand for [`Trainer::new`] followed by
/// [`Trainer::train`].
pub fn train(
    dataset: &Dataset,
    params: &BoosterParams,
    objective: &dyn CustomObjective,
    metric: Option<&dyn CustomMetric>,
) -> Result<Forest, EngineError> {
    Trainer::new(objective, metric, params.clone()).train(dataset)
}
