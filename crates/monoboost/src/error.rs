//! Error types for the quantile layer.
//!
//! Three failure families exist, each raised synchronously where the
//! violation is detected:
//!
//! - [`ValidationError`]: malformed alphas, delta, shapes, or names
//! - [`ConfigurationError`]: misuse of reserved training parameters or
//!   malformed constraint input
//! - [`MqError::TrainingNotReady`]: `predict` called before `train`
//!
//! Engine failures pass through [`MqError::Engine`] transparently, so the
//! engine's own diagnostic is what the caller sees.

use crate::engine::EngineError;

/// Invalid quantile levels, smoothing width, or input shapes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("alphas must contain at least one quantile level")]
    EmptyAlphas,

    #[error("alpha must be in the open interval (0, 1), got {0}")]
    AlphaOutOfRange(f32),

    #[error("alphas must not contain duplicates, got {0} more than once")]
    DuplicateAlpha(f32),

    #[error("delta must be in the open interval (0, 0.1), got {0}")]
    InvalidDelta(f32),

    #[error("x has {x_rows} rows but y has {y_len} labels")]
    LabelLengthMismatch { x_rows: usize, y_len: usize },

    #[error("training data must contain at least one row")]
    EmptyInput,

    #[error("x has {got} feature columns, model was trained on {expected}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("prediction vector has length {got}, expected {expected} ({n_alphas} alphas x {n_rows} rows)")]
    PredictionLengthMismatch {
        expected: usize,
        got: usize,
        n_alphas: usize,
        n_rows: usize,
    },

    #[error("unknown objective {0:?}, expected \"check\" or \"huber\"")]
    UnknownObjective(String),

    #[error("unknown model {0:?}, expected \"lightgbm\" or \"xgboost\"")]
    UnknownBackend(String),
}

/// Misuse of training parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("the parameter named {0:?} must not be included in params")]
    ReservedKey(String),

    #[error("monotone_constraints has {got} entries, expected {expected} (one per original feature)")]
    ConstraintLength { expected: usize, got: usize },

    #[error("monotone constraint must be -1, 0 or 1, got {0}")]
    InvalidConstraint(i64),

    #[error("malformed monotone_constraints: {0}")]
    MalformedConstraints(String),
}

/// Top-level error returned by [`MQRegressor`](crate::MQRegressor).
#[derive(Debug, thiserror::Error)]
pub enum MqError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("train must be executed before predict")]
    TrainingNotReady,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl MqError {
    /// True for [`MqError::TrainingNotReady`].
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::TrainingNotReady)
    }
}

pub type Result<T, E = MqError> = std::result::Result<T, E>;
