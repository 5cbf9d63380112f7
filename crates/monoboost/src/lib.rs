//! monoboost: non-crossing multi-quantile gradient boosting.
//!
//! One shared tree ensemble is trained for all requested quantile levels.
//! Every training row is repeated once per level with the level appended
//! as an extra feature, and that feature carries a `+1` monotone
//! constraint. Predictions are therefore non-decreasing in the level for
//! every input row: the quantile curves never cross.
//!
//! # Key Types
//!
//! - [`MQRegressor`] - train once, predict a `(K, N)` quantile matrix
//! - [`RegressorConfig`] - loss (check or huber) and backend selection
//! - [`Params`] - backend training parameters
//! - [`MqError`] - validation, configuration, readiness, and engine errors
//!
//! # Layout
//!
//! - [`data`]: quantile validation and row stacking
//! - [`training`]: objectives, constraint vector, metrics
//! - [`model`]: backends, prediction reshaping, the regressor
//! - [`engine`]: the gradient-boosted tree engine the backends drive
//!
//! # Logging
//!
//! Only the engine reports progress, through `tracing`, gated by the
//! backend's `verbosity` parameter. Install any subscriber to see it.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod engine;
pub mod error;
pub mod model;
pub mod params;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use model::{BackendKind, FitState, MQRegressor, RegressorConfig, TrainedModel};

pub use error::{ConfigurationError, MqError, Result, ValidationError};

pub use params::Params;

pub use data::{validate_alphas, validate_delta, AlphaLike, QuantileSet, QUANTILE_FEATURE};

pub use training::{Loss, LossKind};

pub use utils::{run_with_threads, Parallelism};
