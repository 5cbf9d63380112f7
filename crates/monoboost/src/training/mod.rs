//! Quantile training pieces handed to the engine.
//!
//! - [`objectives`]: check and huber losses over stacked rows
//! - [`constraints`]: the monotone constraint vector with `+1` on the
//!   quantile-identifier column
//! - [`metrics`]: pinball-loss evaluation

pub mod constraints;
pub mod metrics;
pub mod objectives;

pub use constraints::{
    build_constraints, check_reserved, parse_user_constraints, prepare_params, ConstraintVector,
    RESERVED_KEYS,
};
pub use metrics::{pinball_loss_per_alpha, QuantileMetric};
pub use objectives::{check_gradient, check_loss, Loss, LossKind, QuantileObjective};
