//! Input preparation: quantile validation and row stacking.

mod alphas;
mod stack;

pub use alphas::{
    validate_alphas, validate_delta, AlphaLike, QuantileSet, DEFAULT_DELTA, MAX_DELTA,
};
pub use stack::{prepare_predict, prepare_train, QUANTILE_FEATURE};
