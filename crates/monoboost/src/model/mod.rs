//! The regressor, its configuration, and the backends it trains with.

mod assemble;
mod backend;
mod config;
mod regressor;

pub use assemble::reshape;
pub use backend::{
    Backend, BackendKind, DepthWiseBackend, LeafWiseBackend, TrainedModel, TrainingBackend,
};
pub use config::RegressorConfig;
pub use regressor::{FitState, MQRegressor};
