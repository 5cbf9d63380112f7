//! Regressor configuration with builder pattern.
//!
//! # Example
//!
//! ```
//! use monoboost::model::{BackendKind, RegressorConfig};
//! use monoboost::training::LossKind;
//!
//! // Check loss on the leaf-wise backend
//! let config = RegressorConfig::builder().build().unwrap();
//! assert_eq!(config.loss, LossKind::Check);
//!
//! let config = RegressorConfig::builder()
//!     .loss(LossKind::Huber)
//!     .delta(0.02)
//!     .backend(BackendKind::DepthWise)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.delta, 0.02);
//! ```

use bon::Builder;

use super::backend::BackendKind;
use crate::data::DEFAULT_DELTA;
use crate::error::ValidationError;
use crate::training::{Loss, LossKind};

/// Loss and backend selection for [`MQRegressor`](crate::MQRegressor).
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct RegressorConfig {
    /// Training loss. Default: check.
    #[builder(default)]
    pub loss: LossKind,

    /// Training backend. Default: leaf-wise.
    #[builder(default)]
    pub backend: BackendKind,

    /// Huber smoothing width, ignored for the check loss. Default: 0.05.
    #[builder(default = DEFAULT_DELTA)]
    pub delta: f32,
}

impl<S: regressor_config_builder::IsComplete> RegressorConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidDelta`] if the huber loss is selected and
    /// `delta` is outside `(0, 0.1)`.
    pub fn build(self) -> Result<RegressorConfig, ValidationError> {
        let config = self.__build_internal();
        config.bound_loss()?;
        Ok(config)
    }
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            loss: LossKind::default(),
            backend: BackendKind::default(),
            delta: DEFAULT_DELTA,
        }
    }
}

impl RegressorConfig {
    /// Configuration from loss and backend names (`"check"`/`"huber"`,
    /// `"lightgbm"`/`"xgboost"`) with the default delta.
    pub fn from_names(objective: &str, model: &str) -> Result<Self, ValidationError> {
        Self::builder()
            .loss(objective.parse()?)
            .backend(model.parse()?)
            .build()
    }

    /// The loss with `delta` bound.
    pub fn bound_loss(&self) -> Result<Loss, ValidationError> {
        Loss::new(self.loss, self.delta)
    }
}
