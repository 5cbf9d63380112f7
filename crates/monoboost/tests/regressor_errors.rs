//! Error surface of the regressor.

mod common;

use common::{leaf_wise_params, linear_with_noise};
use monoboost::engine::EngineError;
use monoboost::{
    ConfigurationError, FitState, MQRegressor, MqError, Params, RegressorConfig, ValidationError,
};
use ndarray::{Array1, Array2};
use rstest::rstest;
use serde_json::json;

fn fitted() -> (MQRegressor, Array2<f32>) {
    let (x, y) = linear_with_noise(60, 1);
    let mut model = MQRegressor::new(x.clone(), y, [0.25f32, 0.75], RegressorConfig::default())
        .unwrap();
    model.train(&leaf_wise_params()).unwrap();
    (model, x)
}

#[test]
fn predict_before_train() {
    let (x, y) = linear_with_noise(20, 2);
    let model = MQRegressor::new(x.clone(), y, [0.1f32, 0.9], RegressorConfig::default()).unwrap();
    let err = model.predict(x.view(), [0.1f32, 0.9]).unwrap_err();
    assert!(matches!(err, MqError::TrainingNotReady));
    assert_eq!(err.to_string(), "train must be executed before predict");
}

#[rstest]
#[case::duplicates(vec![0.5, 0.5])]
#[case::zero(vec![0.0, 0.5])]
#[case::one(vec![0.5, 1.0])]
#[case::empty(vec![])]
fn invalid_training_alphas(#[case] alphas: Vec<f32>) {
    let (x, y) = linear_with_noise(10, 3);
    let err = MQRegressor::new(x, y, alphas, RegressorConfig::default()).unwrap_err();
    assert!(matches!(err, MqError::Validation(_)), "{err}");
}

#[test]
fn invalid_prediction_alphas() {
    let (model, x) = fitted();
    let err = model.predict(x.view(), [0.3f32, 0.3]).unwrap_err();
    assert!(matches!(err, MqError::Validation(ValidationError::DuplicateAlpha(_))));
}

#[test]
fn huber_delta_bounds() {
    let (x, y) = linear_with_noise(10, 4);
    let config = RegressorConfig {
        loss: monoboost::LossKind::Huber,
        delta: 0.1,
        ..RegressorConfig::default()
    };
    let err = MQRegressor::new(x, y, 0.5f32, config).unwrap_err();
    assert!(matches!(err, MqError::Validation(ValidationError::InvalidDelta(_))));
}

#[test]
fn shape_errors() {
    let err = MQRegressor::new(
        Array2::zeros((4, 2)),
        Array1::zeros(3),
        0.5f32,
        RegressorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MqError::Validation(ValidationError::LabelLengthMismatch { x_rows: 4, y_len: 3 })
    ));

    let err = MQRegressor::new(
        Array2::zeros((0, 2)),
        Array1::zeros(0),
        0.5f32,
        RegressorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MqError::Validation(ValidationError::EmptyInput)));
}

#[test]
fn objective_override_is_rejected() {
    let (x, y) = linear_with_noise(30, 5);
    let mut model = MQRegressor::new(x, y, [0.1f32, 0.9], RegressorConfig::default()).unwrap();
    let params = leaf_wise_params().with("objective", "quantile");
    let err = model.train(&params).unwrap_err();
    assert!(matches!(
        err,
        MqError::Configuration(ConfigurationError::ReservedKey(_))
    ));
    assert_eq!(model.state(), &FitState::Unfit);
}

#[test]
fn malformed_constraints() {
    let (x, y) = linear_with_noise(30, 6);
    let mut model = MQRegressor::new(x, y, 0.5f32, RegressorConfig::default()).unwrap();

    let err = model
        .train(&Params::new().with("monotone_constraints", json!({ "x0": 1 })))
        .unwrap_err();
    assert!(matches!(
        err,
        MqError::Configuration(ConfigurationError::MalformedConstraints(_))
    ));

    let err = model
        .train(&Params::new().with("monotone_constraints", json!([3, 0])))
        .unwrap_err();
    assert!(matches!(
        err,
        MqError::Configuration(ConfigurationError::InvalidConstraint(3))
    ));
}

#[test]
fn whole_number_float_constraints_are_accepted() {
    let (x, y) = linear_with_noise(60, 6);
    let mut model = MQRegressor::new(x, y, [0.3f32, 0.7], RegressorConfig::default()).unwrap();
    let params = leaf_wise_params().with("monotone_constraints", json!([1.0, 0.0]));
    assert!(model.train(&params).is_ok());
    assert!(model.is_fitted());
}

#[test]
fn engine_diagnostics_pass_through() {
    let (x, y) = linear_with_noise(30, 7);
    let mut model = MQRegressor::new(x, y, 0.5f32, RegressorConfig::default()).unwrap();
    let err = model
        .train(&Params::new().with("num_leaves", "many"))
        .unwrap_err();
    match err {
        MqError::Engine(EngineError::InvalidParam { key, .. }) => assert_eq!(key, "num_leaves"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_finite_features_fail_in_engine() {
    let (mut x, y) = linear_with_noise(30, 8);
    x[[4, 1]] = f32::NAN;
    let mut model = MQRegressor::new(x, y, [0.2f32, 0.8], RegressorConfig::default()).unwrap();
    let err = model.train(&leaf_wise_params()).unwrap_err();
    assert!(matches!(
        err,
        MqError::Engine(EngineError::NonFiniteFeature { row: 4, feature: 1 })
    ));
}

#[test]
fn predict_feature_count() {
    let (model, _) = fitted();
    let err = model
        .predict(Array2::zeros((5, 3)).view(), 0.5f32)
        .unwrap_err();
    assert!(matches!(
        err,
        MqError::Validation(ValidationError::FeatureCountMismatch { expected: 2, got: 3 })
    ));
}

#[test]
fn score_checks_label_length() {
    let (model, x) = fitted();
    let err = model.score(x.view(), Array1::zeros(3).view()).unwrap_err();
    assert!(matches!(
        err,
        MqError::Validation(ValidationError::LabelLengthMismatch { .. })
    ));
}
