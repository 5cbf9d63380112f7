//! Boosting loop.
//!
//! Orchestrates gradient computation, tree growing, and prediction updates.
//! Use [`Trainer::train`] to fit a [`Forest`] to a [`Dataset`].

use super::dataset::Dataset;
use super::grower::TreeGrower;
use super::logger::TrainingLogger;
use super::params::BoosterParams;
use super::tree::Forest;
use super::{CustomMetric, CustomObjective, EngineError, GradsTuple};
use crate::utils::{run_with_threads, Parallelism};

/// Gradient boosting trainer driven by a caller-supplied objective.
pub struct Trainer<'a> {
    objective: &'a dyn CustomObjective,
    metric: Option<&'a dyn CustomMetric>,
    params: BoosterParams,
}

impl<'a> Trainer<'a> {
    pub fn new(
        objective: &'a dyn CustomObjective,
        metric: Option<&'a dyn CustomMetric>,
        params: BoosterParams,
    ) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    /// Train a forest, setting up the thread pool requested by
    /// `n_threads`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConstraintLength`] if constraints do not match the
    ///   feature count
    /// - [`EngineError::NonFiniteGradient`] if the objective produces NaN
    ///   or infinite values
    /// - [`EngineError::ThreadPool`] if the pool cannot be built
    pub fn train(&self, dataset: &Dataset) -> Result<Forest, EngineError> {
        let constraints = &self.params.monotone_constraints;
        if !constraints.is_empty() && constraints.len() != dataset.n_features() {
            return Err(EngineError::ConstraintLength {
                expected: dataset.n_features(),
                got: constraints.len(),
            });
        }

        run_with_threads(self.params.n_threads, |parallelism| {
            self.train_with(dataset, parallelism)
        })?
    }

    /// Train on the current thread pool.
    pub fn train_with(
        &self,
        dataset: &Dataset,
        parallelism: Parallelism,
    ) -> Result<Forest, EngineError> {
        let n_rows = dataset.n_rows();
        let params = &self.params;

        let mut logger = TrainingLogger::new(params.verbosity);
        for key in &params.ignored {
            logger.warn_unknown_param(key);
        }
        logger.start_training(params.n_rounds, n_rows, dataset.n_features());

        let grower = TreeGrower::new(
            dataset,
            &params.monotone_constraints,
            &params.grower,
            parallelism,
        );
        let labels = dataset.labels();

        let mut forest = Forest::new(params.base_score, dataset.n_features());
        let mut predictions = vec![params.base_score; n_rows];
        let mut grad_hess = vec![GradsTuple::default(); n_rows];

        for round in 0..params.n_rounds {
            self.objective
                .gradients_into(&predictions, labels, &mut grad_hess);
            if let Some(row) = grad_hess
                .iter()
                .position(|gh| !(gh.grad.is_finite() && gh.hess.is_finite()))
            {
                return Err(EngineError::NonFiniteGradient { round, row });
            }

            let tree = grower.grow(&grad_hess);
            let features = dataset.features();
            parallelism.maybe_par_for_each_mut(&mut predictions, |i, pred| {
                *pred += tree.predict_row(features.row(i));
            });

            let metric = self
                .metric
                .map(|m| (m.name(), m.evaluate(&predictions, labels)));
            logger.log_round(round, &tree, metric);
            forest.push_tree(tree);
        }

        logger.finish_training(forest.n_trees());
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::constraints::MonotonicConstraint;
    use crate::engine::params::ParamStyle;
    use crate::params::Params;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2};
    use serde_json::json;

    /// Plain squared error, enough to exercise the loop.
    struct SquaredError;

    impl CustomObjective for SquaredError {
        fn gradients_into(&self, predictions: &[f32], labels: &[f32], grad_hess: &mut [GradsTuple]) {
            for ((gh, &p), &y) in grad_hess.iter_mut().zip(predictions).zip(labels) {
                *gh = GradsTuple {
                    grad: p - y,
                    hess: 1.0,
                };
            }
        }

        fn name(&self) -> &'static str {
            "squared_error"
        }
    }

    struct Rmse;

    impl CustomMetric for Rmse {
        fn evaluate(&self, predictions: &[f32], labels: &[f32]) -> f64 {
            let sse: f64 = predictions
                .iter()
                .zip(labels)
                .map(|(&p, &y)| ((p - y) as f64).powi(2))
                .sum();
            (sse / labels.len() as f64).sqrt()
        }

        fn name(&self) -> &'static str {
            "rmse"
        }
    }

    struct Poisoned;

    impl CustomObjective for Poisoned {
        fn gradients_into(&self, _: &[f32], _: &[f32], grad_hess: &mut [GradsTuple]) {
            grad_hess[3].grad = f32::NAN;
        }

        fn name(&self) -> &'static str {
            "poisoned"
        }
    }

    fn linear_dataset(n: usize) -> Dataset {
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f32 / n as f32);
        let y = Array1::from_shape_fn(n, |i| 2.0 * i as f32 / n as f32);
        Dataset::new(x, y).unwrap()
    }

    fn booster(value: serde_json::Value, style: ParamStyle) -> BoosterParams {
        BoosterParams::from_params(&Params::from_value(value).unwrap(), style).unwrap()
    }

    #[test]
    fn fits_linear_target() {
        let ds = linear_dataset(64);
        let params = booster(
            json!({ "num_iterations": 50, "learning_rate": 0.3, "min_data_in_leaf": 2, "verbosity": -1 }),
            ParamStyle::LeafWise,
        );
        let forest = Trainer::new(&SquaredError, Some(&Rmse), params)
            .train(&ds)
            .unwrap();
        assert_eq!(forest.n_trees(), 50);

        let preds = forest.predict(ds.features(), Parallelism::Sequential).unwrap();
        let rmse = Rmse.evaluate(preds.as_slice().unwrap(), ds.labels());
        assert!(rmse < 0.1, "rmse = {rmse}");
    }

    #[test]
    fn zero_rounds_gives_base_score() {
        let ds = linear_dataset(8);
        let params = booster(json!({ "num_boost_round": 0 }), ParamStyle::DepthWise);
        let forest = Trainer::new(&SquaredError, None, params).train(&ds).unwrap();
        assert_eq!(forest.n_trees(), 0);
        let preds = forest.predict(ds.features(), Parallelism::Sequential).unwrap();
        for p in preds {
            assert_abs_diff_eq!(p, 0.5);
        }
    }

    #[test]
    fn thread_count_does_not_change_result() {
        let ds = linear_dataset(40);
        let run = |threads: usize| {
            let params = booster(
                json!({ "num_boost_round": 5, "max_depth": 3, "nthread": threads, "verbosity": 0 }),
                ParamStyle::DepthWise,
            );
            Trainer::new(&SquaredError, None, params).train(&ds).unwrap()
        };
        assert_eq!(run(1), run(2));
    }

    #[test]
    fn rejects_non_finite_gradients() {
        let ds = linear_dataset(8);
        let params = booster(json!({}), ParamStyle::DepthWise);
        let err = Trainer::new(&Poisoned, None, params).train(&ds).unwrap_err();
        assert!(matches!(err, EngineError::NonFiniteGradient { round: 0, row: 3 }));
    }

    #[test]
    fn rejects_constraint_length() {
        let ds = linear_dataset(8);
        let mut params = booster(json!({}), ParamStyle::LeafWise);
        params.monotone_constraints = vec![MonotonicConstraint::Increasing; 2];
        let err = Trainer::new(&SquaredError, None, params).train(&ds).unwrap_err();
        assert!(matches!(err, EngineError::ConstraintLength { expected: 1, got: 2 }));
    }

    #[test]
    fn decreasing_constraint_holds_on_increasing_target() {
        let ds = linear_dataset(32);
        let mut params = booster(
            json!({ "num_boost_round": 20, "max_depth": 4, "verbosity": 0 }),
            ParamStyle::DepthWise,
        );
        params.monotone_constraints = vec![MonotonicConstraint::Decreasing];
        let forest = Trainer::new(&SquaredError, None, params).train(&ds).unwrap();
        let preds = forest.predict(ds.features(), Parallelism::Sequential).unwrap();
        assert!(preds.windows(2).into_iter().all(|w| w[0] >= w[1]));
    }
}
