//! Booster parameters parsed from a [`Params`] mapping.
//!
//! The two backends read the same mapping with different key conventions
//! and defaults ([`ParamStyle`]). Keys neither style knows are collected in
//! [`BoosterParams::ignored`] and reported by the trainer, never rejected.

use serde_json::Value;

use super::constraints::MonotonicConstraint;
use super::grower::{GrowerParams, GrowthStrategy};
use super::logger::Verbosity;
use super::split::GainParams;
use super::EngineError;
use crate::params::Params;

/// Key convention used to read a [`Params`] mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// LightGBM-like names, leaf-wise growth.
    LeafWise,
    /// XGBoost-like names, depth-wise growth.
    DepthWise,
}

pub const MONOTONE_CONSTRAINTS: &str = "monotone_constraints";

// Aliases per setting. The first entry is the canonical name.
const LW_ROUNDS: &[&str] = &["num_iterations", "num_boost_round", "n_estimators"];
const LW_LEARNING_RATE: &[&str] = &["learning_rate", "eta"];
const LW_LEAVES: &[&str] = &["num_leaves", "max_leaves"];
const LW_MAX_DEPTH: &[&str] = &["max_depth"];
const LW_LAMBDA: &[&str] = &["lambda_l2", "reg_lambda"];
const LW_ALPHA: &[&str] = &["lambda_l1", "reg_alpha"];
const LW_MIN_HESS: &[&str] = &["min_sum_hessian_in_leaf", "min_child_weight"];
const LW_MIN_DATA: &[&str] = &["min_data_in_leaf", "min_child_samples"];
const LW_MIN_GAIN: &[&str] = &["min_gain_to_split", "min_split_gain"];
const LW_BASE_SCORE: &[&str] = &["init_score"];
const LW_THREADS: &[&str] = &["num_threads", "n_jobs"];
const LW_VERBOSITY: &[&str] = &["verbosity", "verbose"];

const DW_ROUNDS: &[&str] = &["num_boost_round", "n_estimators"];
const DW_LEARNING_RATE: &[&str] = &["eta", "learning_rate"];
const DW_MAX_DEPTH: &[&str] = &["max_depth"];
const DW_LAMBDA: &[&str] = &["lambda", "reg_lambda"];
const DW_ALPHA: &[&str] = &["alpha", "reg_alpha"];
const DW_MIN_HESS: &[&str] = &["min_child_weight"];
const DW_MIN_GAIN: &[&str] = &["gamma", "min_split_loss"];
const DW_BASE_SCORE: &[&str] = &["base_score"];
const DW_THREADS: &[&str] = &["nthread", "n_jobs"];
const DW_VERBOSITY: &[&str] = &["verbosity"];

/// Everything the trainer needs for one run.
#[derive(Debug, Clone)]
pub struct BoosterParams {
    pub n_rounds: usize,
    pub grower: GrowerParams,
    pub base_score: f32,
    /// One entry per feature, or empty for "no constraints".
    pub monotone_constraints: Vec<MonotonicConstraint>,
    /// `0` = rayon default.
    pub n_threads: usize,
    pub verbosity: Verbosity,
    /// Keys present in the mapping that were not understood.
    pub ignored: Vec<String>,
}

impl BoosterParams {
    pub fn defaults(style: ParamStyle) -> Self {
        match style {
            ParamStyle::LeafWise => Self {
                n_rounds: 100,
                grower: GrowerParams {
                    gain: GainParams {
                        lambda: 0.0,
                        alpha: 0.0,
                        min_split_gain: 0.0,
                        min_child_weight: 1e-3,
                        min_data_in_leaf: 20,
                    },
                    growth_strategy: GrowthStrategy::LeafWise {
                        max_leaves: 31,
                        max_depth: None,
                    },
                    learning_rate: 0.1,
                },
                base_score: 0.0,
                monotone_constraints: Vec::new(),
                n_threads: 0,
                verbosity: Verbosity::Warning,
                ignored: Vec::new(),
            },
            ParamStyle::DepthWise => Self {
                n_rounds: 10,
                grower: GrowerParams {
                    gain: GainParams::default(),
                    growth_strategy: GrowthStrategy::DepthWise { max_depth: 6 },
                    learning_rate: 0.3,
                },
                base_score: 0.5,
                monotone_constraints: Vec::new(),
                n_threads: 0,
                verbosity: Verbosity::Warning,
                ignored: Vec::new(),
            },
        }
    }

    /// Read `params` using the conventions of `style`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidParam`] for values of the wrong type or out of
    /// range.
    pub fn from_params(params: &Params, style: ParamStyle) -> Result<Self, EngineError> {
        let mut out = Self::defaults(style);
        let mut reader = Reader::new(params);

        match style {
            ParamStyle::LeafWise => {
                if let Some(n) = reader.usize(LW_ROUNDS)? {
                    out.n_rounds = n;
                }
                if let Some(lr) = reader.f64(LW_LEARNING_RATE)? {
                    out.grower.learning_rate = lr as f32;
                }
                let max_leaves = match reader.usize(LW_LEAVES)? {
                    Some(n) if n < 2 => {
                        return Err(invalid(LW_LEAVES[0], format!("must be at least 2, got {n}")))
                    }
                    Some(n) => n as u32,
                    None => 31,
                };
                // LightGBM treats any non-positive depth as "no limit".
                let max_depth = reader
                    .i64(LW_MAX_DEPTH)?
                    .filter(|&d| d > 0)
                    .map(|d| d as u32);
                out.grower.growth_strategy = GrowthStrategy::LeafWise {
                    max_leaves,
                    max_depth,
                };
                if let Some(v) = reader.non_negative(LW_LAMBDA)? {
                    out.grower.gain.lambda = v;
                }
                if let Some(v) = reader.non_negative(LW_ALPHA)? {
                    out.grower.gain.alpha = v;
                }
                if let Some(v) = reader.non_negative(LW_MIN_HESS)? {
                    out.grower.gain.min_child_weight = v;
                }
                if let Some(n) = reader.usize(LW_MIN_DATA)? {
                    out.grower.gain.min_data_in_leaf = n;
                }
                if let Some(v) = reader.non_negative(LW_MIN_GAIN)? {
                    out.grower.gain.min_split_gain = v;
                }
                if let Some(v) = reader.f64(LW_BASE_SCORE)? {
                    out.base_score = v as f32;
                }
                if let Some(n) = reader.usize(LW_THREADS)? {
                    out.n_threads = n;
                }
                if let Some(v) = reader.i64(LW_VERBOSITY)? {
                    out.verbosity = Verbosity::from_leaf_wise(v);
                }
            }
            ParamStyle::DepthWise => {
                if let Some(n) = reader.usize(DW_ROUNDS)? {
                    out.n_rounds = n;
                }
                if let Some(lr) = reader.f64(DW_LEARNING_RATE)? {
                    out.grower.learning_rate = lr as f32;
                }
                if let Some(d) = reader.usize(DW_MAX_DEPTH)? {
                    // 0 means no depth limit.
                    let max_depth = if d == 0 { u32::MAX } else { d as u32 };
                    out.grower.growth_strategy = GrowthStrategy::DepthWise { max_depth };
                }
                if let Some(v) = reader.non_negative(DW_LAMBDA)? {
                    out.grower.gain.lambda = v;
                }
                if let Some(v) = reader.non_negative(DW_ALPHA)? {
                    out.grower.gain.alpha = v;
                }
                if let Some(v) = reader.non_negative(DW_MIN_HESS)? {
                    out.grower.gain.min_child_weight = v;
                }
                if let Some(v) = reader.non_negative(DW_MIN_GAIN)? {
                    out.grower.gain.min_split_gain = v;
                }
                if let Some(v) = reader.f64(DW_BASE_SCORE)? {
                    out.base_score = v as f32;
                }
                if let Some(n) = reader.usize(DW_THREADS)? {
                    out.n_threads = n;
                }
                out.verbosity = match reader.i64(DW_VERBOSITY)? {
                    Some(v) => Verbosity::from_depth_wise(v),
                    None => Verbosity::from_depth_wise(1),
                };
            }
        }

        if let Some(value) = reader.take(MONOTONE_CONSTRAINTS) {
            out.monotone_constraints = parse_constraints(value)?;
        }

        let lr = out.grower.learning_rate;
        if !(lr.is_finite() && lr > 0.0) {
            return Err(invalid("learning_rate", format!("must be positive, got {lr}")));
        }

        out.ignored = reader.unused();
        Ok(out)
    }
}

/// Decode a constraint vector from either a JSON array (`[0, 1]`) or a
/// delimited string (`"0,1"`, `"(0,1)"`, `"[0,1]"`).
pub fn parse_constraints(value: &Value) -> Result<Vec<MonotonicConstraint>, EngineError> {
    let ints: Vec<i64> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                integral(item)
                    .ok_or_else(|| invalid(MONOTONE_CONSTRAINTS, format!("{item} is not an integer")))
            })
            .collect::<Result<_, _>>()?,
        Value::String(text) => {
            let inner = text
                .trim()
                .trim_start_matches(['(', '['])
                .trim_end_matches([')', ']']);
            inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<i64>()
                        .map_err(|_| invalid(MONOTONE_CONSTRAINTS, format!("{s:?} is not an integer")))
                })
                .collect::<Result<_, _>>()?
        }
        other => {
            return Err(invalid(
                MONOTONE_CONSTRAINTS,
                format!("expected an array or a string, got {other}"),
            ))
        }
    };

    ints.into_iter()
        .map(|v| {
            MonotonicConstraint::from_int(v)
                .ok_or_else(|| invalid(MONOTONE_CONSTRAINTS, format!("{v} is not one of -1, 0, 1")))
        })
        .collect()
}

fn invalid(key: &str, reason: String) -> EngineError {
    EngineError::InvalidParam {
        key: key.to_string(),
        reason,
    }
}

/// Integer view of a JSON number (`3` or `3.0`).
pub(crate) fn integral(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    value
        .as_f64()
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Tracks which keys were consumed.
struct Reader<'a> {
    params: &'a Params,
    used: Vec<&'a str>,
}

impl<'a> Reader<'a> {
    fn new(params: &'a Params) -> Self {
        Self {
            params,
            used: Vec::new(),
        }
    }

    /// Value of the first present alias. Every alias is marked as used.
    fn lookup(&mut self, aliases: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        self.used.extend_from_slice(aliases);
        self.params.get_any(aliases)
    }

    fn take(&mut self, key: &'a str) -> Option<&'a Value> {
        self.lookup(&[key]).map(|(_, v)| v)
    }

    fn f64(&mut self, aliases: &[&'a str]) -> Result<Option<f64>, EngineError> {
        let Some((key, value)) = self.lookup(aliases) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(key, format!("expected a finite number, got {value}"))),
        }
    }

    fn non_negative(&mut self, aliases: &[&'a str]) -> Result<Option<f64>, EngineError> {
        match self.f64(aliases)? {
            Some(v) if v < 0.0 => Err(invalid(aliases[0], format!("must be non-negative, got {v}"))),
            other => Ok(other),
        }
    }

    fn i64(&mut self, aliases: &[&'a str]) -> Result<Option<i64>, EngineError> {
        let Some((key, value)) = self.lookup(aliases) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::String(s) => s.trim().parse::<i64>().ok(),
            other => integral(other),
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected an integer, got {value}")))
    }

    fn usize(&mut self, aliases: &[&'a str]) -> Result<Option<usize>, EngineError> {
        match self.i64(aliases)? {
            Some(v) if v < 0 => Err(invalid(aliases[0], format!("must be non-negative, got {v}"))),
            Some(v) => Ok(Some(v as usize)),
            None => Ok(None),
        }
    }

    fn unused(&self) -> Vec<String> {
        self.params
            .keys()
            .filter(|key| !self.used.contains(key))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        Params::from_value(value).unwrap()
    }

    #[test]
    fn leaf_wise_defaults() {
        let p = BoosterParams::from_params(&Params::new(), ParamStyle::LeafWise).unwrap();
        assert_eq!(p.n_rounds, 100);
        assert_eq!(p.grower.learning_rate, 0.1);
        assert_eq!(
            p.grower.growth_strategy,
            GrowthStrategy::LeafWise {
                max_leaves: 31,
                max_depth: None
            }
        );
        assert_eq!(p.grower.gain.min_data_in_leaf, 20);
        assert_eq!(p.base_score, 0.0);
        assert_eq!(p.verbosity, Verbosity::Warning);
    }

    #[test]
    fn depth_wise_defaults() {
        let p = BoosterParams::from_params(&Params::new(), ParamStyle::DepthWise).unwrap();
        assert_eq!(p.n_rounds, 10);
        assert_eq!(p.grower.learning_rate, 0.3);
        assert_eq!(p.grower.growth_strategy, GrowthStrategy::DepthWise { max_depth: 6 });
        assert_eq!(p.grower.gain.lambda, 1.0);
        assert_eq!(p.base_score, 0.5);
        assert_eq!(p.verbosity, Verbosity::Warning);
    }

    #[test]
    fn aliases_are_honoured() {
        let p = BoosterParams::from_params(
            &params(json!({ "n_estimators": 7, "eta": 0.05, "max_leaves": 8, "max_depth": 3 })),
            ParamStyle::LeafWise,
        )
        .unwrap();
        assert_eq!(p.n_rounds, 7);
        assert_eq!(p.grower.learning_rate, 0.05);
        assert_eq!(
            p.grower.growth_strategy,
            GrowthStrategy::LeafWise {
                max_leaves: 8,
                max_depth: Some(3)
            }
        );
        assert!(p.ignored.is_empty());
    }

    #[test]
    fn unknown_keys_are_collected() {
        let p = BoosterParams::from_params(
            &params(json!({ "max_depth": 2, "colsample_bytree": 0.5 })),
            ParamStyle::DepthWise,
        )
        .unwrap();
        assert_eq!(p.ignored, vec!["colsample_bytree".to_string()]);
        assert_eq!(p.grower.growth_strategy, GrowthStrategy::DepthWise { max_depth: 2 });
    }

    #[test]
    fn style_specific_keys() {
        // `num_leaves` means nothing to the depth-wise reader.
        let p = BoosterParams::from_params(&params(json!({ "num_leaves": 4 })), ParamStyle::DepthWise)
            .unwrap();
        assert_eq!(p.ignored, vec!["num_leaves".to_string()]);
    }

    #[test]
    fn rejects_bad_values() {
        for (value, style) in [
            (json!({ "learning_rate": 0.0 }), ParamStyle::LeafWise),
            (json!({ "eta": "fast" }), ParamStyle::DepthWise),
            (json!({ "num_leaves": 1 }), ParamStyle::LeafWise),
            (json!({ "lambda": -1.0 }), ParamStyle::DepthWise),
            (json!({ "num_iterations": 2.5 }), ParamStyle::LeafWise),
        ] {
            let err = BoosterParams::from_params(&params(value.clone()), style).unwrap_err();
            assert!(matches!(err, EngineError::InvalidParam { .. }), "{value}: {err}");
        }
    }

    #[test]
    fn constraint_encodings() {
        use MonotonicConstraint::*;
        let expected = vec![None, Decreasing, Increasing];
        assert_eq!(parse_constraints(&json!([0, -1, 1])).unwrap(), expected);
        assert_eq!(parse_constraints(&json!("(0,-1,1)")).unwrap(), expected);
        assert_eq!(parse_constraints(&json!("0, -1, 1")).unwrap(), expected);
        assert_eq!(parse_constraints(&json!("[0,-1,1]")).unwrap(), expected);
        assert!(parse_constraints(&json!([0, 2])).is_err());
        assert!(parse_constraints(&json!("(0,x)")).is_err());
        assert!(parse_constraints(&json!(1)).is_err());
    }

    #[test]
    fn verbosity_follows_style() {
        let p = BoosterParams::from_params(&params(json!({ "verbose": -1 })), ParamStyle::LeafWise)
            .unwrap();
        assert_eq!(p.verbosity, Verbosity::Silent);
        let p = BoosterParams::from_params(&params(json!({ "verbosity": 0 })), ParamStyle::DepthWise)
            .unwrap();
        assert_eq!(p.verbosity, Verbosity::Silent);
    }
}
