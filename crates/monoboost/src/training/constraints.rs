//! Monotone constraint vector for stacked data.
//!
//! The quantile-identifier column is always the last stacked column and
//! always gets `+1`: predictions may not decrease as alpha grows. That
//! single constraint is what keeps the quantile curves from crossing.
//!
//! Constraints the caller supplied for the original features are kept
//! and the `+1` is appended after them.

use serde_json::Value;

use crate::engine::params::integral;
use crate::engine::MONOTONE_CONSTRAINTS;
use crate::error::ConfigurationError;
use crate::params::Params;

/// Keys the quantile layer owns. Passing one is a configuration error.
pub const RESERVED_KEYS: &[&str] = &["objective"];

/// One `-1`/`0`/`1` entry per stacked column, last entry `+1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintVector(Vec<i8>);

impl ConstraintVector {
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry of the quantile-identifier column.
    pub fn quantile_constraint(&self) -> i8 {
        self.0.last().copied().unwrap_or_default()
    }
}

/// Build the constraint vector for `n_stacked_columns` columns.
///
/// Without `user` constraints every original column is unconstrained.
/// With them, `user` must cover exactly the original columns.
///
/// # Errors
///
/// - [`ConfigurationError::ConstraintLength`] if `user` does not have one
///   entry per original column
/// - [`ConfigurationError::InvalidConstraint`] for entries outside
///   `{-1, 0, 1}`
pub fn build_constraints(
    user: Option<&[i64]>,
    n_stacked_columns: usize,
) -> Result<ConstraintVector, ConfigurationError> {
    let n_original = n_stacked_columns.saturating_sub(1);
    let mut constraints = match user {
        None => vec![0i8; n_original],
        Some(user) => {
            if user.len() != n_original {
                return Err(ConfigurationError::ConstraintLength {
                    expected: n_original,
                    got: user.len(),
                });
            }
            user.iter()
                .map(|&c| match c {
                    -1..=1 => Ok(c as i8),
                    other => Err(ConfigurationError::InvalidConstraint(other)),
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    constraints.push(1);
    Ok(ConstraintVector(constraints))
}

/// Read caller constraints from a JSON array (`[1, 0]`, `[1.0, 0.0]`) or a
/// delimited string (`"1,0"`, `"(1,0)"`). Accepts the same encodings as the
/// engine's own parameter reader.
pub fn parse_user_constraints(value: &Value) -> Result<Vec<i64>, ConfigurationError> {
    let malformed = || ConfigurationError::MalformedConstraints(value.to_string());
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| integral(item).ok_or_else(malformed))
            .collect(),
        Value::String(text) => text
            .trim()
            .trim_start_matches(['(', '['])
            .trim_end_matches([')', ']'])
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| malformed()))
            .collect(),
        _ => Err(malformed()),
    }
}

/// Reject parameters the quantile layer must own.
pub fn check_reserved(params: &Params) -> Result<(), ConfigurationError> {
    match RESERVED_KEYS.iter().find(|key| params.contains_key(key)) {
        Some(key) => Err(ConfigurationError::ReservedKey(key.to_string())),
        None => Ok(()),
    }
}

/// Split caller params into backend params (constraints removed) and the
/// full stacked constraint vector.
pub fn prepare_params(
    params: &Params,
    n_stacked_columns: usize,
) -> Result<(Params, ConstraintVector), ConfigurationError> {
    check_reserved(params)?;
    let mut params = params.clone();
    let user = params
        .remove(MONOTONE_CONSTRAINTS)
        .map(|value| parse_user_constraints(&value))
        .transpose()?;
    let constraints = build_constraints(user.as_deref(), n_stacked_columns)?;
    Ok((params, constraints))
}
