//! Quantile level and smoothing-width validation.

use std::ops::Index;

use crate::error::ValidationError;

/// Default huber smoothing width.
pub const DEFAULT_DELTA: f32 = 0.05;

/// Exclusive upper bound for the huber smoothing width.
pub const MAX_DELTA: f32 = 0.1;

/// Quantile levels as given by the caller: one level or several.
#[derive(Debug, Clone, PartialEq)]
pub enum AlphaLike {
    Scalar(f32),
    Many(Vec<f32>),
}

impl AlphaLike {
    fn into_vec(self) -> Vec<f32> {
        match self {
            Self::Scalar(alpha) => vec![alpha],
            Self::Many(alphas) => alphas,
        }
    }
}

impl From<f32> for AlphaLike {
    fn from(alpha: f32) -> Self {
        Self::Scalar(alpha)
    }
}

impl From<Vec<f32>> for AlphaLike {
    fn from(alphas: Vec<f32>) -> Self {
        Self::Many(alphas)
    }
}

impl From<&[f32]> for AlphaLike {
    fn from(alphas: &[f32]) -> Self {
        Self::Many(alphas.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for AlphaLike {
    fn from(alphas: [f32; N]) -> Self {
        Self::Many(alphas.to_vec())
    }
}

impl From<&QuantileSet> for AlphaLike {
    fn from(set: &QuantileSet) -> Self {
        Self::Many(set.0.clone())
    }
}

/// Validated quantile levels: non-empty, strictly increasing, all in
/// `(0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSet(Vec<f32>);

impl QuantileSet {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of levels (`K`).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A validated set is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.0.iter().copied()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl Index<usize> for QuantileSet {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl AsRef<[f32]> for QuantileSet {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for QuantileSet {
    type Error = ValidationError;

    fn try_from(alphas: Vec<f32>) -> Result<Self, Self::Error> {
        validate_alphas(alphas)
    }
}

/// Validate and sort quantile levels.
///
/// Input order does not matter; the result is ascending. Duplicates are
/// rejected, never silently merged.
///
/// # Errors
///
/// - [`ValidationError::EmptyAlphas`] for an empty sequence
/// - [`ValidationError::AlphaOutOfRange`] for a level outside `(0, 1)`
///   (boundaries excluded, NaN included)
/// - [`ValidationError::DuplicateAlpha`] if a level appears twice
pub fn validate_alphas(alphas: impl Into<AlphaLike>) -> Result<QuantileSet, ValidationError> {
    let mut alphas = alphas.into().into_vec();
    if alphas.is_empty() {
        return Err(ValidationError::EmptyAlphas);
    }
    if let Some(&bad) = alphas.iter().find(|&&a| !(a > 0.0 && a < 1.0)) {
        return Err(ValidationError::AlphaOutOfRange(bad));
    }

    alphas.sort_by(f32::total_cmp);
    if let Some(pair) = alphas.windows(2).find(|w| w[0] == w[1]) {
        return Err(ValidationError::DuplicateAlpha(pair[0]));
    }
    Ok(QuantileSet(alphas))
}

/// Validate the huber smoothing width: `0 < delta < 0.1`.
pub fn validate_delta(delta: f32) -> Result<f32, ValidationError> {
    if delta > 0.0 && delta < MAX_DELTA {
        Ok(delta)
    } else {
        Err(ValidationError::InvalidDelta(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn sorts_valid_levels() {
        let set = validate_alphas([0.5f32, 0.1, 0.9]).unwrap();
        assert_eq!(set.as_slice(), &[0.1, 0.5, 0.9]);
        assert_eq!(set.len(), 3);
        assert_eq!(set[1], 0.5);
    }

    #[test]
    fn accepts_scalar() {
        let set = validate_alphas(0.3f32).unwrap();
        assert_eq!(set.as_slice(), &[0.3]);
    }

    #[rstest]
    #[case::duplicate(vec![0.5, 0.5], ValidationError::DuplicateAlpha(0.5))]
    #[case::unsorted_duplicate(vec![0.9, 0.2, 0.9], ValidationError::DuplicateAlpha(0.9))]
    #[case::zero(vec![0.0, 0.5], ValidationError::AlphaOutOfRange(0.0))]
    #[case::one(vec![0.5, 1.0], ValidationError::AlphaOutOfRange(1.0))]
    #[case::negative(vec![-0.1], ValidationError::AlphaOutOfRange(-0.1))]
    #[case::empty(vec![], ValidationError::EmptyAlphas)]
    fn rejects_invalid_levels(#[case] alphas: Vec<f32>, #[case] expected: ValidationError) {
        assert_eq!(validate_alphas(alphas).unwrap_err(), expected);
    }

    #[test]
    fn rejects_nan() {
        let err = validate_alphas(vec![0.2, f32::NAN]).unwrap_err();
        assert!(matches!(err, ValidationError::AlphaOutOfRange(v) if v.is_nan()));
    }

    #[rstest]
    #[case(0.05, true)]
    #[case(0.0999, true)]
    #[case(0.1, false)]
    #[case(0.0, false)]
    #[case(-0.01, false)]
    #[case(f32::NAN, false)]
    fn delta_bounds(#[case] delta: f32, #[case] ok: bool) {
        assert_eq!(validate_delta(delta).is_ok(), ok);
    }

    #[test]
    fn try_from_validates() {
        assert!(QuantileSet::try_from(vec![0.1f32, 0.2]).is_ok());
        assert!(QuantileSet::try_from(vec![1.5f32]).is_err());
    }
}
