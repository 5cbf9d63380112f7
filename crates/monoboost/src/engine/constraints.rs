//! Monotonic feature constraints.
//!
//! For each feature: `None`, `Increasing`, or `Decreasing`.
//!
//! Enforcement happens while a tree is grown:
//! 1. Every node carries bounds `(lower, upper)` inherited from its parent
//! 2. Candidate child weights are clamped to those bounds
//! 3. A split on a constrained feature whose clamped weights point the
//!    wrong way is rejected
//! 4. Children of an accepted split inherit bounds cut at the midpoint of
//!    the two child weights
//!
//! Every leaf of a subtree lies inside the subtree root's bounds, so two
//! inputs that differ only in an increasing feature can never be ordered
//! the wrong way by any single tree, and hence by the ensemble.

// ============================================================================
// MonotonicConstraint
// ============================================================================

/// Monotonic constraint type for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonotonicConstraint {
    #[default]
    None,
    /// Predictions must not decrease as the feature value grows.
    Increasing,
    /// Predictions must not increase as the feature value grows.
    Decreasing,
}

impl MonotonicConstraint {
    /// Decode the integer form (`-1`, `0`, `1`). Anything else is `None`
    /// (the Rust `Option`), which callers turn into an error.
    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Increasing),
            -1 => Some(Self::Decreasing),
            _ => None,
        }
    }

    pub fn to_int(self) -> i8 {
        match self {
            Self::None => 0,
            Self::Increasing => 1,
            Self::Decreasing => -1,
        }
    }

    #[inline]
    pub fn is_constrained(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether child weights `(left, right)` respect this constraint.
    /// Left holds the lower feature values.
    #[inline]
    pub fn allows(self, weight_left: f64, weight_right: f64) -> bool {
        match self {
            Self::None => true,
            Self::Increasing => weight_left <= weight_right,
            Self::Decreasing => weight_left >= weight_right,
        }
    }
}

// ============================================================================
// MonotonicBounds
// ============================================================================

/// Allowed range of leaf weights for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonotonicBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for MonotonicBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl MonotonicBounds {
    pub fn unbounded() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    #[inline]
    pub fn clamp(&self, weight: f64) -> f64 {
        weight.max(self.lower).min(self.upper)
    }

    /// Bounds for the children of a split on a feature with `constraint`.
    ///
    /// `mid` is the midpoint of the two (already clamped) child weights.
    /// - `Increasing`: left gets `upper = mid`, right gets `lower = mid`
    /// - `Decreasing`: left gets `lower = mid`, right gets `upper = mid`
    pub fn child_bounds(&self, constraint: MonotonicConstraint, mid: f64) -> (Self, Self) {
        match constraint {
            MonotonicConstraint::None => (*self, *self),
            MonotonicConstraint::Increasing => (
                Self {
                    lower: self.lower,
                    upper: mid.min(self.upper),
                },
                Self {
                    lower: mid.max(self.lower),
                    upper: self.upper,
                },
            ),
            MonotonicConstraint::Decreasing => (
                Self {
                    lower: mid.max(self.lower),
                    upper: self.upper,
                },
                Self {
                    lower: self.lower,
                    upper: mid.min(self.upper),
                },
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip() {
        for c in [
            MonotonicConstraint::None,
            MonotonicConstraint::Increasing,
            MonotonicConstraint::Decreasing,
        ] {
            assert_eq!(MonotonicConstraint::from_int(c.to_int() as i64), Some(c));
        }
        assert_eq!(MonotonicConstraint::from_int(2), None);
    }

    #[test]
    fn allows_respects_direction() {
        assert!(MonotonicConstraint::Increasing.allows(-1.0, 1.0));
        assert!(MonotonicConstraint::Increasing.allows(0.5, 0.5));
        assert!(!MonotonicConstraint::Increasing.allows(1.0, -1.0));
        assert!(MonotonicConstraint::Decreasing.allows(1.0, -1.0));
        assert!(!MonotonicConstraint::Decreasing.allows(-1.0, 1.0));
        assert!(MonotonicConstraint::None.allows(1.0, -1.0));
    }

    #[test]
    fn clamp_to_bounds() {
        let bounds = MonotonicBounds {
            lower: -1.0,
            upper: 1.0,
        };
        assert_eq!(bounds.clamp(0.5), 0.5);
        assert_eq!(bounds.clamp(-2.0), -1.0);
        assert_eq!(bounds.clamp(2.0), 1.0);
        assert_eq!(MonotonicBounds::unbounded().clamp(1e30), 1e30);
    }

    #[test]
    fn child_bounds_increasing() {
        let (left, right) =
            MonotonicBounds::unbounded().child_bounds(MonotonicConstraint::Increasing, 0.5);
        assert_eq!(left.lower, f64::NEG_INFINITY);
        assert_eq!(left.upper, 0.5);
        assert_eq!(right.lower, 0.5);
        assert_eq!(right.upper, f64::INFINITY);
    }

    #[test]
    fn child_bounds_decreasing() {
        let (left, right) =
            MonotonicBounds::unbounded().child_bounds(MonotonicConstraint::Decreasing, 0.5);
        assert_eq!(left.lower, 0.5);
        assert_eq!(left.upper, f64::INFINITY);
        assert_eq!(right.lower, f64::NEG_INFINITY);
        assert_eq!(right.upper, 0.5);
    }

    #[test]
    fn child_bounds_nest_inside_parent() {
        let parent = MonotonicBounds {
            lower: 0.0,
            upper: 2.0,
        };
        let (left, right) = parent.child_bounds(MonotonicConstraint::Increasing, 1.0);
        assert_eq!((left.lower, left.upper), (0.0, 1.0));
        assert_eq!((right.lower, right.upper), (1.0, 2.0));

        let (left, right) = parent.child_bounds(MonotonicConstraint::None, 1.0);
        assert_eq!(left, parent);
        assert_eq!(right, parent);
    }
}
