//! Exact greedy split finding and gain computation.
//!
//! For a node holding rows `R`, every feature is scanned in sorted value
//! order; each boundary between two distinct adjacent values is a candidate
//! threshold (rows with `value <= threshold` go left).
//!
//! # Gain Formula
//!
//! The second-order objective of a leaf with weight `w` is
//!
//! ```text
//! obj(w) = G·w + ½(H + λ)·w² + α·|w|
//! ```
//!
//! minimized at `w* = -soft(G, α) / (H + λ)`. The gain of a split is
//!
//! ```text
//! gain = obj_parent(w_p) - obj_left(w_l) - obj_right(w_r) - γ
//! ```
//!
//! where each weight is first clamped to the node's monotonic bounds.

use super::constraints::{MonotonicBounds, MonotonicConstraint};
use super::dataset::Dataset;
use super::GradsTuple;
use crate::utils::Parallelism;

// ============================================================================
// GainParams
// ============================================================================

/// Regularization and split validity parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization on leaf weights.
    pub lambda: f64,
    /// L1 regularization on leaf weights.
    pub alpha: f64,
    /// Minimum loss reduction to make a split.
    pub min_split_gain: f64,
    /// Minimum hessian sum in each child.
    pub min_child_weight: f64,
    /// Minimum number of rows in each child.
    pub min_data_in_leaf: usize,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            alpha: 0.0,
            min_split_gain: 0.0,
            min_child_weight: 1.0,
            min_data_in_leaf: 1,
        }
    }
}

impl GainParams {
    pub fn no_regularization() -> Self {
        Self {
            lambda: 0.0,
            alpha: 0.0,
            min_split_gain: 0.0,
            min_child_weight: 0.0,
            min_data_in_leaf: 1,
        }
    }
}

// ============================================================================
// Gain Functions
// ============================================================================

/// Soft thresholding for L1 regularization.
#[inline]
pub fn soft_threshold(g: f64, alpha: f64) -> f64 {
    if g > alpha {
        g - alpha
    } else if g < -alpha {
        g + alpha
    } else {
        0.0
    }
}

/// Unconstrained optimal leaf weight `-soft(G, α) / (H + λ)`.
#[inline]
pub fn leaf_weight(sum_grad: f64, sum_hess: f64, params: &GainParams) -> f64 {
    let h = sum_hess + params.lambda;
    if h <= 0.0 {
        return 0.0;
    }
    -soft_threshold(sum_grad, params.alpha) / h
}

/// Leaf objective evaluated at an arbitrary weight. Lower is better.
#[inline]
pub fn leaf_objective_at(sum_grad: f64, sum_hess: f64, weight: f64, params: &GainParams) -> f64 {
    sum_grad * weight + 0.5 * (sum_hess + params.lambda) * weight * weight + params.alpha * weight.abs()
}

// ============================================================================
// SplitInfo
// ============================================================================

/// The best split found for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub feature: usize,
    /// Rows with `value <= threshold` go left.
    pub threshold: f32,
    pub gain: f64,
    pub grad_left: f64,
    pub hess_left: f64,
    pub grad_right: f64,
    pub hess_right: f64,
    /// Left child weight, clamped to the node bounds.
    pub weight_left: f64,
    /// Right child weight, clamped to the node bounds.
    pub weight_right: f64,
}

/// Gradient statistics and bounds of the node being split.
#[derive(Clone, Copy, Debug)]
pub struct NodeStats {
    pub sum_grad: f64,
    pub sum_hess: f64,
    pub bounds: MonotonicBounds,
}

impl NodeStats {
    pub fn from_rows(rows: &[u32], grad_hess: &[GradsTuple], bounds: MonotonicBounds) -> Self {
        let (sum_grad, sum_hess) = rows.iter().fold((0.0f64, 0.0f64), |(g, h), &r| {
            let gh = grad_hess[r as usize];
            (g + gh.grad as f64, h + gh.hess as f64)
        });
        Self {
            sum_grad,
            sum_hess,
            bounds,
        }
    }

    /// The node's own weight, clamped to its bounds.
    #[inline]
    pub fn weight(&self, params: &GainParams) -> f64 {
        self.bounds.clamp(leaf_weight(self.sum_grad, self.sum_hess, params))
    }
}

/// Midpoint threshold strictly below `hi` (falls back to `lo`).
#[inline]
fn threshold_between(lo: f32, hi: f32) -> f32 {
    let t = lo + (hi - lo) * 0.5;
    if t >= lo && t < hi {
        t
    } else {
        lo
    }
}

/// Best split of one feature over `rows`, or `None` if no candidate passes
/// the validity checks.
fn best_split_for_feature(
    dataset: &Dataset,
    feature: usize,
    constraint: MonotonicConstraint,
    rows: &[u32],
    grad_hess: &[GradsTuple],
    node: &NodeStats,
    params: &GainParams,
) -> Option<SplitInfo> {
    let column = dataset.feature_column(feature);
    let mut order: Vec<(f32, u32)> = rows.iter().map(|&r| (column[r as usize], r)).collect();
    order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let n = order.len();
    let parent_obj = leaf_objective_at(node.sum_grad, node.sum_hess, node.weight(params), params);
    let min_data = params.min_data_in_leaf.max(1);

    let mut best: Option<SplitInfo> = None;
    let (mut grad_left, mut hess_left) = (0.0f64, 0.0f64);

    for i in 0..n - 1 {
        let gh = grad_hess[order[i].1 as usize];
        grad_left += gh.grad as f64;
        hess_left += gh.hess as f64;

        let (value, next) = (order[i].0, order[i + 1].0);
        if value == next {
            continue;
        }
        let n_left = i + 1;
        if n_left < min_data || n - n_left < min_data {
            continue;
        }
        let grad_right = node.sum_grad - grad_left;
        let hess_right = node.sum_hess - hess_left;
        if hess_left < params.min_child_weight || hess_right < params.min_child_weight {
            continue;
        }

        let weight_left = node.bounds.clamp(leaf_weight(grad_left, hess_left, params));
        let weight_right = node.bounds.clamp(leaf_weight(grad_right, hess_right, params));
        if !constraint.allows(weight_left, weight_right) {
            continue;
        }

        let gain = parent_obj
            - leaf_objective_at(grad_left, hess_left, weight_left, params)
            - leaf_objective_at(grad_right, hess_right, weight_right, params)
            - params.min_split_gain;

        if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
            best = Some(SplitInfo {
                feature,
                threshold: threshold_between(value, next),
                gain,
                grad_left,
                hess_left,
                grad_right,
                hess_right,
                weight_left,
                weight_right,
            });
        }
    }

    best
}

/// Find the best split across all features.
///
/// Ties on gain resolve to the lowest feature index, so the result does
/// not depend on `parallelism`.
pub fn find_best_split(
    dataset: &Dataset,
    constraints: &[MonotonicConstraint],
    rows: &[u32],
    grad_hess: &[GradsTuple],
    node: &NodeStats,
    params: &GainParams,
    parallelism: Parallelism,
) -> Option<SplitInfo> {
    if rows.len() < 2 * params.min_data_in_leaf.max(1) {
        return None;
    }

    parallelism
        .maybe_par_map(0..dataset.n_features(), |feature| {
            let constraint = constraints.get(feature).copied().unwrap_or_default();
            best_split_for_feature(dataset, feature, constraint, rows, grad_hess, node, params)
        })
        .into_iter()
        .flatten()
        .fold(None, |best: Option<SplitInfo>, candidate| match best {
            Some(b) if b.gain >= candidate.gain => Some(b),
            _ => Some(candidate),
        })
}

// ============================================================================
// Tests
// ============================================================================
