//! Tree growing.
//!
//! [`TreeGrower`] turns one round of gradients into one tree. Two growth
//! strategies share the same expansion loop and differ only in which open
//! leaf is split next:
//!
//! - [`GrowthStrategy::DepthWise`]: every splittable leaf above the depth
//!   limit is expanded, shallowest first
//! - [`GrowthStrategy::LeafWise`]: the leaf with the highest gain is
//!   expanded until the leaf budget is spent

use super::constraints::{MonotonicBounds, MonotonicConstraint};
use super::dataset::Dataset;
use super::split::{find_best_split, GainParams, NodeStats, SplitInfo};
use super::tree::{NodeId, Tree};
use super::GradsTuple;
use crate::utils::Parallelism;

/// How trees are grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Level by level up to `max_depth`.
    DepthWise { max_depth: u32 },
    /// Best-first up to `max_leaves`, optionally capped in depth.
    LeafWise {
        max_leaves: u32,
        max_depth: Option<u32>,
    },
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self::DepthWise { max_depth: 6 }
    }
}

impl GrowthStrategy {
    #[inline]
    fn depth_allows_split(&self, depth: u32) -> bool {
        match *self {
            Self::DepthWise { max_depth } => depth < max_depth,
            Self::LeafWise { max_depth, .. } => max_depth.map_or(true, |d| depth < d),
        }
    }
}

/// Parameters consumed by the grower.
#[derive(Debug, Clone)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub growth_strategy: GrowthStrategy,
    /// Shrinkage applied to every leaf value.
    pub learning_rate: f32,
}

/// An open leaf waiting for a decision.
struct Candidate {
    node: NodeId,
    rows: Vec<u32>,
    depth: u32,
    stats: NodeStats,
    split: Option<SplitInfo>,
}

/// Grows regression trees over one dataset.
pub struct TreeGrower<'a> {
    dataset: &'a Dataset,
    constraints: &'a [MonotonicConstraint],
    params: &'a GrowerParams,
    parallelism: Parallelism,
}

impl<'a> TreeGrower<'a> {
    pub fn new(
        dataset: &'a Dataset,
        constraints: &'a [MonotonicConstraint],
        params: &'a GrowerParams,
        parallelism: Parallelism,
    ) -> Self {
        Self {
            dataset,
            constraints,
            params,
            parallelism,
        }
    }

    fn candidate(
        &self,
        node: NodeId,
        rows: Vec<u32>,
        depth: u32,
        stats: NodeStats,
        grad_hess: &[GradsTuple],
    ) -> Candidate {
        let split = if self.params.growth_strategy.depth_allows_split(depth) {
            find_best_split(
                self.dataset,
                self.constraints,
                &rows,
                grad_hess,
                &stats,
                &self.params.gain,
                self.parallelism,
            )
        } else {
            None
        };
        Candidate {
            node,
            rows,
            depth,
            stats,
            split,
        }
    }

    /// Index of the next candidate to expand, if any.
    fn next_expansion(&self, frontier: &[Candidate], n_leaves: usize) -> Option<usize> {
        let splittable = frontier
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.split.as_ref().map(|s| (i, c, s)));

        match self.params.growth_strategy {
            GrowthStrategy::DepthWise { .. } => splittable
                .min_by_key(|(_, c, _)| (c.depth, c.node))
                .map(|(i, _, _)| i),
            GrowthStrategy::LeafWise { max_leaves, .. } => {
                if n_leaves >= max_leaves as usize {
                    return None;
                }
                splittable
                    .max_by(|(_, a, sa), (_, b, sb)| {
                        sa.gain
                            .total_cmp(&sb.gain)
                            .then_with(|| b.node.cmp(&a.node))
                    })
                    .map(|(i, _, _)| i)
            }
        }
    }

    /// Grow one tree from per-row gradients.
    ///
    /// Leaf values are the bound-clamped Newton weights scaled by the
    /// learning rate.
    pub fn grow(&self, grad_hess: &[GradsTuple]) -> Tree {
        let rows: Vec<u32> = (0..self.dataset.n_rows() as u32).collect();
        let stats = NodeStats::from_rows(&rows, grad_hess, MonotonicBounds::unbounded());

        let mut tree = Tree::default();
        let root = tree.push_leaf(0.0, stats.sum_hess as f32);
        let mut frontier = vec![self.candidate(root, rows, 0, stats, grad_hess)];
        let mut n_leaves = 1usize;

        while let Some(idx) = self.next_expansion(&frontier, n_leaves) {
            let Candidate {
                node,
                rows,
                depth,
                stats,
                split,
            } = frontier.swap_remove(idx);
            let Some(split) = split else { continue };

            let column = self.dataset.feature_column(split.feature);
            let (left_rows, right_rows): (Vec<u32>, Vec<u32>) = rows
                .iter()
                .partition(|&&r| column[r as usize] <= split.threshold);

            let constraint = self
                .constraints
                .get(split.feature)
                .copied()
                .unwrap_or_default();
            let mid = 0.5 * (split.weight_left + split.weight_right);
            let (left_bounds, right_bounds) = stats.bounds.child_bounds(constraint, mid);

            let left = tree.push_leaf(0.0, split.hess_left as f32);
            let right = tree.push_leaf(0.0, split.hess_right as f32);
            tree.set_split(
                node,
                split.feature as u32,
                split.threshold,
                left,
                right,
                split.gain as f32,
            );

            let left_stats = NodeStats {
                sum_grad: split.grad_left,
                sum_hess: split.hess_left,
                bounds: left_bounds,
            };
            let right_stats = NodeStats {
                sum_grad: split.grad_right,
                sum_hess: split.hess_right,
                bounds: right_bounds,
            };
            frontier.push(self.candidate(left, left_rows, depth + 1, left_stats, grad_hess));
            frontier.push(self.candidate(right, right_rows, depth + 1, right_stats, grad_hess));
            n_leaves += 1;
        }

        let lr = self.params.learning_rate as f64;
        for candidate in &frontier {
            let weight = candidate.stats.weight(&self.params.gain);
            tree.set_leaf_value(candidate.node, (weight * lr) as f32);
        }
        tree
    }
}
