//! Tree and forest representation.
//!
//! Trees are stored structure-of-arrays: node `i` is described by the
//! `i`-th entry of every vector. Node 0 is the root.

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::EngineError;
use crate::utils::Parallelism;

pub type NodeId = u32;

// ============================================================================
// Tree
// ============================================================================

/// Immutable regression tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    split_feature: Vec<u32>,
    threshold: Vec<f32>,
    left: Vec<NodeId>,
    right: Vec<NodeId>,
    is_leaf: Vec<bool>,
    leaf_value: Vec<f32>,
    gain: Vec<f32>,
    cover: Vec<f32>,
}

impl Tree {
    /// Append a leaf node and return its id.
    pub(crate) fn push_leaf(&mut self, value: f32, cover: f32) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_feature.push(0);
        self.threshold.push(0.0);
        self.left.push(0);
        self.right.push(0);
        self.is_leaf.push(true);
        self.leaf_value.push(value);
        self.gain.push(0.0);
        self.cover.push(cover);
        id
    }

    /// Turn a leaf into a numeric split.
    pub(crate) fn set_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        left: NodeId,
        right: NodeId,
        gain: f32,
    ) {
        let i = node as usize;
        self.split_feature[i] = feature;
        self.threshold[i] = threshold;
        self.left[i] = left;
        self.right[i] = right;
        self.is_leaf[i] = false;
        self.leaf_value[i] = 0.0;
        self.gain[i] = gain;
    }

    pub(crate) fn set_leaf_value(&mut self, node: NodeId, value: f32) {
        self.leaf_value[node as usize] = value;
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_feature(&self, node: NodeId) -> u32 {
        self.split_feature[node as usize]
    }

    #[inline]
    pub fn threshold(&self, node: NodeId) -> f32 {
        self.threshold[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_value[node as usize]
    }

    pub fn gain(&self, node: NodeId) -> f32 {
        self.gain[node as usize]
    }

    /// Sum of hessians that reached the node during training.
    pub fn cover(&self, node: NodeId) -> f32 {
        self.cover[node as usize]
    }

    /// Total gain of all splits in the tree.
    pub fn split_gain(&self) -> f32 {
        (0..self.n_nodes() as NodeId)
            .filter(|&node| !self.is_leaf(node))
            .map(|node| self.gain(node))
            .sum()
    }

    /// Leaf reached by `row`.
    #[inline]
    pub fn leaf_for(&self, row: ArrayView1<'_, f32>) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let i = node as usize;
            node = if row[self.split_feature[i] as usize] <= self.threshold[i] {
                self.left[i]
            } else {
                self.right[i]
            };
        }
        node
    }

    #[inline]
    pub fn predict_row(&self, row: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.leaf_for(row))
    }

    /// Iterator over leaf values.
    pub fn leaf_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.is_leaf
            .iter()
            .zip(self.leaf_value.iter())
            .filter(|(&leaf, _)| leaf)
            .map(|(_, &v)| v)
    }
}

// ============================================================================
// Forest
// ============================================================================

/// Additive ensemble of trees plus a constant base score.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    base_score: f32,
    n_features: usize,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn new(base_score: f32, n_features: usize) -> Self {
        Self {
            base_score,
            n_features,
            trees: Vec::new(),
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    #[inline]
    pub fn predict_row(&self, row: ArrayView1<'_, f32>) -> f32 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.predict_row(row))
    }

    /// Predict every row of a `[n_rows, n_features]` matrix.
    ///
    /// # Errors
    ///
    /// [`EngineError::FeatureMismatch`] if the column count differs from the
    /// training data.
    pub fn predict(
        &self,
        features: ArrayView2<'_, f32>,
        parallelism: Parallelism,
    ) -> Result<Array1<f32>, EngineError> {
        if features.ncols() != self.n_features {
            return Err(EngineError::FeatureMismatch {
                expected: self.n_features,
                got: features.ncols(),
            });
        }
        let mut out = vec![0.0f32; features.nrows()];
        parallelism.maybe_par_for_each_mut(&mut out, |i, pred| {
            *pred = self.predict_row(features.row(i));
        });
        Ok(Array1::from(out))
    }
}
