//! Gradient-boosted tree classifier stage.
//!
//! Trees output raw log-odds margins; the class-1 probability is the
//! logistic transform of `base_score` plus the per-tree leaf values.
//! Missing feature values route along each split's default direction.

use serde::{Deserialize, Serialize};

use cardio_core::errors::{CardioError, CardioResult};

fn default_true() -> bool {
    true
}

/// Binary gradient-boosted tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtClassifier {
    /// Global bias in log-odds.
    pub base_score: f64,
    /// Whether the stage exposes a class-1 probability.
    #[serde(default = "default_true")]
    pub probability: bool,
    pub trees: Vec<Tree>,
}

/// One regression tree, nodes stored flat, root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        /// Index into the expanded feature space.
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Where a missing (NaN) value routes.
        #[serde(default)]
        default_left: bool,
        /// Training-time sample weight reaching this node.
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

impl Tree {
    /// Child index taken by `x` at a split node.
    pub fn route(&self, node: &TreeNode, x: &[f64]) -> CardioResult<usize> {
        match node {
            TreeNode::Leaf { .. } => Err(CardioError::inference("route called on a leaf")),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                default_left,
                ..
            } => {
                let value = *x.get(*feature).ok_or_else(|| {
                    CardioError::inference(format!(
                        "split references feature {feature} but input has {} columns",
                        x.len()
                    ))
                })?;
                Ok(if value.is_nan() {
                    if *default_left {
                        *left
                    } else {
                        *right
                    }
                } else if value < *threshold {
                    *left
                } else {
                    *right
                })
            }
        }
    }

    /// Leaf value reached by `x`.
    pub fn leaf_score(&self, x: &[f64]) -> CardioResult<f64> {
        let mut idx = 0usize;
        // A well-formed tree never revisits a node; nodes.len() steps is a
        // hard upper bound, beyond which the node links must be cyclic.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| CardioError::inference(format!("node index {idx} out of range")))?;
            match node {
                TreeNode::Leaf { value, .. } => return Ok(*value),
                TreeNode::Split { .. } => idx = self.route(node, x)?,
            }
        }
        Err(CardioError::inference("malformed tree: cyclic node links"))
    }
}

impl GbdtClassifier {
    /// Structural sanity of node links. Returns a message on the first
    /// inconsistency.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split { left, right, .. } = node {
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(format!("tree {t} node {i} links out of range"));
                    }
                    if *left <= i || *right <= i {
                        return Err(format!("tree {t} node {i} links do not descend"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw log-odds margin for one expanded-space row.
    pub fn margin(&self, x: &[f64]) -> CardioResult<f64> {
        let mut m = self.base_score;
        for tree in &self.trees {
            m += tree.leaf_score(x)?;
        }
        Ok(m)
    }

    /// Class-1 probability, when the stage supports it.
    pub fn predict_proba(&self, x: &[f64]) -> CardioResult<Option<f64>> {
        if !self.probability {
            return Ok(None);
        }
        Ok(Some(sigmoid(self.margin(x)?)))
    }

    /// Discrete class: 1 when the margin is non-negative.
    pub fn predict(&self, x: &[f64]) -> CardioResult<i64> {
        Ok(if self.margin(x)? >= 0.0 { 1 } else { 0 })
    }
}

/// Logistic transform with saturation guards: very negative inputs return
/// exactly 0.0 and very positive exactly 1.0 instead of overflowing.
pub fn sigmoid(x: f64) -> f64 {
    if x <= -500.0 {
        0.0
    } else if x >= 500.0 {
        1.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}
