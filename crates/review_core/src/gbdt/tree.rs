//! Decision tree structures for GBDT inference
//!
//! Nodes live in a flat array with node 0 as the root. Internal nodes send
//! a row left when `value <= threshold`, right otherwise (NaN goes right).

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` index into the
/// tree's node array and `leaf` is `None`. Leaves have `feature_idx == -1`
/// and carry their value in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID, equal to its index in the tree
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    pub threshold: f64,

    /// Leaf value, already scaled by the learning rate
    pub leaf: Option<f64>,

    /// Loss reduction achieved by this split, 0 for leaves
    #[serde(default)]
    pub gain: f64,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
            gain: 0.0,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, value: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
            gain: 0.0,
        }
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree of the ensemble
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// A tree that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            nodes: vec![Node::leaf(0, value)],
        }
    }

    /// Leaf value reached by `features`.
    ///
    /// Features beyond the row length read as 0.0. A malformed tree yields
    /// 0.0; [`Tree::validate`] rejects those at load time.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        // a valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };
            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }
            let value = features
                .get(node.feature_idx as usize)
                .copied()
                .unwrap_or(0.0);
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
        0.0
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Validate tree structure
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        let len = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(v) if v.is_finite() => {}
                    Some(v) => return Err(format!("Leaf node {i} has non-finite value {v}")),
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                }
                continue;
            }
            // children always come after their parent, which rules out cycles
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child >= len {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }
            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {i} has invalid feature index: {}",
                    node.feature_idx
                ));
            }
            if node.threshold.is_nan() {
                return Err(format!("Internal node {i} has NaN threshold"));
            }
        }
        Ok(())
    }
}
