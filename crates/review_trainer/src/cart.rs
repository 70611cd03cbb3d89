//! Leaf-wise regression tree builder
//!
//! Grows one boosting tree best-first: every open leaf keeps its best
//! histogram split, and the leaf whose split reduces the loss the most is
//! expanded until `num_leaves` is reached or no leaf has a positive-gain
//! split left. Ties go to the leaf opened first, then to the lower feature
//! index and bin, so a given input always produces the same tree.

use crate::histogram::BinnedMatrix;
use review_core::gbdt::{Node, Tree};

/// Parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub num_leaves: usize,
    pub min_data_in_leaf: usize,
    pub min_sum_hessian_in_leaf: f64,
    pub lambda_l2: f64,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct SplitInfo {
    feature: usize,
    bin: usize,
    gain: f64,
}

#[derive(Debug)]
struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    sum_gradient: f64,
    sum_hessian: f64,
    split: Option<SplitInfo>,
}

#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    gradient: f64,
    hessian: f64,
    count: usize,
}

/// Builds one tree from binned data and per-row gradients.
pub struct LeafWiseBuilder<'a> {
    data: &'a BinnedMatrix,
    gradients: &'a [f64],
    hessians: &'a [f64],
    features: &'a [usize],
    config: &'a TreeConfig,
}

impl<'a> LeafWiseBuilder<'a> {
    /// `features` lists the feature indices this tree may split on.
    pub fn new(
        data: &'a BinnedMatrix,
        gradients: &'a [f64],
        hessians: &'a [f64],
        features: &'a [usize],
        config: &'a TreeConfig,
    ) -> Self {
        Self {
            data,
            gradients,
            hessians,
            features,
            config,
        }
    }

    /// Grow a tree over `rows` (the current bag).
    pub fn build(&self, rows: Vec<usize>) -> Tree {
        let mut nodes = vec![Node::leaf(0, 0.0)];
        let mut open = vec![self.open_leaf(0, rows)];

        while open.len() < self.config.num_leaves {
            let mut chosen: Option<(usize, f64)> = None;
            for (i, leaf) in open.iter().enumerate() {
                if let Some(split) = leaf.split {
                    if chosen.map_or(true, |(_, best)| split.gain > best) {
                        chosen = Some((i, split.gain));
                    }
                }
            }
            let Some((idx, _)) = chosen else {
                break;
            };

            let leaf = open.remove(idx);
            let Some(split) = leaf.split else {
                break;
            };
            let column = &self.data.columns[split.feature];
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
                .rows
                .iter()
                .partition(|&&r| usize::from(column[r]) <= split.bin);

            let left_id = nodes.len();
            let right_id = left_id + 1;
            nodes.push(Node::leaf(left_id as i32, 0.0));
            nodes.push(Node::leaf(right_id as i32, 0.0));
            nodes[leaf.node] = Node::internal(
                leaf.node as i32,
                split.feature as i32,
                self.data.bins[split.feature].threshold(split.bin),
                left_id as i32,
                right_id as i32,
            )
            .with_gain(split.gain);

            // keep children adjacent to the parent's position for tie order
            open.insert(idx, self.open_leaf(right_id, right_rows));
            open.insert(idx, self.open_leaf(left_id, left_rows));
        }

        for leaf in &open {
            let value = self.leaf_output(leaf.sum_gradient, leaf.sum_hessian);
            nodes[leaf.node] = Node::leaf(leaf.node as i32, value);
        }
        Tree::new(nodes)
    }

    fn open_leaf(&self, node: usize, rows: Vec<usize>) -> OpenLeaf {
        let sum_gradient: f64 = rows.iter().map(|&r| self.gradients[r]).sum();
        let sum_hessian: f64 = rows.iter().map(|&r| self.hessians[r]).sum();
        let split = self.find_best_split(&rows, sum_gradient, sum_hessian);
        OpenLeaf {
            node,
            rows,
            sum_gradient,
            sum_hessian,
            split,
        }
    }

    fn leaf_output(&self, sum_gradient: f64, sum_hessian: f64) -> f64 {
        let denom = sum_hessian + self.config.lambda_l2;
        if denom <= 0.0 {
            return 0.0;
        }
        -sum_gradient / denom * self.config.learning_rate
    }

    fn score(&self, g: f64, h: f64) -> Option<f64> {
        let denom = h + self.config.lambda_l2;
        (denom > 0.0).then(|| g * g / denom)
    }

    fn find_best_split(&self, rows: &[usize], sum_g: f64, sum_h: f64) -> Option<SplitInfo> {
        let min_data = self.config.min_data_in_leaf;
        let min_hess = self.config.min_sum_hessian_in_leaf;
        if rows.len() < 2 * min_data {
            return None;
        }
        let parent = self.score(sum_g, sum_h)?;
        let mut best: Option<SplitInfo> = None;

        for &feature in self.features {
            let num_bins = self.data.bins[feature].num_bins();
            if num_bins < 2 {
                continue;
            }
            let column = &self.data.columns[feature];
            let mut hist = vec![BinStats::default(); num_bins];
            for &r in rows {
                let slot = &mut hist[usize::from(column[r])];
                slot.gradient += self.gradients[r];
                slot.hessian += self.hessians[r];
                slot.count += 1;
            }

            let mut left = BinStats::default();
            for (bin, stats) in hist.iter().enumerate().take(num_bins - 1) {
                left.gradient += stats.gradient;
                left.hessian += stats.hessian;
                left.count += stats.count;

                let right_count = rows.len() - left.count;
                if left.count < min_data || right_count < min_data {
                    continue;
                }
                let right_g = sum_g - left.gradient;
                let right_h = sum_h - left.hessian;
                if left.hessian < min_hess || right_h < min_hess {
                    continue;
                }
                let (Some(l), Some(r)) = (
                    self.score(left.gradient, left.hessian),
                    self.score(right_g, right_h),
                ) else {
                    continue;
                };
                let gain = l + r - parent;
                if gain > best.map_or(0.0, |b| b.gain) {
                    best = Some(SplitInfo { feature, bin, gain });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_leaves: usize, min_data: usize) -> TreeConfig {
        TreeConfig {
            num_leaves,
            min_data_in_leaf: min_data,
            min_sum_hessian_in_leaf: 1e-3,
            lambda_l2: 0.0,
            learning_rate: 1.0,
        }
    }

    /// Feature 0 separates the gradients perfectly, feature 1 is noise.
    fn fixture() -> (BinnedMatrix, Vec<f64>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let gradients: Vec<f64> = (0..40).map(|i| if i < 20 { 0.5 } else { -0.5 }).collect();
        let hessians = vec![0.25; 40];
        (BinnedMatrix::from_rows(&rows, 2, 255), gradients, hessians)
    }

    #[test]
    fn test_finds_separating_split() {
        let (data, g, h) = fixture();
        let cfg = config(2, 5);
        let features = [0, 1];
        let tree = LeafWiseBuilder::new(&data, &g, &h, &features, &cfg).build((0..40).collect());

        assert_eq!(tree.nodes.len(), 3);
        let root = &tree.nodes[0];
        assert_eq!(root.feature_idx, 0);
        assert_eq!(root.threshold, 19.5);
        assert!(root.gain > 0.0);
        // left rows have positive gradient, so a negative output
        assert!((tree.evaluate(&[3.0, 0.0]) + 2.0).abs() < 1e-12);
        assert!((tree.evaluate(&[30.0, 0.0]) - 2.0).abs() < 1e-12);
        assert!(tree.validate(2).is_ok());
    }

    #[test]
    fn test_respects_num_leaves_and_min_data() {
        let (data, g, h) = fixture();
        let features = [0, 1];

        let cfg = config(4, 5);
        let tree = LeafWiseBuilder::new(&data, &g, &h, &features, &cfg).build((0..40).collect());
        assert!(tree.num_leaves() <= 4);

        let cfg = config(31, 25);
        let tree = LeafWiseBuilder::new(&data, &g, &h, &features, &cfg).build((0..40).collect());
        assert_eq!(tree.num_leaves(), 1);
    }

    #[test]
    fn test_feature_subset_is_honoured() {
        let (data, g, h) = fixture();
        let cfg = config(8, 2);
        let features = [1];
        let tree = LeafWiseBuilder::new(&data, &g, &h, &features, &cfg).build((0..40).collect());
        assert!(tree
            .nodes
            .iter()
            .filter(|n| !n.is_leaf())
            .all(|n| n.feature_idx == 1));
    }

    #[test]
    fn test_zero_gradients_give_single_leaf() {
        let (data, _, h) = fixture();
        let g = vec![0.0; 40];
        let cfg = config(31, 1);
        let features = [0, 1];
        let tree = LeafWiseBuilder::new(&data, &g, &h, &features, &cfg).build((0..40).collect());
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.evaluate(&[1.0, 1.0]), 0.0);
    }
}
