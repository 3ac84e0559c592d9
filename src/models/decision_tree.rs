use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::datasets::assembly::FeatureMatrix;

#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    feature_index: Option<usize>,
    threshold: Option<f64>,
    positive_fraction: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(positive_fraction: f64) -> Self {
        Self {
            feature_index: None,
            threshold: None,
            positive_fraction,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Binary gini classification tree. Only ever driven by the forest, which
/// hands it a bootstrap sample of row indices.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    pub fn fit(&mut self, features: &FeatureMatrix, labels: &[f64], indices: &[usize]) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(features, labels, indices, 0, &mut rng));
    }

    fn build_tree(&self,
                  features: &FeatureMatrix,
                  labels: &[f64],
                  indices: &[usize],
                  depth: usize,
                  rng: &mut ChaCha8Rng) -> TreeNode
    {
        let impurity = gini(labels, indices);
        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return TreeNode::leaf(positive_fraction(labels, indices));
        }

        let Some((feature_index, threshold, left_indices, right_indices)) =
            self.find_best_split(features, labels, indices, impurity, rng)
        else {
            return TreeNode::leaf(positive_fraction(labels, indices));
        };

        if left_indices.len() < self.config.min_samples_leaf
            || right_indices.len() < self.config.min_samples_leaf
        {
            return TreeNode::leaf(positive_fraction(labels, indices));
        }

        let left = self.build_tree(features, labels, &left_indices, depth + 1, rng);
        let right = self.build_tree(features, labels, &right_indices, depth + 1, rng);
        TreeNode {
            feature_index: Some(feature_index),
            threshold: Some(threshold),
            positive_fraction: positive_fraction(labels, indices),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    fn find_best_split(&self,
                       features: &FeatureMatrix,
                       labels: &[f64],
                       indices: &[usize],
                       parent_impurity: f64,
                       rng: &mut ChaCha8Rng)
        -> Option<(usize, f64, Vec<usize>, Vec<usize>)>
    {
        let n_features = features.n_columns();
        let max_features = self.config.max_features.unwrap_or(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best_split = None;

        for &feature_index in &feature_indices {
            let mut values: Vec<f64> = indices.iter()
                .map(|&i| features.row(i)[feature_index])
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;
                let (left, right): (Vec<usize>, Vec<usize>) = indices.iter()
                    .partition(|&&i| features.row(i)[feature_index] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * gini(labels, &left) + n_right * gini(labels, &right))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature_index, threshold, left, right));
                }
            }
        }

        best_split
    }

    /// Positive-class frequency of the leaf this row falls into;
    /// 0.5 before `fit`.
    pub fn predict_proba_one(&self, row: &[f64]) -> f64 {
        let Some(root) = &self.root else {
            return 0.5;
        };
        let mut node = root;
        while !node.is_leaf() {
            let feature_index = node.feature_index.expect("split node without feature");
            let threshold = node.threshold.expect("split node without threshold");
            node = if row[feature_index] <= threshold {
                node.left.as_ref().expect("split node without left child")
            } else {
                node.right.as_ref().expect("split node without right child")
            };
        }
        node.positive_fraction
    }
}

fn positive_fraction(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.5;
    }
    let positives = indices.iter().filter(|&&i| labels[i] > 0.0).count();
    positives as f64 / indices.len() as f64
}

fn gini(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let p = positive_fraction(labels, indices);
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_separates_one_dimensional_classes() {
        let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 10.0]).collect();
        let labels: Vec<f64> = (0..100).map(|i| if i > 50 { 1.0 } else { 0.0 }).collect();
        let features = FeatureMatrix::from_rows(rows, 1);
        let indices: Vec<usize> = (0..100).collect();

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&features, &labels, &indices);

        assert!(tree.predict_proba_one(&[0.5]) < 0.5);
        assert!(tree.predict_proba_one(&[9.5]) > 0.5);
    }

    #[test]
    fn unfitted_tree_predicts_even_odds() {
        let tree = DecisionTree::new(TreeConfig::default());
        assert_eq!(tree.predict_proba_one(&[1.0]), 0.5);
    }
}
