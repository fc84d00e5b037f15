//! Decision Tree classifier

use crate::data::Dataset;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index for split
    pub feature_idx: Option<usize>,
    /// Threshold for split
    pub threshold: Option<f64>,
    /// Positive-class frequency among the node's samples
    pub positive_rate: f64,
    /// Number of samples in this node
    pub n_samples: usize,
    /// Left child (feature <= threshold)
    pub left: Option<Box<TreeNode>>,
    /// Right child
    pub right: Option<Box<TreeNode>>,
    /// Gini impurity at this node
    pub impurity: f64,
}

impl TreeNode {
    fn leaf(positive_rate: f64, n_samples: usize, impurity: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            positive_rate,
            n_samples,
            left: None,
            right: None,
            impurity,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn depth(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            1 + self
                .left
                .as_ref()
                .map(|n| n.depth())
                .unwrap_or(0)
                .max(self.right.as_ref().map(|n| n.depth()).unwrap_or(0))
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Binary Decision Tree classifier using Gini impurity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the decision tree
    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        self.feature_importances = vec![0.0; n_features];

        if dataset.is_empty() {
            self.root = None;
            return;
        }

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        self.root = Some(self.build_tree(dataset, &indices, 0, &mut rng));

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Build tree recursively
    fn build_tree(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let n_positive = count_positive(dataset, indices);
        let impurity = gini(n_positive, n);
        let positive_rate = n_positive as f64 / n as f64;

        // Check stopping conditions
        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || impurity < 1e-10
        {
            return TreeNode::leaf(positive_rate, n, impurity);
        }

        let Some(split) = self.find_best_split(dataset, indices, impurity, rng) else {
            return TreeNode::leaf(positive_rate, n, impurity);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| dataset.features[i][split.feature_idx] <= split.threshold);

        // Impurity decrease weighted by node size
        self.feature_importances[split.feature_idx] += split.gain * n as f64;

        let left = self.build_tree(dataset, &left_indices, depth + 1, rng);
        let right = self.build_tree(dataset, &right_indices, depth + 1, rng);

        TreeNode {
            feature_idx: Some(split.feature_idx),
            threshold: Some(split.threshold),
            positive_rate,
            n_samples: n,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            impurity,
        }
    }

    /// Find the best split by sweeping each candidate feature in sorted order
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = dataset.n_features();
        let max_features = self.config.max_features.unwrap_or(n_features).max(1);
        let min_leaf = self.config.min_samples_leaf.max(1);

        // Select features to consider
        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let n = indices.len();
        let total_positive = count_positive(dataset, indices);

        let mut best: Option<SplitCandidate> = None;
        let mut best_gain = 0.0;
        let mut order = indices.to_vec();

        for &feature_idx in &feature_indices {
            let value = |i: usize| dataset.features[i][feature_idx];
            order.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

            let mut left_positive = 0;
            for k in 0..n - 1 {
                if dataset.labels[order[k]] > 0.5 {
                    left_positive += 1;
                }

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let (lo, hi) = (value(order[k]), value(order[k + 1]));
                // Only split between distinct values; NaN compares false and never splits
                if !(lo < hi) {
                    continue;
                }

                let weighted = (n_left as f64 * gini(left_positive, n_left)
                    + n_right as f64 * gini(total_positive - left_positive, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    let mid = (lo + hi) / 2.0;
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: if mid < hi { mid } else { lo },
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Positive-class probability for a single sample
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0.5,
        };

        loop {
            match (node.feature_idx, node.threshold, &node.left, &node.right) {
                (Some(feature_idx), Some(threshold), Some(left), Some(right)) => {
                    node = if features[feature_idx] <= threshold {
                        left
                    } else {
                        right
                    };
                }
                _ => return node.positive_rate,
            }
        }
    }

    /// Predicted class (0.0 or 1.0) for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.predict_proba_one(features) > 0.5 {
            1.0
        } else {
            0.0
        }
    }

    /// Predict classes for multiple samples
    pub fn predict(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .features
            .iter()
            .map(|f| self.predict_one(f))
            .collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Depth of the fitted tree (0 when unfitted)
    pub fn depth(&self) -> usize {
        self.root.as_ref().map(|r| r.depth()).unwrap_or(0)
    }

    /// Calculate accuracy
    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let predictions = self.predict(dataset);
        let correct = predictions
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(&pred, &label)| (pred > 0.5) == (label > 0.5))
            .count();

        correct as f64 / dataset.n_samples() as f64
    }
}

fn count_positive(dataset: &Dataset, indices: &[usize]) -> usize {
    indices.iter().filter(|&&i| dataset.labels[i] > 0.5).count()
}

/// Binary Gini impurity from a positive count
fn gini(n_positive: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = n_positive as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..100 {
            let x = i as f64 / 10.0;
            let y = if x > 5.0 { 1.0 } else { 0.0 };
            dataset.add_sample(vec![x], y);
        }
        dataset
    }

    #[test]
    fn test_decision_tree_classification() {
        let dataset = step_dataset();

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&dataset);

        assert_eq!(tree.accuracy(&dataset), 1.0);
        assert_eq!(tree.predict_proba_one(&[9.0]), 1.0);
        assert_eq!(tree.predict_proba_one(&[1.0]), 0.0);
        // A single clean split suffices
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_threshold_between_classes() {
        let dataset = step_dataset();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&dataset);

        let threshold = tree.root().and_then(|r| r.threshold).unwrap();
        assert!(threshold > 5.0 && threshold < 5.1);
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        let mut dataset = Dataset::new(vec!["noise".to_string(), "signal".to_string()]);
        for i in 0..200 {
            let noise = ((i * 7919) % 97) as f64;
            let signal = i as f64;
            dataset.add_sample(vec![noise, signal], if i >= 100 { 1.0 } else { 0.0 });
        }

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&dataset);

        let importances = tree.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[1] > importances[0]);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..10 {
            dataset.add_sample(vec![i as f64], 1.0);
        }

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&dataset);

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_proba_one(&[3.0]), 1.0);
        assert!(tree.feature_importances().iter().all(|&i| i == 0.0));
    }

    #[test]
    fn test_unfitted_tree() {
        let tree = DecisionTree::new(TreeConfig::default());
        assert_eq!(tree.predict_proba_one(&[1.0]), 0.5);
        assert_eq!(tree.depth(), 0);
    }
}
