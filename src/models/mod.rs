//! Machine learning models module
//!
//! Provides Decision Tree and Random Forest classifiers and evaluation metrics.

mod decision_tree;
mod metrics;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use random_forest::{ForestConfig, RandomForest};
