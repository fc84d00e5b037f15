//! Dataset structure for machine learning

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Dataset for machine learning with features and binary labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target labels (0.0 or 1.0)
    pub labels: Vec<f64>,
    /// Feature names
    pub feature_names: Vec<String>,
}

/// Train/test split result
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// Create a new empty dataset
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
        }
    }

    /// Create dataset from raw data
    pub fn from_data(
        features: Vec<Vec<f64>>,
        labels: Vec<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::InvalidValue {
                field: "labels".to_string(),
                value: format!("{} labels for {} samples", labels.len(), features.len()),
            });
        }
        if let Some(row) = features.iter().find(|row| row.len() != feature_names.len()) {
            return Err(Error::FeatureMismatch {
                expected: feature_names,
                found: (0..row.len()).map(|i| format!("column_{}", i)).collect(),
            });
        }

        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add a sample
    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) {
        assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
    }

    /// Count of (negative, positive) labels
    pub fn class_counts(&self) -> (usize, usize) {
        let positive = self.labels.iter().filter(|&&l| l > 0.5).count();
        (self.labels.len() - positive, positive)
    }

    /// Random shuffle split with a fixed seed.
    ///
    /// The test share is rounded up, so any non-zero ratio on a dataset of two or
    /// more samples holds out at least one sample.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Split {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = ((test_ratio * n as f64).ceil() as usize).min(n.saturating_sub(1));
        let (test_indices, train_indices) = indices.split_at(test_size);

        let train = self.subset(train_indices);
        let test = self.subset(test_indices);

        Split { train, test }
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Bootstrap sample (random sample with replacement)
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        self.subset(&indices)
    }
}
