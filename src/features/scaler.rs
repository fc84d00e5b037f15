//! Z-score standardization

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature mean and standard deviation fit on a training batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a feature matrix (n_samples x n_features).
    ///
    /// Uses the population standard deviation. Constant columns get a scale of
    /// 1.0 so they standardize to zero. A column whose statistics are not
    /// finite (a field with no values in the batch) is rejected.
    pub fn fit(feature_names: Vec<String>, matrix: &Array2<f64>) -> Result<Self> {
        if matrix.ncols() != feature_names.len() {
            return Err(Error::FeatureMismatch {
                expected: feature_names,
                found: (0..matrix.ncols()).map(|i| format!("column_{}", i)).collect(),
            });
        }
        if matrix.nrows() == 0 {
            return Err(Error::EmptyBatch);
        }

        let means = matrix
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(matrix.ncols()));
        let stds = matrix.std_axis(Axis(0), 0.0).mapv(|s| if s < 1e-10 { 1.0 } else { s });

        for (j, name) in feature_names.iter().enumerate() {
            if !means[j].is_finite() || !stds[j].is_finite() {
                return Err(Error::InvalidValue {
                    field: name.clone(),
                    value: "no values in batch".to_string(),
                });
            }
        }

        Ok(Self {
            feature_names,
            means: means.to_vec(),
            stds: stds.to_vec(),
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardize a single row
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        if row.len() != self.n_features() {
            return Err(Error::FeatureMismatch {
                expected: self.feature_names.clone(),
                found: (0..row.len()).map(|i| format!("column_{}", i)).collect(),
            });
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(x, (mean, std))| (x - mean) / std)
            .collect())
    }

    /// Standardize every row of a matrix
    pub fn transform(&self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        let mut out = Array2::zeros(matrix.raw_dim());
        for (i, row) in matrix.axis_iter(Axis(0)).enumerate() {
            out.row_mut(i).assign(&self.transform_row(row)?);
        }
        Ok(out)
    }
}
