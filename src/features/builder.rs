//! Feature builder
//!
//! Turns raw student records into fixed-order, standardized feature vectors.

use super::scaler::StandardScaler;
use crate::data::{Dataset, RawField, StudentRecord, LABEL_FIELD};
use crate::error::{Error, Result};
use ndarray::Array2;
use tracing::debug;

/// Feature order shared by training and inference
pub const FEATURE_NAMES: [&str; 7] = [
    "attendance",
    "cgpa",
    "backlogs",
    "assignments_submitted",
    "pending_fee_ratio",
    "attendance_cgpa_ratio",
    "backlogs_assignments_ratio",
];

/// Number of model features
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Feature names as owned strings
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Output of preprocessing a batch
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Standardized features (n_records x 7)
    pub features: Array2<f64>,
    /// Raw 0/1 labels, present when the batch is labelled
    pub labels: Option<Vec<u8>>,
}

impl Preprocessed {
    /// Feature rows as plain vectors
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.features.outer_iter().map(|row| row.to_vec()).collect()
    }

    /// Convert into a labelled dataset for the classifier
    pub fn into_dataset(self) -> Result<Dataset> {
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| Error::Schema(LABEL_FIELD.to_string()))?
            .iter()
            .map(|&l| f64::from(l))
            .collect();
        Dataset::from_data(self.rows(), labels, feature_names())
    }
}

/// Feature builder holding the standardization fit
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    scaler: Option<StandardScaler>,
}

impl FeatureBuilder {
    /// Create an unfitted builder
    pub fn new() -> Self {
        Self { scaler: None }
    }

    /// Create a builder from previously fitted statistics
    pub fn with_scaler(scaler: StandardScaler) -> Self {
        Self {
            scaler: Some(scaler),
        }
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn into_scaler(self) -> Option<StandardScaler> {
        self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.scaler.is_some()
    }

    /// Impute, derive ratio features and standardize a batch.
    ///
    /// With `fit` the standardization statistics are recomputed from this batch,
    /// replacing any earlier fit. Without it the stored statistics are reused.
    pub fn preprocess(&mut self, batch: &[StudentRecord], fit: bool) -> Result<Preprocessed> {
        if batch.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let labels = collect_labels(batch)?;
        let raw = build_matrix(batch);

        if fit {
            self.scaler = Some(StandardScaler::fit(feature_names(), &raw)?);
            debug!("Fitted standardization on {} records", batch.len());
        }

        let scaler = self.scaler.as_ref().ok_or_else(|| {
            Error::ModelNotTrained("standardization statistics have not been fit".to_string())
        })?;

        let names = scaler.feature_names().iter().map(String::as_str);
        if names.ne(FEATURE_NAMES.iter().copied()) {
            return Err(Error::FeatureMismatch {
                expected: feature_names(),
                found: scaler.feature_names().to_vec(),
            });
        }

        Ok(Preprocessed {
            features: scaler.transform(&raw)?,
            labels,
        })
    }
}

/// Unstandardized feature matrix after imputation and ratio derivation
pub fn build_matrix(batch: &[StudentRecord]) -> Array2<f64> {
    let medians: Vec<f64> = RawField::ALL
        .iter()
        .map(|&field| batch_median(batch, field))
        .collect();

    let mut matrix = Array2::zeros((batch.len(), N_FEATURES));
    for (i, record) in batch.iter().enumerate() {
        let mut raw = [0.0; 5];
        for (j, &field) in RawField::ALL.iter().enumerate() {
            raw[j] = record.value(field).unwrap_or(medians[j]);
        }
        for (j, value) in derive_features(raw).into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    matrix
}

/// Append the two interaction ratios to the raw values
pub fn derive_features(raw: [f64; 5]) -> [f64; N_FEATURES] {
    let [attendance, cgpa, backlogs, assignments, fee_ratio] = raw;
    [
        attendance,
        cgpa,
        backlogs,
        assignments,
        fee_ratio,
        attendance / (cgpa + 1.0),
        backlogs / (assignments + 1.0),
    ]
}

/// Median of the present values of a field; NaN when none are present
pub fn batch_median(batch: &[StudentRecord], field: RawField) -> f64 {
    let mut values: Vec<f64> = batch.iter().filter_map(|r| r.value(field)).collect();
    median(&mut values)
}

/// Median of a slice (mean of the middle pair for even lengths)
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn collect_labels(batch: &[StudentRecord]) -> Result<Option<Vec<u8>>> {
    let labelled = batch.iter().filter(|r| r.dropout.is_some()).count();
    if labelled == 0 {
        return Ok(None);
    }
    if labelled != batch.len() {
        return Err(Error::Schema(LABEL_FIELD.to_string()));
    }
    Ok(Some(batch.iter().filter_map(|r| r.dropout).collect()))
}
