//! Feature engineering module
//!
//! Median imputation, interaction ratios and z-score standardization.

mod builder;
mod scaler;

pub use builder::{
    batch_median, build_matrix, derive_features, feature_names, median, FeatureBuilder,
    Preprocessed, FEATURE_NAMES, N_FEATURES,
};
pub use scaler::StandardScaler;
