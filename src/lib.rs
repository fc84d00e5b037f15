//! # Dropout Risk - Student Dropout Prediction
//!
//! This library scores a student's likelihood of dropping out with a Random
//! Forest classifier and explains each score with ranked, human-readable reasons.
//!
//! ## Modules
//!
//! - `data` - Student records, record loading and the synthetic generator
//! - `features` - Median imputation, ratio features and standardization
//! - `models` - Decision Tree and Random Forest classifiers, evaluation metrics
//! - `engine` - Risk engine: training, inference, risk levels and reasons
//! - `config` - Engine configuration
//! - `error` - Error types

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;

pub use config::Config;
pub use data::StudentRecord;
pub use engine::{Reason, RiskEngine, RiskLevel, RiskResult};
pub use error::{Error, Result};
pub use features::FeatureBuilder;
pub use models::RandomForest;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, EngineConfig};
    pub use crate::data::{generate_sample_data, Dataset, RecordLoader, StudentRecord};
    pub use crate::engine::{
        FeatureImportance, Impact, ModelStore, Reason, RiskEngine, RiskLevel, RiskResult,
        TrainingReport,
    };
    pub use crate::error::{Error, Result};
    pub use crate::features::{FeatureBuilder, StandardScaler, FEATURE_NAMES};
    pub use crate::models::{ClassificationReport, DecisionTree, ForestConfig, RandomForest};
}
