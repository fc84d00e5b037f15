//! Risk engine module
//!
//! Training and inference around the Random Forest, risk levels, reason
//! ranking and model persistence.

mod artifact;
mod explain;
mod risk;
mod risk_engine;

pub use artifact::{ModelStore, TrainedModel};
pub use explain::{
    factor_label, importance_reasons, rank_reasons, rule_reasons, top_reasons, FeatureImportance,
    Impact, Reason, IMPORTANCE_THRESHOLD, MAX_REASONS, TOP_FEATURES,
};
pub use risk::{RiskLevel, RiskResult};
pub use risk_engine::{ModelInfo, RiskEngine, TrainingReport};
