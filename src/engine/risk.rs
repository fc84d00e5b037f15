//! Risk levels and prediction results

use super::explain::Reason;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk bucket derived from the dropout probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Lowest score classified as High
    pub const HIGH_THRESHOLD: f64 = 0.7;
    /// Lowest score classified as Medium
    pub const MEDIUM_THRESHOLD: f64 = 0.4;

    /// Bucket a probability; both thresholds are inclusive lower bounds
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored and explained prediction for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Probability of dropping out, in [0, 1]
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// At most three reasons, unique by factor
    pub top_reasons: Vec<Reason>,
}

impl RiskResult {
    pub fn new(risk_score: f64, top_reasons: Vec<Reason>) -> Self {
        Self {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            top_reasons,
        }
    }
}
