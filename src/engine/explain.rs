//! Reason ranking
//!
//! Rule violations on the raw record come first, then the globally most
//! important model features. Duplicates by factor are dropped (first wins) and
//! the list is capped at three.

use crate::data::{RawField, StudentRecord};
use crate::models::RandomForest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum number of reasons in a result
pub const MAX_REASONS: usize = 3;
/// Number of top-ranked features considered for importance reasons
pub const TOP_FEATURES: usize = 3;
/// Minimum importance weight for a feature to become a reason
pub const IMPORTANCE_THRESHOLD: f64 = 0.1;

/// How strongly a reason contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::High => f.write_str("High"),
            Impact::Medium => f.write_str("Medium"),
        }
    }
}

/// Human-readable contributing factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub factor: String,
    pub description: String,
    pub impact: Impact,
}

impl Reason {
    pub fn new(factor: impl Into<String>, description: impl Into<String>, impact: Impact) -> Self {
        Self {
            factor: factor.into(),
            description: description.into(),
            impact,
        }
    }
}

/// Global per-feature importance in feature order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    entries: Vec<(String, f64)>,
}

impl FeatureImportance {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn from_forest(forest: &RandomForest) -> Self {
        Self::new(
            forest
                .feature_names()
                .iter()
                .cloned()
                .zip(forest.feature_importances().iter().copied())
                .collect(),
        )
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, w)| (n.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by descending weight; ties keep feature order
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self.iter().collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }
}

/// Ranked, deduplicated reasons for one record
pub fn top_reasons(record: &StudentRecord, importance: &FeatureImportance) -> Vec<Reason> {
    rank_reasons(
        rule_reasons(record)
            .into_iter()
            .chain(importance_reasons(importance)),
    )
}

/// Reasons from fixed thresholds on the raw record, in check order
pub fn rule_reasons(record: &StudentRecord) -> Vec<Reason> {
    let mut reasons = Vec::new();

    let attendance = record.value_or_default(RawField::Attendance);
    if attendance < 75.0 {
        reasons.push(Reason::new(
            "Low Attendance",
            format!("Attendance is below 75% ({}%)", attendance),
            Impact::High,
        ));
    }

    let cgpa = record.value_or_default(RawField::Cgpa);
    if cgpa < 2.5 {
        reasons.push(Reason::new(
            "Low Academic Performance",
            format!("CGPA is below 2.5 ({})", cgpa),
            Impact::High,
        ));
    }

    let backlogs = record.value_or_default(RawField::Backlogs);
    if backlogs > 2.0 {
        reasons.push(Reason::new(
            "Multiple Backlogs",
            format!("Student has {} backlogs", backlogs),
            Impact::Medium,
        ));
    }

    let assignments = record.value_or_default(RawField::AssignmentsSubmitted);
    if assignments < 5.0 {
        reasons.push(Reason::new(
            "Low Assignment Submission",
            format!("Only {} assignments submitted", assignments),
            Impact::Medium,
        ));
    }

    let fee_ratio = record.value_or_default(RawField::PendingFeeRatio);
    if fee_ratio > 0.3 {
        reasons.push(Reason::new(
            "High Pending Fees",
            format!("Student has {:.1}% of fees pending", fee_ratio * 100.0),
            Impact::Medium,
        ));
    }

    reasons
}

/// Reasons for the most important features above the weight threshold
pub fn importance_reasons(importance: &FeatureImportance) -> Vec<Reason> {
    importance
        .ranked()
        .into_iter()
        .take(TOP_FEATURES)
        .filter(|&(_, weight)| weight > IMPORTANCE_THRESHOLD)
        .map(|(feature, weight)| {
            Reason::new(
                factor_label(feature),
                format!(
                    "Feature '{}' has high importance ({:.2}) in prediction",
                    feature, weight
                ),
                Impact::Medium,
            )
        })
        .collect()
}

/// Drop repeated factors (first occurrence wins) and cap the list
pub fn rank_reasons(candidates: impl IntoIterator<Item = Reason>) -> Vec<Reason> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|r| seen.insert(r.factor.clone()))
        .take(MAX_REASONS)
        .collect()
}

/// "attendance_cgpa_ratio" -> "Attendance Cgpa Ratio"
pub fn factor_label(feature: &str) -> String {
    feature
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_NAMES;

    fn importance(weights: [f64; 7]) -> FeatureImportance {
        FeatureImportance::new(
            FEATURE_NAMES
                .iter()
                .zip(weights)
                .map(|(n, w)| (n.to_string(), w))
                .collect(),
        )
    }

    fn factors(reasons: &[Reason]) -> Vec<&str> {
        reasons.iter().map(|r| r.factor.as_str()).collect()
    }

    #[test]
    fn test_factor_label() {
        assert_eq!(factor_label("attendance_cgpa_ratio"), "Attendance Cgpa Ratio");
        assert_eq!(factor_label("cgpa"), "Cgpa");
    }

    #[test]
    fn test_rule_reasons_order_and_text() {
        let record = StudentRecord::new(65.0, 2.1, 3.0, 2.0, 0.4);
        let reasons = rule_reasons(&record);

        assert_eq!(
            factors(&reasons),
            vec![
                "Low Attendance",
                "Low Academic Performance",
                "Multiple Backlogs",
                "Low Assignment Submission",
                "High Pending Fees",
            ]
        );
        assert_eq!(reasons[0].description, "Attendance is below 75% (65%)");
        assert_eq!(reasons[0].impact, Impact::High);
        assert_eq!(reasons[1].description, "CGPA is below 2.5 (2.1)");
        assert_eq!(reasons[2].description, "Student has 3 backlogs");
        assert_eq!(reasons[3].description, "Only 2 assignments submitted");
        assert_eq!(reasons[4].description, "Student has 40.0% of fees pending");
        assert_eq!(reasons[4].impact, Impact::Medium);
    }

    #[test]
    fn test_rule_boundaries_are_strict() {
        let record = StudentRecord::new(75.0, 2.5, 2.0, 5.0, 0.3);
        assert!(rule_reasons(&record).is_empty());
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let record = StudentRecord::default();
        assert!(rule_reasons(&record).is_empty());
    }

    #[test]
    fn test_importance_reasons_top_three_above_threshold() {
        let weights = importance([0.30, 0.05, 0.02, 0.03, 0.08, 0.40, 0.12]);
        let reasons = importance_reasons(&weights);

        assert_eq!(
            factors(&reasons),
            vec!["Attendance Cgpa Ratio", "Attendance", "Backlogs Assignments Ratio"]
        );
        assert_eq!(
            reasons[0].description,
            "Feature 'attendance_cgpa_ratio' has high importance (0.40) in prediction"
        );
        assert!(reasons.iter().all(|r| r.impact == Impact::Medium));
    }

    #[test]
    fn test_importance_below_threshold_is_ignored() {
        let weights = importance([0.30, 0.10, 0.10, 0.10, 0.10, 0.20, 0.10]);
        let reasons = importance_reasons(&weights);
        // Third-ranked weight is exactly 0.10, which does not exceed the threshold
        assert_eq!(factors(&reasons), vec!["Attendance", "Attendance Cgpa Ratio"]);
    }

    #[test]
    fn test_rules_precede_importance() {
        let record = StudentRecord::new(60.0, 7.0, 0.0, 10.0, 0.0);
        let weights = importance([0.05, 0.05, 0.05, 0.05, 0.05, 0.60, 0.15]);

        let reasons = top_reasons(&record, &weights);
        assert_eq!(
            factors(&reasons),
            vec!["Low Attendance", "Attendance Cgpa Ratio", "Backlogs Assignments Ratio"]
        );
    }

    #[test]
    fn test_duplicate_factor_keeps_first() {
        let reasons = rank_reasons(vec![
            Reason::new("Low Attendance", "rule", Impact::High),
            Reason::new("Low Attendance", "importance", Impact::Medium),
            Reason::new("Cgpa", "importance", Impact::Medium),
        ]);

        assert_eq!(factors(&reasons), vec!["Low Attendance", "Cgpa"]);
        assert_eq!(reasons[0].description, "rule");
        assert_eq!(reasons[0].impact, Impact::High);
    }

    #[test]
    fn test_reason_cap() {
        let record = StudentRecord::new(40.0, 1.0, 8.0, 0.0, 0.9);
        let weights = importance([0.2, 0.2, 0.2, 0.1, 0.1, 0.1, 0.1]);

        let reasons = top_reasons(&record, &weights);
        assert_eq!(reasons.len(), MAX_REASONS);
        assert_eq!(
            factors(&reasons),
            vec!["Low Attendance", "Low Academic Performance", "Multiple Backlogs"]
        );
    }

    #[test]
    fn test_ranked_ties_keep_feature_order() {
        let weights = importance([0.2, 0.2, 0.1, 0.1, 0.1, 0.2, 0.1]);
        let ranked: Vec<&str> = weights.ranked().into_iter().map(|(n, _)| n).collect();
        assert_eq!(&ranked[..3], &["attendance", "cgpa", "attendance_cgpa_ratio"]);
    }
}
