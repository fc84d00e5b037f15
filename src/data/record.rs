//! Student record types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the training label field
pub const LABEL_FIELD: &str = "dropout";

/// Raw academic signals carried by a student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawField {
    /// Attendance percentage (0-100)
    Attendance,
    /// Cumulative grade point average (0-10)
    Cgpa,
    /// Number of failed courses not yet cleared
    Backlogs,
    /// Number of assignments handed in
    AssignmentsSubmitted,
    /// Share of fees still outstanding (0.0-1.0)
    PendingFeeRatio,
}

impl RawField {
    /// All raw fields in feature order
    pub const ALL: [RawField; 5] = [
        RawField::Attendance,
        RawField::Cgpa,
        RawField::Backlogs,
        RawField::AssignmentsSubmitted,
        RawField::PendingFeeRatio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RawField::Attendance => "attendance",
            RawField::Cgpa => "cgpa",
            RawField::Backlogs => "backlogs",
            RawField::AssignmentsSubmitted => "assignments_submitted",
            RawField::PendingFeeRatio => "pending_fee_ratio",
        }
    }

    /// Value assumed by the reason rules when the record has none
    pub fn rule_default(&self) -> f64 {
        match self {
            RawField::Attendance => 100.0,
            RawField::Cgpa => 4.0,
            RawField::Backlogs => 0.0,
            RawField::AssignmentsSubmitted => 10.0,
            RawField::PendingFeeRatio => 0.0,
        }
    }
}

/// One student's academic signals.
///
/// `None` (or NaN) marks a missing value, which preprocessing imputes with the
/// batch median. Structurally absent fields are rejected when parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub attendance: Option<f64>,
    pub cgpa: Option<f64>,
    pub backlogs: Option<f64>,
    pub assignments_submitted: Option<f64>,
    pub pending_fee_ratio: Option<f64>,
    /// Training label: 1 = dropped out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropout: Option<u8>,
}

impl StudentRecord {
    /// Create a record with every value present
    pub fn new(
        attendance: f64,
        cgpa: f64,
        backlogs: f64,
        assignments_submitted: f64,
        pending_fee_ratio: f64,
    ) -> Self {
        Self {
            attendance: Some(attendance),
            cgpa: Some(cgpa),
            backlogs: Some(backlogs),
            assignments_submitted: Some(assignments_submitted),
            pending_fee_ratio: Some(pending_fee_ratio),
            dropout: None,
        }
    }

    /// Attach a training label
    pub fn with_dropout(mut self, label: u8) -> Self {
        self.dropout = Some(label);
        self
    }

    /// Present value of a field, treating NaN as missing
    pub fn value(&self, field: RawField) -> Option<f64> {
        let value = match field {
            RawField::Attendance => self.attendance,
            RawField::Cgpa => self.cgpa,
            RawField::Backlogs => self.backlogs,
            RawField::AssignmentsSubmitted => self.assignments_submitted,
            RawField::PendingFeeRatio => self.pending_fee_ratio,
        };
        value.filter(|v| !v.is_nan())
    }

    pub fn set_value(&mut self, field: RawField, value: Option<f64>) {
        let slot = match field {
            RawField::Attendance => &mut self.attendance,
            RawField::Cgpa => &mut self.cgpa,
            RawField::Backlogs => &mut self.backlogs,
            RawField::AssignmentsSubmitted => &mut self.assignments_submitted,
            RawField::PendingFeeRatio => &mut self.pending_fee_ratio,
        };
        *slot = value;
    }

    /// Value of a field, or the rule default when missing
    pub fn value_or_default(&self, field: RawField) -> f64 {
        self.value(field).unwrap_or_else(|| field.rule_default())
    }

    /// Parse a JSON object.
    ///
    /// Every raw field key must exist; a `null` value is a missing value. The
    /// `dropout` key is optional.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidValue {
            field: "record".to_string(),
            value: value.to_string(),
        })?;

        let mut record = StudentRecord::default();
        for field in RawField::ALL {
            let raw = object
                .get(field.name())
                .ok_or_else(|| Error::Schema(field.name().to_string()))?;
            record.set_value(field, json_number(field.name(), raw)?);
        }

        if let Some(raw) = object.get(LABEL_FIELD) {
            record.dropout = json_number(LABEL_FIELD, raw)?
                .map(parse_label)
                .transpose()?;
        }

        Ok(record)
    }
}

fn json_number(field: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(Error::InvalidValue {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Convert a numeric label into a class index
pub fn parse_label(value: f64) -> Result<u8> {
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(Error::InvalidLabel(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_with_nulls() {
        let value = json!({
            "attendance": 82.5,
            "cgpa": null,
            "backlogs": 1,
            "assignments_submitted": 9,
            "pending_fee_ratio": 0.1
        });

        let record = StudentRecord::from_json(&value).unwrap();
        assert_eq!(record.attendance, Some(82.5));
        assert_eq!(record.cgpa, None);
        assert_eq!(record.backlogs, Some(1.0));
        assert_eq!(record.dropout, None);
    }

    #[test]
    fn test_from_json_missing_key_is_schema_error() {
        let value = json!({
            "attendance": 82.5,
            "cgpa": 7.1,
            "backlogs": 1,
            "pending_fee_ratio": 0.1
        });

        match StudentRecord::from_json(&value) {
            Err(Error::Schema(field)) => assert_eq!(field, "assignments_submitted"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_label() {
        let value = json!({
            "attendance": 60, "cgpa": 5.0, "backlogs": 4,
            "assignments_submitted": 3, "pending_fee_ratio": 0.5, "dropout": 1
        });
        assert_eq!(StudentRecord::from_json(&value).unwrap().dropout, Some(1));

        let bad = json!({
            "attendance": 60, "cgpa": 5.0, "backlogs": 4,
            "assignments_submitted": 3, "pending_fee_ratio": 0.5, "dropout": 2
        });
        assert!(matches!(
            StudentRecord::from_json(&bad),
            Err(Error::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_nan_is_missing() {
        let mut record = StudentRecord::new(70.0, 6.0, 1.0, 8.0, 0.2);
        record.set_value(RawField::Cgpa, Some(f64::NAN));
        assert_eq!(record.value(RawField::Cgpa), None);
        assert_eq!(record.value_or_default(RawField::Cgpa), 4.0);
    }
}
