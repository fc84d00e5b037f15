//! Record loading and saving utilities
//!
//! Reads and writes batches of student records as CSV or JSON.

use super::record::{parse_label, RawField, StudentRecord, LABEL_FIELD};
use crate::error::{Error, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;

/// Loader for student record files
pub struct RecordLoader;

impl RecordLoader {
    /// Load records from a CSV file.
    ///
    /// Every raw field must have a column; a `dropout` column is optional. Empty
    /// cells, `NaN` and `null` are missing values.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let records = Self::read_csv(Reader::from_reader(BufReader::new(file)))?;
        debug!("Loaded {} records from {:?}", records.len(), path);
        Ok(records)
    }

    /// Parse records from any CSV reader
    pub fn read_csv<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<StudentRecord>> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut columns = Vec::with_capacity(RawField::ALL.len());
        for field in RawField::ALL {
            let idx = column(field.name()).ok_or_else(|| Error::Schema(field.name().to_string()))?;
            columns.push((field, idx));
        }
        let label_column = column(LABEL_FIELD);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = StudentRecord::default();

            for &(field, idx) in &columns {
                record.set_value(field, parse_cell(field.name(), row.get(idx))?);
            }
            if let Some(idx) = label_column {
                record.dropout = parse_cell(LABEL_FIELD, row.get(idx))?
                    .map(parse_label)
                    .transpose()?;
            }

            records.push(record);
        }

        Ok(records)
    }

    /// Save records to a CSV file
    pub fn save_csv<P: AsRef<Path>>(records: &[StudentRecord], path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = Writer::from_writer(BufWriter::new(file));

        let with_labels = records.iter().any(|r| r.dropout.is_some());

        let mut header: Vec<&str> = RawField::ALL.iter().map(|f| f.name()).collect();
        if with_labels {
            header.push(LABEL_FIELD);
        }
        writer.write_record(&header)?;

        for record in records {
            let mut row: Vec<String> = RawField::ALL
                .iter()
                .map(|&f| record.value(f).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            if with_labels {
                row.push(record.dropout.map(|l| l.to_string()).unwrap_or_default());
            }
            writer.write_record(&row)?;
        }

        writer.flush().map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    /// Load records from a JSON array of objects
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
        Self::from_json_value(&value)
    }

    /// Parse records from a JSON array value
    pub fn from_json_value(value: &serde_json::Value) -> Result<Vec<StudentRecord>> {
        let items = value.as_array().ok_or_else(|| Error::InvalidValue {
            field: "records".to_string(),
            value: "expected a JSON array".to_string(),
        })?;
        items.iter().map(StudentRecord::from_json).collect()
    }

    /// Save records as a JSON array
    pub fn save_json<P: AsRef<Path>>(records: &[StudentRecord], path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), records)?;
        Ok(())
    }
}

fn parse_cell(field: &str, cell: Option<&str>) -> Result<Option<f64>> {
    let cell = cell.map(str::trim).unwrap_or("");
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some).map_err(|_| Error::InvalidValue {
        field: field.to_string(),
        value: cell.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CSV: &str = "\
attendance,cgpa,backlogs,assignments_submitted,pending_fee_ratio,dropout
82,7.5,0,10,0.1,0
61,,4,3,0.6,1
";

    #[test]
    fn test_read_csv_with_missing_cell() {
        let records = RecordLoader::read_csv(Reader::from_reader(CSV.as_bytes())).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attendance, Some(82.0));
        assert_eq!(records[0].dropout, Some(0));
        assert_eq!(records[1].cgpa, None);
        assert_eq!(records[1].dropout, Some(1));
    }

    #[test]
    fn test_read_csv_missing_column() {
        let csv = "attendance,cgpa,backlogs,pending_fee_ratio\n80,7,0,0.1\n";
        let result = RecordLoader::read_csv(Reader::from_reader(csv.as_bytes()));
        assert!(matches!(result, Err(Error::Schema(f)) if f == "assignments_submitted"));
    }

    #[test]
    fn test_read_csv_rejects_text() {
        let csv = "attendance,cgpa,backlogs,assignments_submitted,pending_fee_ratio\nhigh,7,0,9,0.1\n";
        let result = RecordLoader::read_csv(Reader::from_reader(csv.as_bytes()));
        assert!(matches!(result, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_save_and_load_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");

        let records = vec![
            StudentRecord::new(90.0, 8.2, 0.0, 12.0, 0.0).with_dropout(0),
            StudentRecord::new(55.0, 4.1, 5.0, 2.0, 0.7).with_dropout(1),
        ];

        RecordLoader::save_csv(&records, &path).unwrap();
        let loaded = RecordLoader::load_csv(&path).unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn test_load_json_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = RecordLoader::load_json(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
