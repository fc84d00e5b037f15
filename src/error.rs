//! Error types for the dropout risk library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// No trained model in memory and no persisted artifact to load
    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    /// Training batch contains a single label class
    #[error("Insufficient label diversity: training batch only contains class {0}")]
    InsufficientLabelDiversity(u8),

    /// A required field or column is structurally absent
    #[error("Schema error: missing required field `{0}`")]
    Schema(String),

    /// Preprocessing was called without records
    #[error("Empty batch: at least one student record is required")]
    EmptyBatch,

    /// A field holds something that is not a number
    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue { field: String, value: String },

    /// A dropout label other than 0 or 1
    #[error("Invalid dropout label: {0} (expected 0 or 1)")]
    InvalidLabel(f64),

    /// Feature layout disagrees with the fitted one
    #[error("Feature mismatch: expected {expected:?}, found {found:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Reading or writing a file failed
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Sampling distribution parameters rejected
    #[error("Invalid distribution: {0}")]
    Distribution(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an IO error with the path it occurred at
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::Schema("cgpa".to_string());
        assert_eq!(err.to_string(), "Schema error: missing required field `cgpa`");

        let err = Error::InsufficientLabelDiversity(0);
        assert!(err.to_string().contains("class 0"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io = Error::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(io.to_string().contains("missing.json"));
        assert!(!matches!(io, Error::ModelNotTrained(_)));
    }
}
