//! Data structures and record loading module
//!
//! Provides student records, ML datasets, record file I/O and a synthetic
//! data generator.

mod dataset;
mod loader;
mod record;
mod synthetic;

pub use dataset::{Dataset, Split};
pub use loader::RecordLoader;
pub use record::{parse_label, RawField, StudentRecord, LABEL_FIELD};
pub use synthetic::{dropout_probability, generate_sample_data};
