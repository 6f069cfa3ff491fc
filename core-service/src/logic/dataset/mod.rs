//! Dataset Module - KOI rows in, scientist feedback out
//!
//! `source` resolves a sample index to its zero-filled feature row and
//! display label. `writer` / `export` keep the feedback log the external
//! retraining job consumes.

pub mod export;
pub mod record;
pub mod source;
pub mod writer;

#[cfg(test)]
mod tests;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use export::export_jsonl;
pub use record::{FeedbackRecord, SampleRecord};
pub use source::{load_csv, read_csv, InMemoryDataset, RowSource, DEFAULT_LABEL_COLUMN};
pub use writer::{FeedbackStats, FeedbackWriter};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("dataset schema mismatch: {0}")]
    Schema(String),

    #[error("row {index} out of range (row count: {row_count})")]
    RowOutOfRange { index: usize, row_count: usize },
}

impl DatasetError {
    /// Column / schema drift between the dataset and the model
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingColumn(_) | Self::Schema(_))
    }
}

/// Get the base directory for feedback storage
pub fn default_feedback_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exoplanet-vetting")
        .join("feedback")
}
