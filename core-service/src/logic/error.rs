//! Error Types - Typed failures of the explanation engine
//!
//! The engine never produces user-facing messages; the serving layer maps
//! these variants to transport-level responses.

use thiserror::Error;

use super::dataset::DatasetError;
use super::model::ModelError;

pub type ExplainResult<T> = Result<T, ExplainError>;

#[derive(Debug, Error)]
pub enum ExplainError {
    /// Requested sample index is outside `0..row_count`
    #[error("sample index {index} out of range (row count: {row_count})")]
    IndexOutOfRange { index: i64, row_count: usize },

    /// Taxonomy / schema drift. Fatal, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure raised by the classifier or explainer, propagated as-is
    #[error(transparent)]
    Collaborator(#[from] ModelError),

    /// Failure raised by the dataset row source
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl ExplainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn missing_feature(name: &str) -> Self {
        Self::Configuration(format!("feature '{}' is not part of the feature schema", name))
    }

    pub fn is_index_error(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Dataset(e) => e.is_configuration(),
            _ => false,
        }
    }
}
