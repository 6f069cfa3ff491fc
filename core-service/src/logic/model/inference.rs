//! Inference Contracts - Classifier & Explainer seams
//!
//! The explanation engine only consumes these traits. Backends (linear JSON
//! model, ONNX Runtime) live next to this file and are loaded once by the
//! serving layer, then shared read-only.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::features::FeatureRow;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Any failure raised by a classifier / explainer backend
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] io::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("inference failed: {0}")]
    Inference(String),

    /// Backend returned something that breaks the classifier/explainer contract
    #[error("collaborator contract violated: {0}")]
    Contract(String),
}

impl ModelError {
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArtifact(msg.into())
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String, // "linear" | "onnx"
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub sha256: Option<String>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    pub fn new(
        model_path: impl Into<String>,
        model_type: impl Into<String>,
        feature_names: Vec<String>,
        classes: Vec<String>,
        sha256: Option<String>,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            model_type: model_type.into(),
            feature_names,
            classes,
            sha256,
            loaded_at: chrono::Utc::now(),
        }
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// Trained classifier, used read-only
pub trait Classifier: Send + Sync {
    fn metadata(&self) -> &ModelMetadata;

    /// Index into `metadata().classes`
    fn predict_class(&self, row: &FeatureRow) -> Result<usize, ModelError>;

    /// One probability per class, indexed like `metadata().classes`
    fn predict_probabilities(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError>;
}

/// Per-class feature attributions. Outer index = class, inner = feature in
/// schema order.
pub trait Explainer: Send + Sync {
    fn attributions(&self, row: &FeatureRow) -> Result<Vec<Vec<f64>>, ModelError>;
}

// ============================================================================
// HELPERS
// ============================================================================

/// Index of the largest value; first index wins ties, NaN never wins
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String, ModelError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the artifact digest and compare it when one is expected
pub fn verify_checksum(path: &Path, expected: Option<&str>) -> Result<String, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }

    let actual = sha256_file(path)?;
    if let Some(expected) = expected {
        if !expected.trim().eq_ignore_ascii_case(&actual) {
            return Err(ModelError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: expected.trim().to_lowercase(),
                actual,
            });
        }
    }

    log::debug!("Artifact {} sha256={}", path.display(), actual);
    Ok(actual)
}
