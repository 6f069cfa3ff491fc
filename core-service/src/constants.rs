//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment.

use std::path::PathBuf;

/// Default KOI dataset export
pub const DEFAULT_DATASET_PATH: &str = "koi_dataset.csv";

/// Default trained model artifact
pub const DEFAULT_MODEL_PATH: &str = "koi_model.json";

/// Default model backend ("linear" | "onnx")
pub const DEFAULT_MODEL_FORMAT: &str = "linear";

/// Class labels in model output order (ONNX graphs carry no label names)
pub const DEFAULT_MODEL_CLASSES: &[&str] = &["CANDIDATE", "CONFIRMED", "FALSE POSITIVE"];

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Exoplanet Vetting";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Get dataset path from environment or use default
pub fn get_dataset_path() -> PathBuf {
    non_empty("DATASET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH))
}

/// Get label column from environment or use default
pub fn get_label_column() -> String {
    non_empty("LABEL_COLUMN").unwrap_or_else(|| crate::logic::dataset::DEFAULT_LABEL_COLUMN.to_string())
}

/// Get model format from environment or use default
pub fn get_model_format() -> String {
    non_empty("MODEL_FORMAT").unwrap_or_else(|| DEFAULT_MODEL_FORMAT.to_string())
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> PathBuf {
    non_empty("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}

/// ONNX explainer artifact, if configured
pub fn get_explainer_path() -> Option<PathBuf> {
    non_empty("EXPLAINER_PATH").map(PathBuf::from)
}

/// Expected SHA-256 of the model artifact, if configured
pub fn get_model_sha256() -> Option<String> {
    non_empty("MODEL_SHA256")
}

/// Get class labels from environment (comma-separated) or use default
pub fn get_model_classes() -> Vec<String> {
    match non_empty("MODEL_CLASSES") {
        Some(raw) => parse_list(&raw),
        None => DEFAULT_MODEL_CLASSES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Get feedback log directory from environment or use the platform data dir
pub fn get_feedback_dir() -> PathBuf {
    non_empty("FEEDBACK_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(crate::logic::dataset::default_feedback_dir)
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
