//! Model Module - Classifier & Explainer backends
//!
//! `inference` holds the traits the engine consumes; `linear` and `onnx`
//! are the concrete backends. Swapping backends never touches the engine.

pub mod inference;
pub mod linear;
pub mod onnx;

// Re-export common types
pub use inference::{argmax, sha256_file, verify_checksum, Classifier, Explainer, ModelError, ModelMetadata};
pub use linear::{LinearArtifact, LinearModel};
pub use onnx::{OnnxClassifier, OnnxExplainer};
