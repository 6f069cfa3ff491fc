//! Exoplanet Core - Explanation aggregation for the KOI vetting classifier
//!
//! Turns a trained classifier's per-feature attributions into five
//! human-readable vetting criteria, each with a score and a plot payload.

pub mod constants;
pub mod logic;

pub use logic::config::{EngineConfig, ModelFormat};
pub use logic::error::{ExplainError, ExplainResult};
pub use logic::explain::{ExplainerHandle, ExplanationRecord, SampleExplainer};
pub use logic::taxonomy::{Criterion, CRITERIA};
