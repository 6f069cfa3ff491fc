//! Explain Module - Attribution aggregation engine
//!
//! - `scorer` - attribution vector → 0..=100 criteria scores
//! - `visuals` - raw feature row → one typed payload per criterion
//! - `engine` - sample index → full explanation record
//! - `handle` - hot-swappable shared engine

pub mod engine;
pub mod handle;
pub mod scorer;
pub mod types;
pub mod visuals;

#[cfg(test)]
mod tests;

pub use engine::SampleExplainer;
pub use handle::ExplainerHandle;
pub use scorer::{raw_importance, score, score_aligned};
pub use types::{
    CriteriaScores, CriterionExplanation, ExplanationRecord, FalsePositiveFlags, TransitFeatures,
    Visual, Visuals,
};
pub use visuals::{build_visual, build_visuals, radius_ratio};
