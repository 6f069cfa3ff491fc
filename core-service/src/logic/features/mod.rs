//! Features Module - KOI feature schema
//!
//! `layout` is the single source of truth for column order; `schema` turns
//! it into typed, alignment-checked rows and attribution vectors.

pub mod layout;
pub mod schema;

// Re-export common types
pub use layout::{
    feature_index, feature_name, layout_hash, validate_layout, LayoutInfo, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use schema::{AttributionVector, FeatureRow, FeatureSchema};
