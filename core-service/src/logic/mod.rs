//! Logic Module - Explanation engine & collaborators
//!
//! ## Architecture
//! - `features/` - KOI feature layout, schema-checked rows and attributions
//! - `taxonomy` - the five vetting criteria and their member features
//! - `explain/` - scoring, visual payloads and the per-sample engine
//! - `model/` - classifier / explainer backends (linear JSON, ONNX)
//! - `dataset/` - CSV row source and the feedback log
//! - `config` - backend selection and explainer bootstrap

pub mod config;
pub mod dataset;
pub mod error;
pub mod explain;
pub mod features;
pub mod model;
pub mod taxonomy;
