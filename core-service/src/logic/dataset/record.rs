use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::{layout_hash, FeatureRow, FEATURE_VERSION};
use crate::logic::taxonomy::Criterion;

/// One dataset row: zero-filled features plus the display disposition
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub row: FeatureRow,
    pub label: String,
}

impl SampleRecord {
    pub fn new(row: FeatureRow, label: impl Into<String>) -> Self {
        Self {
            row,
            label: label.into(),
        }
    }
}

/// Scientist feedback on one explanation, kept for the external retrainer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,

    // Feature contract the feedback was given against
    pub feature_version: u8,
    pub layout_hash: u32,

    pub sample_index: usize,
    pub disposition: Option<String>,
    /// Corrected 0..=100 weight per criterion
    pub criteria: BTreeMap<Criterion, u8>,
    pub note: Option<String>,
}

impl FeedbackRecord {
    pub fn new(
        sample_index: usize,
        disposition: Option<String>,
        criteria: BTreeMap<Criterion, u8>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            sample_index,
            disposition,
            criteria,
            note,
        }
    }
}
