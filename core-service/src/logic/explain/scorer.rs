//! Criteria Scorer
//!
//! Compresses one attribution vector into a 0..=100 integer per criterion:
//! mean |attribution| over the criterion's members, normalized by the sum
//! of all five means, then floored.

use std::sync::Arc;

use super::types::CriteriaScores;
use crate::logic::error::ExplainResult;
use crate::logic::features::{AttributionVector, FeatureSchema};
use crate::logic::taxonomy::{Criterion, CRITERIA};

/// Mean absolute attribution over the criterion's member features
pub fn raw_importance(criterion: Criterion, attributions: &AttributionVector) -> ExplainResult<f64> {
    let members = criterion.features();
    let mut sum = 0.0;
    for name in members {
        sum += attributions.get(name)?.abs();
    }
    Ok(sum / members.len() as f64)
}

/// Score every criterion. Pure; all-zero input yields all-zero scores.
///
/// Scores are `floor(raw / total * 100)`, so their total can be below 100.
/// That truncation is deliberate and kept as-is.
pub fn score(attributions: &AttributionVector) -> ExplainResult<CriteriaScores> {
    let mut raw = Vec::with_capacity(CRITERIA.len());
    for criterion in CRITERIA {
        raw.push((criterion, raw_importance(criterion, attributions)?));
    }

    let total: f64 = raw.iter().map(|(_, v)| v).sum();
    if total == 0.0 {
        return Ok(CriteriaScores::from_entries(
            raw.into_iter().map(|(c, _)| (c, 0)).collect(),
        ));
    }

    let entries = raw
        .into_iter()
        .map(|(criterion, value)| {
            // `as u8` saturates and maps NaN to 0
            let pct = (value / total * 100.0).floor().clamp(0.0, 100.0);
            (criterion, pct as u8)
        })
        .collect();

    Ok(CriteriaScores::from_entries(entries))
}

/// Score a bare value slice aligned positionally to `feature_names`
pub fn score_aligned(values: &[f64], feature_names: &[String]) -> ExplainResult<CriteriaScores> {
    let schema = Arc::new(FeatureSchema::new(feature_names.iter().cloned())?);
    let attributions = AttributionVector::new(schema, values.to_vec())?;
    score(&attributions)
}
