//! Scientist feedback handlers
//!
//! Retraining happens offline; this route records the feedback the trainer
//! consumes.

use std::collections::{BTreeMap, HashMap};

use axum::{extract::State, Json};
use exoplanet_core::logic::dataset::{FeedbackRecord, FeedbackStats};
use exoplanet_core::Criterion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    pub sample_index: usize,

    #[validate(length(min = 1, max = 64))]
    pub disposition: Option<String>,

    /// Criterion display name → 0..=100
    #[serde(default)]
    #[validate(custom(function = "validate_criteria"))]
    pub criteria: HashMap<String, u8>,

    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

fn validate_criteria(criteria: &HashMap<String, u8>) -> Result<(), ValidationError> {
    for (name, score) in criteria {
        if Criterion::from_name(name).is_none() {
            let mut err = ValidationError::new("unknown_criterion");
            err.message = Some(format!("unknown criterion '{}'", name).into());
            return Err(err);
        }
        if *score > 100 {
            let mut err = ValidationError::new("score_range");
            err.message = Some(format!("score for '{}' must be within 0..=100", name).into());
            return Err(err);
        }
    }
    Ok(())
}

impl FeedbackRequest {
    fn into_record(self) -> FeedbackRecord {
        // Names were checked by `validate_criteria`
        let criteria: BTreeMap<Criterion, u8> = self
            .criteria
            .into_iter()
            .filter_map(|(name, score)| Criterion::from_name(&name).map(|c| (c, score)))
            .collect();
        FeedbackRecord::new(self.sample_index, self.disposition, criteria, self.note)
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub feedback_id: Uuid,
}

/// Record scientist feedback for the next retraining run
pub async fn retrain(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> AppResult<Json<FeedbackResponse>> {
    req.validate()?;

    let row_count = state.handle.current().row_count();
    if req.sample_index >= row_count {
        return Err(AppError::ValidationError(format!(
            "sample_index {} out of range (row count: {})",
            req.sample_index, row_count
        )));
    }

    let record = req.into_record();
    let feedback_id = record.id;
    let writer = state.feedback.clone();
    tokio::task::spawn_blocking(move || writer.append(&record)).await??;

    tracing::info!("Feedback {} recorded", feedback_id);

    Ok(Json(FeedbackResponse {
        status: "success",
        message: "Feedback recorded for retraining.",
        feedback_id,
    }))
}

/// Feedback log statistics
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<FeedbackStats>> {
    let writer = state.feedback.clone();
    let stats = tokio::task::spawn_blocking(move || writer.stats()).await??;
    Ok(Json(stats))
}
