use std::sync::Arc;

use super::scorer;
use super::types::{CriterionExplanation, ExplanationRecord};
use super::visuals;
use crate::logic::dataset::RowSource;
use crate::logic::error::{ExplainError, ExplainResult};
use crate::logic::features::{AttributionVector, FeatureRow, FeatureSchema};
use crate::logic::model::{Classifier, Explainer, ModelError};
use crate::logic::taxonomy::{validate_taxonomy, CRITERIA};

/// Per-sample explanation orchestrator.
///
/// Collaborators are injected once (service startup) and only read
/// afterwards, so one instance can serve concurrent requests.
pub struct SampleExplainer {
    classifier: Arc<dyn Classifier>,
    explainer: Arc<dyn Explainer>,
    rows: Arc<dyn RowSource>,
}

impl SampleExplainer {
    /// Wire collaborators together, failing fast on taxonomy / schema drift
    pub fn new(
        classifier: Arc<dyn Classifier>,
        explainer: Arc<dyn Explainer>,
        rows: Arc<dyn RowSource>,
    ) -> ExplainResult<Self> {
        let schema = rows.schema();
        validate_taxonomy(schema)?;
        schema.ensure_matches(&classifier.metadata().feature_names, "classifier")?;

        log::info!(
            "Sample explainer ready: {} rows, {} classes, layout hash {:08x}",
            rows.row_count(),
            classifier.metadata().classes.len(),
            schema.layout_hash()
        );

        Ok(Self {
            classifier,
            explainer,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.rows.schema()
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Explain the sample at a zero-based dataset index.
    /// Deterministic for a fixed classifier / explainer / dataset snapshot.
    pub fn explain_sample(&self, index: i64) -> ExplainResult<ExplanationRecord> {
        let row_count = self.rows.row_count();
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i < row_count)
            .ok_or(ExplainError::IndexOutOfRange { index, row_count })?;

        let sample = self.rows.row_at(position)?;

        let predicted = self.classifier.predict_class(&sample.row)?;
        let probabilities = self.classifier.predict_probabilities(&sample.row)?;
        let confidence = *probabilities.get(predicted).ok_or_else(|| {
            ModelError::contract(format!(
                "predicted class {} has no probability ({} classes)",
                predicted,
                probabilities.len()
            ))
        })?;

        let attributions = self.attributions_for(&sample.row, predicted)?;
        let scores = scorer::score(&attributions)?;
        let visuals = visuals::build_visuals(&sample.row)?;

        let mut criteria = Vec::with_capacity(CRITERIA.len());
        for criterion in CRITERIA {
            let score = scores.get(criterion).ok_or_else(|| {
                ExplainError::configuration(format!("no score computed for '{}'", criterion))
            })?;
            let visual = visuals.get(criterion).cloned().ok_or_else(|| {
                ExplainError::configuration(format!("no visualization mapped for '{}'", criterion))
            })?;
            criteria.push(CriterionExplanation {
                criterion,
                score,
                visual,
            });
        }

        log::debug!(
            "Explained sample {}: class {} ({:.3}), scores total {}",
            index,
            predicted,
            confidence,
            scores.total()
        );

        Ok(ExplanationRecord {
            prediction: sample.label,
            confidence,
            criteria,
        })
    }

    /// Pretty JSON (2-space indent) rendering of `explain_sample`
    pub fn explain_sample_json(&self, index: i64) -> ExplainResult<String> {
        let record = self.explain_sample(index)?;
        serde_json::to_string_pretty(&record)
            .map_err(|e| ExplainError::configuration(format!("failed to encode explanation: {}", e)))
    }

    /// The attribution vector of the predicted class, alignment-checked
    fn attributions_for(&self, row: &FeatureRow, class: usize) -> ExplainResult<AttributionVector> {
        let mut per_class = self.explainer.attributions(row)?;
        if class >= per_class.len() {
            return Err(ModelError::contract(format!(
                "explainer returned {} class vectors, predicted class is {}",
                per_class.len(),
                class
            ))
            .into());
        }

        let values = per_class.swap_remove(class);
        if values.len() != row.schema().len() {
            return Err(ModelError::contract(format!(
                "attribution vector has {} values for {} features",
                values.len(),
                row.schema().len()
            ))
            .into());
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::contract("explainer returned non-finite attributions").into());
        }

        AttributionVector::new(Arc::clone(row.schema()), values)
    }
}
