//! Linear Model - Multinomial logistic regression from a JSON artifact
//!
//! Serves both seams: it classifies (softmax over per-class logits) and
//! explains itself exactly, since a linear logit decomposes per feature:
//! `attribution[c][j] = coef[c][j] * (x[j] - mean[j])`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::inference::{argmax, verify_checksum, Classifier, Explainer, ModelError, ModelMetadata};
use crate::logic::features::{validate_layout, FeatureRow};

/// On-disk artifact shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    /// One row per class, one column per feature
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    /// Background expectation used as the attribution baseline
    pub feature_means: Vec<f64>,
    /// Layout stamp written by the exporter; checked when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
}

impl LinearArtifact {
    fn validate(&self) -> Result<(), ModelError> {
        let n_classes = self.classes.len();
        let n_features = self.feature_names.len();

        if n_classes < 2 {
            return Err(ModelError::invalid(format!(
                "expected at least 2 classes, got {}",
                n_classes
            )));
        }
        if self.coefficients.len() != n_classes || self.intercepts.len() != n_classes {
            return Err(ModelError::invalid(format!(
                "{} classes but {} coefficient rows and {} intercepts",
                n_classes,
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        if let Some((c, row)) = self
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(ModelError::invalid(format!(
                "coefficient row {} has {} values, expected {}",
                c,
                row.len(),
                n_features
            )));
        }
        if self.feature_means.len() != n_features {
            return Err(ModelError::invalid(format!(
                "{} feature means for {} features",
                self.feature_means.len(),
                n_features
            )));
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .chain(&self.feature_means)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::invalid("artifact contains non-finite parameters"));
        }
        if let (Some(version), Some(hash)) = (self.feature_version, self.layout_hash) {
            validate_layout(version, hash).map_err(|e| ModelError::invalid(e.to_string()))?;
        }
        Ok(())
    }
}

pub struct LinearModel {
    artifact: LinearArtifact,
    metadata: ModelMetadata,
}

impl LinearModel {
    pub fn from_artifact(artifact: LinearArtifact, model_path: &str, sha256: Option<String>) -> Result<Self, ModelError> {
        artifact.validate()?;
        let metadata = ModelMetadata::new(
            model_path,
            "linear",
            artifact.feature_names.clone(),
            artifact.classes.clone(),
            sha256,
        );
        Ok(Self { artifact, metadata })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let artifact: LinearArtifact = serde_json::from_str(json)
            .map_err(|e| ModelError::invalid(format!("linear model JSON: {}", e)))?;
        Self::from_artifact(artifact, "<memory>", None)
    }

    /// Load from file, verifying the SHA-256 digest when one is given
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self, ModelError> {
        log::info!("Loading linear model from: {}", path.display());

        let digest = verify_checksum(path, expected_sha256)?;
        let json = fs::read_to_string(path)?;
        let artifact: LinearArtifact = serde_json::from_str(&json)
            .map_err(|e| ModelError::invalid(format!("{}: {}", path.display(), e)))?;

        let model = Self::from_artifact(artifact, &path.display().to_string(), Some(digest))?;
        log::info!(
            "Linear model loaded ({} classes, {} features)",
            model.artifact.classes.len(),
            model.artifact.feature_names.len()
        );
        Ok(model)
    }

    fn check_input(&self, row: &FeatureRow) -> Result<(), ModelError> {
        if row.schema().names() != self.artifact.feature_names.as_slice() {
            return Err(ModelError::contract(
                "feature row schema differs from the model's training features",
            ));
        }
        Ok(())
    }

    fn logits(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        self.check_input(row)?;
        let x = row.values();
        Ok(self
            .artifact
            .coefficients
            .iter()
            .zip(&self.artifact.intercepts)
            .map(|(coef, b)| b + coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>())
            .collect())
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl Classifier for LinearModel {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict_class(&self, row: &FeatureRow) -> Result<usize, ModelError> {
        let logits = self.logits(row)?;
        argmax(&logits).ok_or_else(|| ModelError::inference("logits are all NaN"))
    }

    fn predict_probabilities(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        Ok(softmax(&self.logits(row)?))
    }
}

impl Explainer for LinearModel {
    fn attributions(&self, row: &FeatureRow) -> Result<Vec<Vec<f64>>, ModelError> {
        self.check_input(row)?;
        let x = row.values();
        Ok(self
            .artifact
            .coefficients
            .iter()
            .map(|coef| {
                coef.iter()
                    .zip(x)
                    .zip(&self.artifact.feature_means)
                    .map(|((w, v), m)| w * (v - m))
                    .collect()
            })
            .collect())
    }
}
