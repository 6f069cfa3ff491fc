//! Engine Configuration - Backend selection and explainer bootstrap
//!
//! Resolves artifacts from the environment (see `constants`) and wires the
//! classifier, explainer and dataset into a `SampleExplainer`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::constants;
use crate::logic::dataset::{load_csv, RowSource};
use crate::logic::error::{ExplainError, ExplainResult};
use crate::logic::explain::SampleExplainer;
use crate::logic::features::FeatureSchema;
use crate::logic::model::{Classifier, Explainer, LinearModel, OnnxClassifier, OnnxExplainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// JSON logistic-regression artifact, explains itself
    Linear,
    /// ONNX classifier plus a separate ONNX explainer graph
    Onnx,
}

impl FromStr for ModelFormat {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "json" => Ok(Self::Linear),
            "onnx" => Ok(Self::Onnx),
            other => Err(ExplainError::configuration(format!(
                "unknown model format '{}' (expected 'linear' or 'onnx')",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Onnx => write!(f, "onnx"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub dataset_path: PathBuf,
    pub label_column: String,
    pub model_format: ModelFormat,
    pub model_path: PathBuf,
    pub explainer_path: Option<PathBuf>,
    pub model_sha256: Option<String>,
    pub classes: Vec<String>,
}

impl EngineConfig {
    pub fn from_env() -> ExplainResult<Self> {
        Ok(Self {
            dataset_path: constants::get_dataset_path(),
            label_column: constants::get_label_column(),
            model_format: constants::get_model_format().parse()?,
            model_path: constants::get_model_path(),
            explainer_path: constants::get_explainer_path(),
            model_sha256: constants::get_model_sha256(),
            classes: constants::get_model_classes(),
        })
    }

    /// Load every artifact and build a ready-to-serve explainer
    pub fn build(&self) -> ExplainResult<SampleExplainer> {
        log::info!(
            "Building explainer: format={}, model={}, dataset={}",
            self.model_format,
            self.model_path.display(),
            self.dataset_path.display()
        );

        let schema = FeatureSchema::shared_koi();
        let (classifier, explainer) = self.load_backend(&schema)?;
        let rows: Arc<dyn RowSource> =
            Arc::new(load_csv(&self.dataset_path, schema, &self.label_column)?);

        SampleExplainer::new(classifier, explainer, rows)
    }

    fn load_backend(
        &self,
        schema: &FeatureSchema,
    ) -> ExplainResult<(Arc<dyn Classifier>, Arc<dyn Explainer>)> {
        let sha = self.model_sha256.as_deref();

        match self.model_format {
            ModelFormat::Linear => {
                if self.explainer_path.is_some() {
                    log::warn!("EXPLAINER_PATH ignored: linear models explain themselves");
                }
                let model = Arc::new(LinearModel::load(&self.model_path, sha)?);
                let classifier: Arc<dyn Classifier> = model.clone();
                let explainer: Arc<dyn Explainer> = model;
                Ok((classifier, explainer))
            }
            ModelFormat::Onnx => {
                let explainer_path = self.explainer_path.as_ref().ok_or_else(|| {
                    ExplainError::configuration("ONNX format requires EXPLAINER_PATH")
                })?;
                if self.classes.is_empty() {
                    return Err(ExplainError::configuration("MODEL_CLASSES is empty"));
                }
                let names = schema.names().to_vec();
                let classifier =
                    OnnxClassifier::load(&self.model_path, names.clone(), self.classes.clone(), sha)?;
                let explainer = OnnxExplainer::load(explainer_path, names, None)?;
                let classifier: Arc<dyn Classifier> = Arc::new(classifier);
                let explainer: Arc<dyn Explainer> = Arc::new(explainer);
                Ok((classifier, explainer))
            }
        }
    }
}
