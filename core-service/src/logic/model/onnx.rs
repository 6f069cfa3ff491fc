//! ONNX Backends - ONNX Runtime Integration
//!
//! `OnnxClassifier` expects a classifier exported without a ZipMap node:
//! a `float32[1, n_features]` input, a `probabilities` tensor output and an
//! optional int64 `label` output.
//! `OnnxExplainer` expects the same input and one class-major attribution
//! tensor (`[n_classes, n_features]`, a leading batch axis of 1 is fine).
//!
//! `Session::run` needs `&mut`, so each session sits behind a mutex; callers
//! running in parallel serialize on it.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::{argmax, verify_checksum, Classifier, Explainer, ModelError, ModelMetadata};
use crate::logic::features::FeatureRow;

pub const DEFAULT_PROBABILITIES_OUTPUT: &str = "probabilities";
pub const DEFAULT_LABEL_OUTPUT: &str = "label";
pub const DEFAULT_ATTRIBUTIONS_OUTPUT: &str = "attributions";

// ============================================================================
// SESSION HELPERS
// ============================================================================

fn open_session(path: &Path) -> Result<Session, ModelError> {
    Session::builder()
        .map_err(|e| ModelError::invalid(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ModelError::invalid(format!("Failed to set optimization: {}", e)))?
        .commit_from_file(path)
        .map_err(|e| ModelError::invalid(format!("Failed to load model: {}", e)))
}

fn input_array(row: &FeatureRow) -> Result<Array2<f32>, ModelError> {
    Array2::<f32>::from_shape_vec((1, row.values().len()), row.to_f32())
        .map_err(|e| ModelError::inference(format!("Array error: {}", e)))
}

fn check_row(row: &FeatureRow, metadata: &ModelMetadata) -> Result<(), ModelError> {
    if row.schema().names() != metadata.feature_names.as_slice() {
        return Err(ModelError::contract(
            "feature row schema differs from the model's input features",
        ));
    }
    Ok(())
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct OnnxClassifier {
    session: Mutex<Session>,
    metadata: ModelMetadata,
    probabilities_output: String,
    label_output: String,
}

impl OnnxClassifier {
    /// Load ONNX classifier from file
    pub fn load(
        path: &Path,
        feature_names: Vec<String>,
        classes: Vec<String>,
        expected_sha256: Option<&str>,
    ) -> Result<Self, ModelError> {
        log::info!("Loading ONNX classifier from: {}", path.display());

        let digest = verify_checksum(path, expected_sha256)?;
        let session = open_session(path)?;

        log::info!("ONNX classifier loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata::new(
                path.display().to_string(),
                "onnx",
                feature_names,
                classes,
                Some(digest),
            ),
            probabilities_output: DEFAULT_PROBABILITIES_OUTPUT.to_string(),
            label_output: DEFAULT_LABEL_OUTPUT.to_string(),
        })
    }

    pub fn with_outputs(mut self, probabilities: &str, label: &str) -> Self {
        self.probabilities_output = probabilities.to_string();
        self.label_output = label.to_string();
        self
    }

    /// One session run: (label output if the graph has one, probabilities)
    fn run(&self, row: &FeatureRow) -> Result<(Option<usize>, Vec<f64>), ModelError> {
        check_row(row, &self.metadata)?;

        let input_tensor = Value::from_array(input_array(row)?)
            .map_err(|e| ModelError::inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::inference(format!("Inference failed: {}", e)))?;

        let probabilities: Vec<f64> = {
            let output = outputs.get(self.probabilities_output.as_str()).ok_or_else(|| {
                ModelError::contract(format!("no '{}' output", self.probabilities_output))
            })?;
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::inference(format!("Extract error: {}", e)))?;
            data.iter().map(|&p| p as f64).collect()
        };

        let label = match outputs.get(self.label_output.as_str()) {
            Some(output) => {
                let (_, data) = output
                    .try_extract_tensor::<i64>()
                    .map_err(|e| ModelError::inference(format!("Extract error: {}", e)))?;
                match data.first() {
                    Some(&l) if l >= 0 => Some(l as usize),
                    Some(&l) => return Err(ModelError::contract(format!("negative label {}", l))),
                    None => None,
                }
            }
            None => None,
        };

        if probabilities.len() != self.metadata.classes.len() {
            return Err(ModelError::contract(format!(
                "{} probabilities for {} classes",
                probabilities.len(),
                self.metadata.classes.len()
            )));
        }

        Ok((label, probabilities))
    }
}

impl Classifier for OnnxClassifier {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict_class(&self, row: &FeatureRow) -> Result<usize, ModelError> {
        let (label, probabilities) = self.run(row)?;
        label
            .or_else(|| argmax(&probabilities))
            .ok_or_else(|| ModelError::inference("no class could be selected"))
    }

    fn predict_probabilities(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        Ok(self.run(row)?.1)
    }
}

// ============================================================================
// EXPLAINER
// ============================================================================

pub struct OnnxExplainer {
    session: Mutex<Session>,
    metadata: ModelMetadata,
    output: String,
}

impl OnnxExplainer {
    pub fn load(
        path: &Path,
        feature_names: Vec<String>,
        expected_sha256: Option<&str>,
    ) -> Result<Self, ModelError> {
        log::info!("Loading ONNX explainer from: {}", path.display());

        let digest = verify_checksum(path, expected_sha256)?;
        let session = open_session(path)?;

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata::new(
                path.display().to_string(),
                "onnx",
                feature_names,
                Vec::new(),
                Some(digest),
            ),
            output: DEFAULT_ATTRIBUTIONS_OUTPUT.to_string(),
        })
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl Explainer for OnnxExplainer {
    fn attributions(&self, row: &FeatureRow) -> Result<Vec<Vec<f64>>, ModelError> {
        check_row(row, &self.metadata)?;
        let n_features = self.metadata.feature_names.len();

        let input_tensor = Value::from_array(input_array(row)?)
            .map_err(|e| ModelError::inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(self.output.as_str())
            .ok_or_else(|| ModelError::contract(format!("no '{}' output", self.output)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::inference(format!("Extract error: {}", e)))?;

        split_class_major(data, n_features)
    }
}

/// Split a flat class-major buffer into one vector per class
pub fn split_class_major(data: &[f32], n_features: usize) -> Result<Vec<Vec<f64>>, ModelError> {
    if n_features == 0 || data.is_empty() || data.len() % n_features != 0 {
        return Err(ModelError::contract(format!(
            "attribution tensor of {} values does not split into rows of {} features",
            data.len(),
            n_features
        )));
    }
    Ok(data
        .chunks(n_features)
        .map(|chunk| chunk.iter().map(|&v| v as f64).collect())
        .collect())
}
