use std::sync::Arc;

use proptest::prelude::*;

use super::engine::SampleExplainer;
use super::handle::ExplainerHandle;
use super::scorer::{score, score_aligned};
use super::types::Visual;
use super::visuals::build_visuals;
use crate::logic::dataset::{InMemoryDataset, RowSource, SampleRecord};
use crate::logic::error::ExplainError;
use crate::logic::features::{AttributionVector, FeatureRow, FeatureSchema, FEATURE_COUNT};
use crate::logic::model::{Classifier, Explainer, ModelError, ModelMetadata};
use crate::logic::taxonomy::{Criterion, CRITERIA};

// ============================================================================
// FIXTURES
// ============================================================================

fn koi_row(values: Vec<f64>) -> FeatureRow {
    FeatureRow::new(FeatureSchema::shared_koi(), values).unwrap()
}

fn attributions(values: Vec<f64>) -> AttributionVector {
    AttributionVector::new(FeatureSchema::shared_koi(), values).unwrap()
}

fn with(pairs: &[(&str, f64)]) -> Vec<f64> {
    let schema = FeatureSchema::koi();
    let mut values = vec![0.0; FEATURE_COUNT];
    for (name, v) in pairs {
        values[schema.position(name).unwrap()] = *v;
    }
    values
}

/// Classifier + explainer returning canned outputs
struct CannedModel {
    metadata: ModelMetadata,
    class: usize,
    probabilities: Vec<f64>,
    attributions: Vec<Vec<f64>>,
}

impl CannedModel {
    fn new(class: usize, probabilities: Vec<f64>, attributions: Vec<Vec<f64>>) -> Self {
        Self {
            metadata: ModelMetadata::new(
                "<canned>",
                "canned",
                FeatureSchema::koi().names().to_vec(),
                vec!["CANDIDATE".into(), "CONFIRMED".into(), "FALSE POSITIVE".into()],
                None,
            ),
            class,
            probabilities,
            attributions,
        }
    }
}

impl Classifier for CannedModel {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict_class(&self, _row: &FeatureRow) -> Result<usize, ModelError> {
        Ok(self.class)
    }

    fn predict_probabilities(&self, _row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        Ok(self.probabilities.clone())
    }
}

impl Explainer for CannedModel {
    fn attributions(&self, _row: &FeatureRow) -> Result<Vec<Vec<f64>>, ModelError> {
        Ok(self.attributions.clone())
    }
}

struct BrokenExplainer;

impl Explainer for BrokenExplainer {
    fn attributions(&self, _row: &FeatureRow) -> Result<Vec<Vec<f64>>, ModelError> {
        Err(ModelError::inference("explainer crashed"))
    }
}

fn dataset(records: Vec<(Vec<f64>, &str)>) -> Arc<InMemoryDataset> {
    let records = records
        .into_iter()
        .map(|(values, label)| SampleRecord::new(koi_row(values), label))
        .collect();
    Arc::new(InMemoryDataset::new(FeatureSchema::shared_koi(), records).unwrap())
}

fn engine(model: CannedModel, rows: Arc<InMemoryDataset>) -> SampleExplainer {
    let model = Arc::new(model);
    SampleExplainer::new(model.clone(), model, rows).unwrap()
}

/// Sample whose FP flags are clear and whose FP attributions are all zero
fn clear_flags_sample() -> (Vec<f64>, Vec<Vec<f64>>) {
    let row = with(&[
        ("koi_depth", 615.8),
        ("koi_duration", 2.96),
        ("koi_period", 9.488),
        ("koi_model_snr", 35.8),
        ("koi_impact", 0.146),
        ("koi_prad", 2.26),
        ("koi_srad", 0.927),
        ("koi_teq", 793.0),
        ("koi_insol", 93.59),
        ("koi_steff", 5455.0),
    ]);
    let predicted = with(&[
        ("koi_depth", 0.12),
        ("koi_duration", -0.05),
        ("koi_period", 0.08),
        ("koi_model_snr", 0.31),
        ("koi_impact", -0.02),
        ("koi_prad", 0.09),
        ("koi_srad", 0.01),
        ("koi_teq", -0.04),
        ("koi_insol", 0.03),
        ("koi_steff", 0.02),
    ]);
    let other = vec![0.5; FEATURE_COUNT];
    (row, vec![other.clone(), predicted, other])
}

// ============================================================================
// SCORER
// ============================================================================

#[test]
fn test_all_zero_attributions_score_zero() {
    let scores = score(&attributions(vec![0.0; FEATURE_COUNT])).unwrap();
    assert_eq!(scores.len(), 5);
    for (_, s) in scores.iter() {
        assert_eq!(s, 0);
    }
}

#[test]
fn test_equal_groups_split_evenly() {
    // Every criterion mean is 1 except false positives
    let values = with(&[
        ("koi_depth", 1.0),
        ("koi_duration", -1.0),
        ("koi_period", 1.0),
        ("koi_model_snr", 1.0),
        ("koi_impact", 1.0),
        ("koi_prad", 1.0),
        ("koi_srad", -1.0),
        ("koi_teq", 1.0),
        ("koi_insol", 1.0),
        ("koi_steff", 1.0),
    ]);
    let scores = score(&attributions(values)).unwrap();
    assert_eq!(scores.get(Criterion::TransitSignalReliability), Some(25));
    assert_eq!(scores.get(Criterion::FalsePositiveLikelihood), Some(0));
    assert_eq!(scores.get(Criterion::PlanetaryPlausibility), Some(25));
    assert_eq!(scores.get(Criterion::OrbitPlausibility), Some(25));
    assert_eq!(scores.get(Criterion::TemperaturePlausibility), Some(25));
    assert_eq!(scores.total(), 100);
}

#[test]
fn test_floor_truncation_keeps_total_below_100() {
    // Three equal groups: 33.3 each, floored to 33
    let values = with(&[
        ("koi_depth", 1.0),
        ("koi_duration", 1.0),
        ("koi_period", 1.0),
        ("koi_model_snr", 1.0),
        ("koi_impact", 1.0),
        ("koi_prad", 1.0),
        ("koi_srad", 1.0),
    ]);
    let scores = score(&attributions(values)).unwrap();
    assert_eq!(scores.get(Criterion::TransitSignalReliability), Some(33));
    assert_eq!(scores.get(Criterion::PlanetaryPlausibility), Some(33));
    assert_eq!(scores.get(Criterion::OrbitPlausibility), Some(33));
    assert_eq!(scores.total(), 99);
}

#[test]
fn test_mean_not_sum_per_group() {
    // One flag at 4 → FP mean 1; one transit feature at 5 → transit mean 1
    let values = with(&[("koi_fpflag_co", 4.0), ("koi_model_snr", 5.0)]);
    let scores = score(&attributions(values)).unwrap();
    assert_eq!(scores.get(Criterion::FalsePositiveLikelihood), Some(50));
    assert_eq!(scores.get(Criterion::TransitSignalReliability), Some(50));
}

#[test]
fn test_single_group_gets_everything() {
    let scores = score(&attributions(with(&[("koi_teq", 0.7)]))).unwrap();
    assert_eq!(scores.get(Criterion::TemperaturePlausibility), Some(100));
    assert_eq!(scores.total(), 100);
}

#[test]
fn test_score_aligned_resolves_by_name() {
    // Reversed column order must give the same result as the KOI order
    let koi = FeatureSchema::koi();
    let values = with(&[("koi_depth", 2.0), ("koi_fpflag_nt", 1.0)]);
    let expected = score(&attributions(values.clone())).unwrap();

    let mut names = koi.names().to_vec();
    names.reverse();
    let mut reversed = values;
    reversed.reverse();
    assert_eq!(score_aligned(&reversed, &names).unwrap(), expected);
}

#[test]
fn test_missing_taxonomy_feature_is_configuration_error() {
    let names: Vec<String> = FeatureSchema::koi()
        .names()
        .iter()
        .filter(|n| n.as_str() != "koi_insol")
        .cloned()
        .collect();
    let err = score_aligned(&vec![1.0; names.len()], &names).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_misaligned_vector_is_configuration_error() {
    let names = FeatureSchema::koi().names().to_vec();
    let err = score_aligned(&[1.0, 2.0], &names).unwrap_err();
    assert!(err.is_configuration_error());
}

proptest! {
    #[test]
    fn scores_are_bounded(values in prop::collection::vec(-1.0e6f64..1.0e6, FEATURE_COUNT)) {
        let scores = score(&attributions(values)).unwrap();
        for (_, s) in scores.iter() {
            prop_assert!(s <= 100);
        }
        prop_assert!(scores.total() <= 100);
    }

    #[test]
    fn scores_ignore_sign(values in prop::collection::vec(-1.0e3f64..1.0e3, FEATURE_COUNT)) {
        let v = attributions(values);
        prop_assert_eq!(score(&v).unwrap(), score(&v.scaled(-1.0)).unwrap());
    }

    #[test]
    fn scores_are_scale_invariant_up_to_floor(
        values in prop::collection::vec(-1.0e3f64..1.0e3, FEATURE_COUNT),
        factor in 0.01f64..100.0,
    ) {
        let v = attributions(values);
        let a = score(&v).unwrap();
        let b = score(&v.scaled(factor)).unwrap();
        for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
            prop_assert!((x as i32 - y as i32).abs() <= 1);
        }
    }

    #[test]
    fn ratio_never_divides_by_non_positive_radius(
        prad in 0.0f64..50.0,
        srad in -5.0f64..=0.0,
    ) {
        let row = koi_row(with(&[("koi_prad", prad), ("koi_srad", srad)]));
        let visuals = build_visuals(&row).unwrap();
        match visuals.get(Criterion::PlanetaryPlausibility) {
            Some(Visual::PlanetVsStar { ratio, .. }) => prop_assert!(ratio.is_none()),
            other => prop_assert!(false, "unexpected payload {:?}", other),
        }
    }
}

// ============================================================================
// VISUALS
// ============================================================================

#[test]
fn test_one_payload_per_criterion() {
    let visuals = build_visuals(&koi_row(vec![1.0; FEATURE_COUNT])).unwrap();
    assert_eq!(visuals.len(), CRITERIA.len());
    for criterion in CRITERIA {
        assert_eq!(visuals.get(criterion).unwrap().criterion(), criterion);
    }
}

#[test]
fn test_payload_values_pass_through() {
    let (row, _) = clear_flags_sample();
    let visuals = build_visuals(&koi_row(row)).unwrap();

    match visuals.get(Criterion::PlanetaryPlausibility).unwrap() {
        Visual::PlanetVsStar { planet_radius, star_radius, ratio } => {
            assert_eq!(*planet_radius, 2.26);
            assert_eq!(*star_radius, 0.927);
            assert_eq!(*ratio, Some(2.26 / 0.927));
        }
        other => panic!("unexpected payload {:?}", other),
    }

    match visuals.get(Criterion::TemperaturePlausibility).unwrap() {
        Visual::TemperatureGauge { planet_teq, stellar_teff, insolation } => {
            assert_eq!((*planet_teq, *stellar_teff, *insolation), (793.0, 5455.0, 93.59));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_flags_are_integer_cast() {
    let row = koi_row(with(&[("koi_fpflag_nt", 1.0), ("koi_fpflag_co", 0.9)]));
    let visuals = build_visuals(&row).unwrap();
    match visuals.get(Criterion::FalsePositiveLikelihood).unwrap() {
        Visual::FlagBars { flags } => {
            assert_eq!(flags.koi_fpflag_nt, 1);
            assert_eq!(flags.koi_fpflag_co, 0);
            assert_eq!(flags.raised(), 1);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_visual_wire_shape() {
    let row = koi_row(with(&[("koi_prad", 1.0), ("koi_srad", 0.0), ("koi_period", 3.5)]));
    let visuals = build_visuals(&row).unwrap();

    let planet = serde_json::to_value(visuals.get(Criterion::PlanetaryPlausibility).unwrap()).unwrap();
    assert_eq!(
        planet,
        serde_json::json!({
            "type": "planet_vs_star",
            "planet_radius": 1.0,
            "star_radius": 0.0,
            "ratio": null
        })
    );

    let orbit = serde_json::to_value(visuals.get(Criterion::OrbitPlausibility).unwrap()).unwrap();
    assert_eq!(orbit["type"], "orbit_plot");
    assert_eq!(orbit["period"], 3.5);

    for visual in visuals.iter() {
        let json = serde_json::to_value(visual).unwrap();
        assert_eq!(json["type"], visual.kind());
    }
}

#[test]
fn test_visuals_need_full_schema() {
    let schema = Arc::new(FeatureSchema::new(["koi_depth", "koi_duration"]).unwrap());
    let row = FeatureRow::new(schema, vec![1.0, 2.0]).unwrap();
    assert!(build_visuals(&row).unwrap_err().is_configuration_error());
}

// ============================================================================
// SAMPLE EXPLAINER
// ============================================================================

#[test]
fn test_clear_flags_scenario() {
    let (row, attr) = clear_flags_sample();
    let explainer = engine(
        CannedModel::new(1, vec![0.1, 0.85, 0.05], attr),
        dataset(vec![(row, "CONFIRMED")]),
    );

    let record = explainer.explain_sample(0).unwrap();
    assert_eq!(record.prediction, "CONFIRMED");
    assert_eq!(record.confidence, 0.85);

    let fp = record.criterion(Criterion::FalsePositiveLikelihood).unwrap();
    assert_eq!(fp.score, 0);
    match &fp.visual {
        Visual::FlagBars { flags } => assert_eq!(flags.raised(), 0),
        other => panic!("unexpected payload {:?}", other),
    }

    let transit = record.criterion(Criterion::TransitSignalReliability).unwrap();
    assert!(transit.score > 0);
    match &transit.visual {
        Visual::FeatureBars { features_used } => {
            assert_eq!(features_used.koi_depth, 615.8);
            assert_eq!(features_used.koi_duration, 2.96);
            assert_eq!(features_used.koi_period, 9.488);
            assert_eq!(features_used.koi_model_snr, 35.8);
            assert_eq!(features_used.koi_impact, 0.146);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_zero_star_radius_scenario() {
    let row = with(&[("koi_prad", 1.8), ("koi_srad", 0.0)]);
    let attr = vec![vec![0.2; FEATURE_COUNT]; 3];
    let explainer = engine(
        CannedModel::new(0, vec![0.6, 0.3, 0.1], attr),
        dataset(vec![(row, "CANDIDATE")]),
    );

    let json: serde_json::Value =
        serde_json::from_str(&explainer.explain_sample_json(0).unwrap()).unwrap();
    let planet = &json["criteria"]["Planetary Plausibility"]["visual"];
    assert_eq!(planet["planet_radius"], 1.8);
    assert_eq!(planet["star_radius"], 0.0);
    assert!(planet["ratio"].is_null());
}

#[test]
fn test_selects_predicted_class_vector() {
    // Class 0 points only at temperature, class 2 only at flags
    let attr = vec![
        with(&[("koi_teq", 1.0)]),
        vec![0.0; FEATURE_COUNT],
        with(&[("koi_fpflag_ss", 1.0)]),
    ];
    let rows = dataset(vec![(vec![0.0; FEATURE_COUNT], "FALSE POSITIVE")]);
    let explainer = engine(CannedModel::new(2, vec![0.1, 0.1, 0.8], attr), rows);

    let record = explainer.explain_sample(0).unwrap();
    assert_eq!(record.criterion(Criterion::FalsePositiveLikelihood).unwrap().score, 100);
    assert_eq!(record.criterion(Criterion::TemperaturePlausibility).unwrap().score, 0);
    assert_eq!(record.confidence, 0.8);
}

#[test]
fn test_index_bounds() {
    let rows = dataset(vec![
        (vec![0.0; FEATURE_COUNT], "CANDIDATE"),
        (vec![0.0; FEATURE_COUNT], "CONFIRMED"),
    ]);
    let explainer = engine(CannedModel::new(0, vec![1.0, 0.0, 0.0], vec![vec![0.0; FEATURE_COUNT]]), rows);

    for index in [-1, 2, i64::MAX, i64::MIN] {
        match explainer.explain_sample(index) {
            Err(ExplainError::IndexOutOfRange { index: i, row_count }) => {
                assert_eq!(i, index);
                assert_eq!(row_count, 2);
            }
            other => panic!("expected index error for {}, got {:?}", index, other),
        }
    }
    assert!(explainer.explain_sample(1).is_ok());
}

#[test]
fn test_explain_is_deterministic() {
    let (row, attr) = clear_flags_sample();
    let explainer = engine(
        CannedModel::new(1, vec![0.1, 0.85, 0.05], attr),
        dataset(vec![(row, "CONFIRMED")]),
    );
    assert_eq!(
        explainer.explain_sample_json(0).unwrap(),
        explainer.explain_sample_json(0).unwrap()
    );
}

#[test]
fn test_record_json_shape() {
    let (row, attr) = clear_flags_sample();
    let explainer = engine(
        CannedModel::new(1, vec![0.1, 0.85, 0.05], attr),
        dataset(vec![(row, "CONFIRMED")]),
    );

    let json = explainer.explain_sample_json(0).unwrap();
    assert!(json.starts_with("{\n  \"prediction\": \"CONFIRMED\""));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let criteria = value["criteria"].as_object().unwrap();
    assert_eq!(criteria.len(), 5);
    for criterion in CRITERIA {
        let entry = &criteria[criterion.as_str()];
        assert!(entry["score"].is_u64());
        assert!(entry["visual"]["type"].is_string());
    }

    // Keys appear in taxonomy order
    let positions: Vec<usize> = CRITERIA
        .iter()
        .map(|c| json.find(&format!("\"{}\"", c.as_str())).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_collaborator_failure_propagates() {
    let model = Arc::new(CannedModel::new(0, vec![1.0, 0.0, 0.0], vec![]));
    let rows = dataset(vec![(vec![0.0; FEATURE_COUNT], "CANDIDATE")]);
    let explainer = SampleExplainer::new(model, Arc::new(BrokenExplainer), rows).unwrap();

    match explainer.explain_sample(0) {
        Err(ExplainError::Collaborator(ModelError::Inference(msg))) => {
            assert_eq!(msg, "explainer crashed")
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_contract_violations_are_collaborator_errors() {
    let rows = || dataset(vec![(vec![0.0; FEATURE_COUNT], "CANDIDATE")]);

    // No attribution vector for the predicted class
    let e = engine(CannedModel::new(2, vec![0.0, 0.0, 1.0], vec![vec![0.0; FEATURE_COUNT]]), rows());
    assert!(matches!(e.explain_sample(0), Err(ExplainError::Collaborator(ModelError::Contract(_)))));

    // No probability for the predicted class
    let e = engine(CannedModel::new(3, vec![0.5, 0.5], vec![vec![0.0; FEATURE_COUNT]; 4]), rows());
    assert!(matches!(e.explain_sample(0), Err(ExplainError::Collaborator(ModelError::Contract(_)))));

    // Wrong vector length
    let e = engine(CannedModel::new(0, vec![1.0], vec![vec![0.0; 3]]), rows());
    assert!(matches!(e.explain_sample(0), Err(ExplainError::Collaborator(ModelError::Contract(_)))));

    // Non-finite attribution
    let mut attr = vec![0.0; FEATURE_COUNT];
    attr[0] = f64::NAN;
    let e = engine(CannedModel::new(0, vec![1.0], vec![attr]), rows());
    assert!(matches!(e.explain_sample(0), Err(ExplainError::Collaborator(ModelError::Contract(_)))));
}

#[test]
fn test_construction_rejects_schema_drift() {
    let mut model = CannedModel::new(0, vec![1.0], vec![]);
    model.metadata.feature_names.swap(0, 1);
    let model = Arc::new(model);
    let rows = dataset(vec![]);

    match SampleExplainer::new(model.clone(), model, rows) {
        Err(err) => assert!(err.is_configuration_error()),
        Ok(_) => panic!("expected configuration error"),
    }
}

#[test]
fn test_handle_swaps_engine() {
    let first = engine(
        CannedModel::new(0, vec![1.0], vec![vec![0.0; FEATURE_COUNT]]),
        dataset(vec![(vec![0.0; FEATURE_COUNT], "CANDIDATE")]),
    );
    let handle = ExplainerHandle::new(first);
    let in_flight = handle.current();
    assert_eq!(in_flight.row_count(), 1);

    let second = engine(
        CannedModel::new(0, vec![1.0], vec![vec![0.0; FEATURE_COUNT]]),
        dataset(vec![
            (vec![0.0; FEATURE_COUNT], "CANDIDATE"),
            (vec![0.0; FEATURE_COUNT], "CONFIRMED"),
        ]),
    );
    let previous = handle.replace(second);

    assert_eq!(handle.current().row_count(), 2);
    assert_eq!(previous.row_count(), 1);
    // Snapshot taken before the swap keeps serving the old dataset
    assert_eq!(in_flight.explain_sample(0).unwrap().prediction, "CANDIDATE");
    assert!(in_flight.explain_sample(1).is_err());
}
