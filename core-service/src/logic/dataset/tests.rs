use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use super::record::FeedbackRecord;
use super::source::{read_csv, RowSource, DEFAULT_LABEL_COLUMN};
use super::writer::FeedbackWriter;
use super::{export_jsonl, DatasetError};
use crate::logic::features::{FeatureSchema, FEATURE_LAYOUT};
use crate::logic::taxonomy::Criterion;

fn koi_csv(rows: &[(&str, Vec<&str>)]) -> String {
    let mut out = String::from("# KOI cumulative table export\n# columns documented upstream\n");
    out.push_str("kepoi_name,");
    out.push_str(DEFAULT_LABEL_COLUMN);
    for name in FEATURE_LAYOUT {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for (i, (label, values)) in rows.iter().enumerate() {
        out.push_str(&format!("K{:05}.01,{}", i, label));
        for v in values {
            out.push(',');
            out.push_str(v);
        }
        out.push('\n');
    }
    out
}

#[test]
fn test_csv_rows_and_labels() {
    let mut values = vec!["1"; 15];
    values[0] = "615.8";
    let csv = koi_csv(&[("CONFIRMED", values), ("FALSE POSITIVE", vec!["0"; 15])]);

    let dataset = read_csv(csv.as_bytes(), FeatureSchema::shared_koi(), DEFAULT_LABEL_COLUMN).unwrap();
    assert_eq!(dataset.row_count(), 2);

    let first = dataset.row_at(0).unwrap();
    assert_eq!(first.label, "CONFIRMED");
    assert_eq!(first.row.get("koi_depth").unwrap(), 615.8);
    assert_eq!(first.row.get("koi_slogg").unwrap(), 1.0);

    assert_eq!(dataset.row_at(1).unwrap().label, "FALSE POSITIVE");
}

#[test]
fn test_csv_missing_values_are_zero_filled() {
    let mut values = vec!["2"; 15];
    values[13] = ""; // koi_srad
    values[10] = "nan"; // koi_teq
    let csv = koi_csv(&[("CANDIDATE", values)]);

    let dataset = read_csv(csv.as_bytes(), FeatureSchema::shared_koi(), DEFAULT_LABEL_COLUMN).unwrap();
    let record = dataset.row_at(0).unwrap();
    assert_eq!(record.row.get("koi_srad").unwrap(), 0.0);
    assert_eq!(record.row.get("koi_teq").unwrap(), 0.0);
    assert_eq!(record.row.get("koi_prad").unwrap(), 2.0);
}

#[test]
fn test_csv_missing_column_is_configuration_error() {
    let csv = "koi_disposition,koi_depth\nCONFIRMED,1.0\n";
    let err = read_csv(csv.as_bytes(), FeatureSchema::shared_koi(), DEFAULT_LABEL_COLUMN).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "koi_duration"));
    assert!(err.is_configuration());
}

#[test]
fn test_csv_missing_label_column() {
    let schema = Arc::new(FeatureSchema::new(["koi_depth"]).unwrap());
    let err = read_csv("koi_depth\n1.0\n".as_bytes(), schema, DEFAULT_LABEL_COLUMN).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == DEFAULT_LABEL_COLUMN));
}

#[test]
fn test_csv_rejects_garbage_cell() {
    let mut values = vec!["0"; 15];
    values[2] = "long";
    let csv = koi_csv(&[("CANDIDATE", values)]);
    let err = read_csv(csv.as_bytes(), FeatureSchema::shared_koi(), DEFAULT_LABEL_COLUMN).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidValue { row: 0, ref column, .. } if column == "koi_period"));
}

#[test]
fn test_row_out_of_range() {
    let csv = koi_csv(&[("CANDIDATE", vec!["0"; 15])]);
    let dataset = read_csv(csv.as_bytes(), FeatureSchema::shared_koi(), DEFAULT_LABEL_COLUMN).unwrap();
    assert!(matches!(
        dataset.row_at(1),
        Err(DatasetError::RowOutOfRange { index: 1, row_count: 1 })
    ));
}

fn feedback(sample_index: usize) -> FeedbackRecord {
    let mut criteria = BTreeMap::new();
    criteria.insert(Criterion::FalsePositiveLikelihood, 80);
    criteria.insert(Criterion::TransitSignalReliability, 20);
    FeedbackRecord::new(sample_index, Some("FALSE POSITIVE".into()), criteria, None)
}

#[test]
fn test_feedback_append_and_read() {
    let dir = tempdir().unwrap();
    let writer = FeedbackWriter::from_path(dir.path().to_path_buf()).unwrap();

    let record = feedback(8);
    writer.append(&record).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap()).collect();
    assert_eq!(entries.len(), 1);
    let path = entries[0].path();
    assert!(path.extension().unwrap() == "jsonl");

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"False Positive Likelihood\":80"));

    let deserialized: FeedbackRecord = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(deserialized, record);
}

#[test]
fn test_feedback_criteria_serialize_in_display_order() {
    let json = serde_json::to_string(&feedback(0).criteria).unwrap();
    assert_eq!(json, r#"{"Transit Signal Reliability":20,"False Positive Likelihood":80}"#);
}

#[test]
fn test_feedback_appends_to_same_file() {
    let dir = tempdir().unwrap();
    let writer = FeedbackWriter::from_path(dir.path().to_path_buf()).unwrap();

    writer.append(&feedback(1)).unwrap();
    writer.append(&feedback(2)).unwrap();

    let stats = writer.stats().unwrap();
    assert_eq!(stats.total_files, 1);
    assert!(stats.current_file.starts_with("feedback-"));

    // A fresh writer resumes the latest file
    let resumed = FeedbackWriter::from_path(dir.path().to_path_buf()).unwrap();
    resumed.append(&feedback(3)).unwrap();
    assert_eq!(resumed.stats().unwrap().total_files, 1);
}

#[test]
fn test_export_merges_logs() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("feedback");
    let writer = FeedbackWriter::from_path(source.clone()).unwrap();
    writer.append(&feedback(1)).unwrap();
    writer.append(&feedback(2)).unwrap();

    let target = dir.path().join("export.jsonl");
    assert_eq!(export_jsonl(&source, &target).unwrap(), 1);

    let merged = fs::read_to_string(&target).unwrap();
    let indices: Vec<usize> = merged
        .lines()
        .map(|l| serde_json::from_str::<FeedbackRecord>(l).unwrap().sample_index)
        .collect();
    assert_eq!(indices, vec![1, 2]);
}

#[test]
fn test_export_missing_dir() {
    let dir = tempdir().unwrap();
    let err = export_jsonl(&dir.path().join("absent"), &dir.path().join("out.jsonl")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
