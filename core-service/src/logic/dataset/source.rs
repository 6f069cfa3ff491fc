//! Row Sources - Dataset access by zero-based index
//!
//! The whole KOI table is read once at startup and held read-only.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::record::SampleRecord;
use super::DatasetError;
use crate::logic::features::{FeatureRow, FeatureSchema};

/// Default display-label column of the KOI table
pub const DEFAULT_LABEL_COLUMN: &str = "koi_disposition";

pub trait RowSource: Send + Sync {
    fn schema(&self) -> &Arc<FeatureSchema>;

    fn row_count(&self) -> usize;

    fn row_at(&self, index: usize) -> Result<SampleRecord, DatasetError>;
}

// ============================================================================
// IN-MEMORY
// ============================================================================

#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    schema: Arc<FeatureSchema>,
    records: Vec<SampleRecord>,
}

impl InMemoryDataset {
    pub fn new(schema: Arc<FeatureSchema>, records: Vec<SampleRecord>) -> Result<Self, DatasetError> {
        if let Some(i) = records.iter().position(|r| **r.row.schema() != *schema) {
            return Err(DatasetError::Schema(format!(
                "record {} is not aligned to the dataset schema",
                i
            )));
        }
        Ok(Self { schema, records })
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }
}

impl RowSource for InMemoryDataset {
    fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    fn row_count(&self) -> usize {
        self.records.len()
    }

    fn row_at(&self, index: usize) -> Result<SampleRecord, DatasetError> {
        self.records
            .get(index)
            .cloned()
            .ok_or(DatasetError::RowOutOfRange {
                index,
                row_count: self.records.len(),
            })
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Load a KOI CSV export from disk
pub fn load_csv(
    path: &Path,
    schema: Arc<FeatureSchema>,
    label_column: &str,
) -> Result<InMemoryDataset, DatasetError> {
    log::info!("Loading dataset from: {}", path.display());
    let file = File::open(path)?;
    let dataset = read_csv(file, schema, label_column)?;
    log::info!("Dataset loaded ({} rows)", dataset.row_count());
    Ok(dataset)
}

/// Parse KOI CSV: `#` lines are comments, first record is the header.
/// Empty cells are zero-filled; every schema column must be present.
pub fn read_csv<R: Read>(
    reader: R,
    schema: Arc<FeatureSchema>,
    label_column: &str,
) -> Result<InMemoryDataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
    let column_of = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    };

    let feature_columns = schema
        .names()
        .iter()
        .map(|name| column_of(name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let label_index = column_of(label_column)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result?;

        let mut values = Vec::with_capacity(feature_columns.len());
        for (&col, name) in feature_columns.iter().zip(schema.names()) {
            let cell = record.get(col).unwrap_or("");
            values.push(parse_cell(cell).ok_or_else(|| DatasetError::InvalidValue {
                row: row_index,
                column: name.clone(),
                value: cell.to_string(),
            })?);
        }

        let row = FeatureRow::new(Arc::clone(&schema), values)
            .map_err(|e| DatasetError::Schema(e.to_string()))?;
        let label = record.get(label_index).unwrap_or("").to_string();
        records.push(SampleRecord::new(row, label));
    }

    InMemoryDataset::new(schema, records)
}

/// Empty → 0.0, booleans → 1/0, otherwise a float
fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return Some(0.0);
    }
    if cell.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if cell.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    let value: f64 = cell.parse().ok()?;
    // pandas reads "nan" as missing; fill it like an empty cell
    Some(if value.is_nan() { 0.0 } else { value })
}
