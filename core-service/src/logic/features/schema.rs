//! Feature Schema - Explicit name ↔ position association
//!
//! Feature rows and attribution vectors never travel as bare `Vec<f64>`:
//! both carry the schema they are aligned to, so alignment is checked on
//! construction instead of assumed by convention.

use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::layout::{compute_hash, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::logic::error::{ExplainError, ExplainResult};

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered feature names with O(1) name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from an ordered name list. Duplicate names are a
    /// configuration defect.
    pub fn new<I, S>(names: I) -> ExplainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());

        for (i, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(ExplainError::configuration(format!(
                    "duplicate feature '{}' in schema",
                    name
                )));
            }
        }

        Ok(Self { names, positions })
    }

    /// The 15-column KOI layout
    pub fn koi() -> Self {
        let names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub fn shared_koi() -> Arc<Self> {
        Arc::new(Self::koi())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position lookup that treats an unknown name as schema drift
    pub fn require(&self, name: &str) -> ExplainResult<usize> {
        self.position(name)
            .ok_or_else(|| ExplainError::missing_feature(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Layout hash, comparable with `layout::layout_hash()` for the KOI layout
    pub fn layout_hash(&self) -> u32 {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        compute_hash(FEATURE_VERSION, &names)
    }

    /// Fails unless `other` lists exactly the same names in the same order
    pub fn ensure_matches(&self, other: &[String], what: &str) -> ExplainResult<()> {
        if self.names.as_slice() != other {
            return Err(ExplainError::configuration(format!(
                "{} feature order {:?} does not match schema {:?}",
                what, other, self.names
            )));
        }
        Ok(())
    }
}

// ============================================================================
// ALIGNED VALUES
// ============================================================================

fn aligned(schema: &FeatureSchema, len: usize, what: &str) -> ExplainResult<()> {
    if schema.len() != len {
        return Err(ExplainError::configuration(format!(
            "{} has {} values but schema has {} features",
            what,
            len,
            schema.len()
        )));
    }
    Ok(())
}

/// One sample's feature values (missing values already zero-filled)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn new(schema: Arc<FeatureSchema>, values: Vec<f64>) -> ExplainResult<Self> {
        aligned(&schema, values.len(), "feature row")?;
        Ok(Self { schema, values })
    }

    pub fn get(&self, name: &str) -> ExplainResult<f64> {
        Ok(self.values[self.schema.require(name)?])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// f32 copy of the values, for tensor inputs
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Signed per-feature contributions toward one class, aligned to a schema
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl AttributionVector {
    pub fn new(schema: Arc<FeatureSchema>, values: Vec<f64>) -> ExplainResult<Self> {
        aligned(&schema, values.len(), "attribution vector")?;
        Ok(Self { schema, values })
    }

    pub fn get(&self, name: &str) -> ExplainResult<f64> {
        Ok(self.values[self.schema.require(name)?])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Same schema, every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }
}
