use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::logic::taxonomy::Criterion;

// ============================================================================
// CRITERIA SCORES
// ============================================================================

/// Integer 0..=100 score per criterion, in taxonomy order.
/// Floor truncation means the total may fall short of 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaScores {
    entries: Vec<(Criterion, u8)>,
}

impl CriteriaScores {
    pub(crate) fn from_entries(entries: Vec<(Criterion, u8)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, criterion: Criterion) -> Option<u8> {
        self.entries
            .iter()
            .find(|(c, _)| *c == criterion)
            .map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u8)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, s)| *s as u32).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CriteriaScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (criterion, score) in &self.entries {
            map.serialize_entry(criterion.as_str(), score)?;
        }
        map.end()
    }
}

// ============================================================================
// VISUALIZATION PAYLOADS
// ============================================================================

/// Raw transit measurements shown as bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitFeatures {
    pub koi_depth: f64,
    pub koi_duration: f64,
    pub koi_model_snr: f64,
    pub koi_impact: f64,
    pub koi_period: f64,
}

/// False-positive flags coerced to integers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FalsePositiveFlags {
    pub koi_fpflag_nt: i64,
    pub koi_fpflag_ss: i64,
    pub koi_fpflag_co: i64,
    pub koi_fpflag_ec: i64,
}

impl FalsePositiveFlags {
    pub fn raised(&self) -> usize {
        [self.koi_fpflag_nt, self.koi_fpflag_ss, self.koi_fpflag_co, self.koi_fpflag_ec]
            .iter()
            .filter(|&&f| f != 0)
            .count()
    }
}

/// One visualization per criterion. Closed set: adding a criterion without a
/// payload shape is a compile error in `Visual::criterion` and the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    FeatureBars {
        features_used: TransitFeatures,
    },
    FlagBars {
        flags: FalsePositiveFlags,
    },
    PlanetVsStar {
        planet_radius: f64,
        star_radius: f64,
        /// `None` when the star radius is not positive
        ratio: Option<f64>,
    },
    OrbitPlot {
        period: f64,
        duration: f64,
        impact: f64,
    },
    TemperatureGauge {
        planet_teq: f64,
        stellar_teff: f64,
        insolation: f64,
    },
}

impl Visual {
    pub fn criterion(&self) -> Criterion {
        match self {
            Visual::FeatureBars { .. } => Criterion::TransitSignalReliability,
            Visual::FlagBars { .. } => Criterion::FalsePositiveLikelihood,
            Visual::PlanetVsStar { .. } => Criterion::PlanetaryPlausibility,
            Visual::OrbitPlot { .. } => Criterion::OrbitPlausibility,
            Visual::TemperatureGauge { .. } => Criterion::TemperaturePlausibility,
        }
    }

    /// Wire discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            Visual::FeatureBars { .. } => "feature_bars",
            Visual::FlagBars { .. } => "flag_bars",
            Visual::PlanetVsStar { .. } => "planet_vs_star",
            Visual::OrbitPlot { .. } => "orbit_plot",
            Visual::TemperatureGauge { .. } => "temperature_gauge",
        }
    }
}

/// Criterion-keyed payloads in taxonomy order
#[derive(Debug, Clone, PartialEq)]
pub struct Visuals {
    entries: Vec<Visual>,
}

impl Visuals {
    pub(crate) fn from_entries(entries: Vec<Visual>) -> Self {
        Self { entries }
    }

    pub fn get(&self, criterion: Criterion) -> Option<&Visual> {
        self.entries.iter().find(|v| v.criterion() == criterion)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Visual> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// EXPLANATION RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionExplanation {
    #[serde(skip)]
    pub criterion: Criterion,
    pub score: u8,
    pub visual: Visual,
}

/// Per-sample response: display label, predicted-class probability and
/// per-criterion score + visual
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationRecord {
    pub prediction: String,
    pub confidence: f64,
    #[serde(serialize_with = "serialize_criteria")]
    pub criteria: Vec<CriterionExplanation>,
}

impl ExplanationRecord {
    pub fn criterion(&self, criterion: Criterion) -> Option<&CriterionExplanation> {
        self.criteria.iter().find(|c| c.criterion == criterion)
    }
}

fn serialize_criteria<S: Serializer>(
    criteria: &[CriterionExplanation],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(criteria.len()))?;
    for entry in criteria {
        map.serialize_entry(entry.criterion.as_str(), entry)?;
    }
    map.end()
}
