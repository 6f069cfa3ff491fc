//! Criteria Taxonomy
//!
//! Fixed mapping from human-readable criterion to the KOI features that
//! evidence it. Declaration order is display order. Membership overlaps
//! (e.g. `koi_depth` feeds two criteria).

use serde::{Deserialize, Serialize};

use crate::logic::error::{ExplainError, ExplainResult};
use crate::logic::features::FeatureSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criterion {
    #[serde(rename = "Transit Signal Reliability")]
    TransitSignalReliability,
    #[serde(rename = "False Positive Likelihood")]
    FalsePositiveLikelihood,
    #[serde(rename = "Planetary Plausibility")]
    PlanetaryPlausibility,
    #[serde(rename = "Orbit Plausibility")]
    OrbitPlausibility,
    #[serde(rename = "Temperature Plausibility")]
    TemperaturePlausibility,
}

/// All criteria in display order
pub const CRITERIA: [Criterion; 5] = [
    Criterion::TransitSignalReliability,
    Criterion::FalsePositiveLikelihood,
    Criterion::PlanetaryPlausibility,
    Criterion::OrbitPlausibility,
    Criterion::TemperaturePlausibility,
];

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::TransitSignalReliability => "Transit Signal Reliability",
            Criterion::FalsePositiveLikelihood => "False Positive Likelihood",
            Criterion::PlanetaryPlausibility => "Planetary Plausibility",
            Criterion::OrbitPlausibility => "Orbit Plausibility",
            Criterion::TemperaturePlausibility => "Temperature Plausibility",
        }
    }

    /// Scoring members, in the order they are averaged
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Criterion::TransitSignalReliability => &[
                "koi_depth",
                "koi_duration",
                "koi_period",
                "koi_model_snr",
                "koi_impact",
            ],
            Criterion::FalsePositiveLikelihood => &[
                "koi_fpflag_nt",
                "koi_fpflag_ss",
                "koi_fpflag_co",
                "koi_fpflag_ec",
            ],
            Criterion::PlanetaryPlausibility => &["koi_prad", "koi_depth", "koi_srad"],
            Criterion::OrbitPlausibility => &["koi_period", "koi_duration", "koi_impact"],
            Criterion::TemperaturePlausibility => &["koi_teq", "koi_insol", "koi_steff"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CRITERIA.iter().copied().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Criterion {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| ExplainError::configuration(format!("unknown criterion '{}'", s)))
    }
}

/// Every taxonomy member must exist in the classifier's feature schema.
/// Reports the first missing feature; never skips it.
pub fn validate_taxonomy(schema: &FeatureSchema) -> ExplainResult<()> {
    for criterion in CRITERIA {
        for feature in criterion.features() {
            if !schema.contains(feature) {
                return Err(ExplainError::configuration(format!(
                    "criterion '{}' references feature '{}' missing from the feature schema",
                    criterion, feature
                )));
            }
        }
    }
    Ok(())
}
