//! Visualization Builder
//!
//! Reads raw feature values (not attributions) and shapes one payload per
//! criterion. Values pass through unchanged except the flag integer
//! coercion and the guarded radius ratio.

use super::types::{FalsePositiveFlags, TransitFeatures, Visual, Visuals};
use crate::logic::error::ExplainResult;
use crate::logic::features::FeatureRow;
use crate::logic::taxonomy::{Criterion, CRITERIA};

/// Build the payloads for every criterion, in taxonomy order
pub fn build_visuals(row: &FeatureRow) -> ExplainResult<Visuals> {
    let mut entries = Vec::with_capacity(CRITERIA.len());
    for criterion in CRITERIA {
        entries.push(build_visual(criterion, row)?);
    }
    Ok(Visuals::from_entries(entries))
}

pub fn build_visual(criterion: Criterion, row: &FeatureRow) -> ExplainResult<Visual> {
    let visual = match criterion {
        Criterion::TransitSignalReliability => Visual::FeatureBars {
            features_used: TransitFeatures {
                koi_depth: row.get("koi_depth")?,
                koi_duration: row.get("koi_duration")?,
                koi_model_snr: row.get("koi_model_snr")?,
                koi_impact: row.get("koi_impact")?,
                koi_period: row.get("koi_period")?,
            },
        },
        Criterion::FalsePositiveLikelihood => Visual::FlagBars {
            flags: FalsePositiveFlags {
                koi_fpflag_nt: flag(row.get("koi_fpflag_nt")?),
                koi_fpflag_ss: flag(row.get("koi_fpflag_ss")?),
                koi_fpflag_co: flag(row.get("koi_fpflag_co")?),
                koi_fpflag_ec: flag(row.get("koi_fpflag_ec")?),
            },
        },
        Criterion::PlanetaryPlausibility => {
            let planet_radius = row.get("koi_prad")?;
            let star_radius = row.get("koi_srad")?;
            Visual::PlanetVsStar {
                planet_radius,
                star_radius,
                ratio: radius_ratio(planet_radius, star_radius),
            }
        }
        Criterion::OrbitPlausibility => Visual::OrbitPlot {
            period: row.get("koi_period")?,
            duration: row.get("koi_duration")?,
            impact: row.get("koi_impact")?,
        },
        Criterion::TemperaturePlausibility => Visual::TemperatureGauge {
            planet_teq: row.get("koi_teq")?,
            stellar_teff: row.get("koi_steff")?,
            insolation: row.get("koi_insol")?,
        },
    };
    Ok(visual)
}

/// Integer cast: truncates toward zero, NaN becomes 0
fn flag(value: f64) -> i64 {
    value as i64
}

/// planet / star, only for a positive star radius and a finite result
pub fn radius_ratio(planet_radius: f64, star_radius: f64) -> Option<f64> {
    if star_radius > 0.0 {
        Some(planet_radius / star_radius).filter(|r| r.is_finite())
    } else {
        None
    }
}
