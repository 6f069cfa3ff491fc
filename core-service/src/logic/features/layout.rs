//! Feature Layout - KOI column order shared by every artifact
//!
//! The classifier, the explainer, the criteria taxonomy and the feedback log
//! are all written against this exact column order. Any edit to the list
//! (add, remove, reorder) bumps `FEATURE_VERSION`, which changes the layout
//! hash and makes stale artifacts fail to load.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Bumped on every change to `FEATURE_LAYOUT`
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// KOI column names in exact order the classifier was trained on
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Transit signal (0-4) ===
    "koi_depth",             // 0: Transit depth (ppm)
    "koi_duration",          // 1: Transit duration (hours)
    "koi_period",            // 2: Orbital period (days)
    "koi_impact",            // 3: Impact parameter
    "koi_model_snr",         // 4: Transit signal-to-noise

    // === False positive flags (5-8) ===
    "koi_fpflag_nt",         // 5: Not transit-like
    "koi_fpflag_ss",         // 6: Stellar eclipse
    "koi_fpflag_co",         // 7: Centroid offset
    "koi_fpflag_ec",         // 8: Ephemeris match

    // === Planet (9-11) ===
    "koi_prad",              // 9: Planetary radius (Earth radii)
    "koi_teq",               // 10: Equilibrium temperature (K)
    "koi_insol",             // 11: Insolation flux (Earth flux)

    // === Host star (12-14) ===
    "koi_steff",             // 12: Stellar effective temperature (K)
    "koi_srad",              // 13: Stellar radius (Solar radii)
    "koi_slogg",             // 14: Stellar surface gravity (log10 cm/s^2)
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 15;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte, then each name NUL-terminated
pub fn compute_hash(version: u8, names: &[&str]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_hash(FEATURE_VERSION, FEATURE_LAYOUT)
}

/// Layout summary served by `/api/layout` and printed by `koi-explain --layout`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        LayoutInfo {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_LAYOUT.len(),
            feature_names: FEATURE_LAYOUT.iter().map(|name| name.to_string()).collect(),
        }
    }
}

// ============================================================================
// ARTIFACT CHECK
// ============================================================================

/// An artifact was stamped with a different layout than this build's
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "artifact built for layout v{found_version} ({found_hash:08x}), this build expects v{expected_version} ({expected_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub found_version: u8,
    pub found_hash: u32,
}

/// Check a (version, hash) stamp carried by a model artifact
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    if version == FEATURE_VERSION && hash == expected_hash {
        return Ok(());
    }
    Err(LayoutMismatchError {
        expected_version: FEATURE_VERSION,
        expected_hash,
        found_version: version,
        found_hash: hash,
    })
}

/// Position of a KOI column, `None` for non-feature columns such as the label
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
