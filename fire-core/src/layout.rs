//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema shared by the trainer and the
//! prediction service.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The layout hash is persisted with every trained artifact and checked when
//! the artifact is loaded, so a model can never be fed vectors in an order it
//! was not trained on.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// How a feature's value is carried in the request and the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Real-valued measurement
    Continuous,
    /// Category label encoded to an integer index at training time
    Encoded,
}

/// One entry of the feature layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn continuous(name: &'static str) -> FeatureSpec {
    FeatureSpec { name, kind: FeatureKind::Continuous }
}

const fn encoded(name: &'static str) -> FeatureSpec {
    FeatureSpec { name, kind: FeatureKind::Encoded }
}

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[FeatureSpec] = &[
    // === Fire Weather Index components (0-3) ===
    continuous("FFMC"),  // 0: Fine Fuel Moisture Code
    continuous("DMC"),   // 1: Duff Moisture Code
    continuous("DC"),    // 2: Drought Code
    continuous("ISI"),   // 3: Initial Spread Index

    // === Weather (4-7) ===
    continuous("temp"),  // 4: Temperature, Celsius
    continuous("RH"),    // 5: Relative humidity, %
    continuous("wind"),  // 6: Wind speed, km/h
    continuous("rain"),  // 7: Outside rain, mm/m2

    // === Calendar (8-9) ===
    encoded("month"),    // 8: Month label index
    encoded("day"),      // 9: Weekday label index
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 10;

/// Index of the month feature in the vector
pub const MONTH_INDEX: usize = 8;

/// Index of the day feature in the vector
pub const DAY_INDEX: usize = 9;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the layout version and ordered feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for spec in FEATURE_LAYOUT {
        hasher.update(spec.name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information, persisted inside the model artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_names: FEATURE_LAYOUT.iter().map(|spec| spec.name.to_string()).collect(),
        }
    }

    /// Check a persisted layout against the compiled-in one
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        let expected_hash = layout_hash();
        if self.version != FEATURE_VERSION || self.hash != expected_hash {
            return Err(LayoutMismatchError {
                expected_version: FEATURE_VERSION,
                expected_hash,
                actual_version: self.version,
                actual_hash: self.hash,
            });
        }
        Ok(())
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Fixed-order feature tuple consumed by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

/// A validated prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireWeather {
    pub ffmc: f64,
    pub dmc: f64,
    pub dc: f64,
    pub isi: f64,
    pub temp: f64,
    pub rh: f64,
    pub wind: f64,
    pub rain: f64,
    pub month: i64,
    pub day: i64,
}

impl FireWeather {
    /// Lay the fields out in FEATURE_LAYOUT order
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector([
            self.ffmc,
            self.dmc,
            self.dc,
            self.isi,
            self.temp,
            self.rh,
            self.wind,
            self.rain,
            self.month as f64,
            self.day as f64,
        ])
    }
}
