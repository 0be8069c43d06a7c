//! Risk mapping - probability → (fire flag, score, level)
//!
//! Boundaries belong to the higher band. The fire flag uses its own
//! threshold, independent of the Medium/High boundary.

use serde::{Deserialize, Serialize};

/// Lower bound of the High band
pub const HIGH_RISK_MIN: f64 = 0.75;

/// Lower bound of the Medium band
pub const MEDIUM_RISK_MIN: f64 = 0.40;

/// Probability at which `fire_risk` becomes true
pub const FIRE_RISK_THRESHOLD: f64 = 0.5;

/// Categorical banding of the fire probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_MIN {
            RiskLevel::High
        } else if probability >= MEDIUM_RISK_MIN {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_fire_risk(probability: f64) -> bool {
    probability >= FIRE_RISK_THRESHOLD
}

/// Round to 2 decimals on the exact decimal value of the float, ties to even
pub fn round_score(probability: f64) -> f64 {
    format!("{:.2}", probability).parse().unwrap_or(probability)
}

/// Response body of a successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub fire_risk: bool,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            fire_risk: is_fire_risk(probability),
            risk_score: round_score(probability),
            risk_level: RiskLevel::from_probability(probability),
        }
    }
}
