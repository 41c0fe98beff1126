//! Ordered risk classes and the cut points that separate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaterMetalError};

/// Ecological risk class, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    Low,
    Moderate,
    Considerable,
    High,
    VeryHigh,
}

impl RiskClass {
    pub const ALL: [RiskClass; 5] = [
        RiskClass::Low,
        RiskClass::Moderate,
        RiskClass::Considerable,
        RiskClass::High,
        RiskClass::VeryHigh,
    ];

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskClass::Low => "Low",
            RiskClass::Moderate => "Moderate",
            RiskClass::Considerable => "Considerable",
            RiskClass::High => "High",
            RiskClass::VeryHigh => "Very high",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Four strictly increasing cut points separating the five classes.
///
/// A value `v` belongs to the class whose interval `[lower, upper)` contains
/// it, so a value equal to a cut point falls in the higher class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RiskThresholds {
    cut_points: [f64; 4],
}

impl RiskThresholds {
    pub fn new(cut_points: [f64; 4]) -> Result<Self> {
        if cut_points.iter().any(|c| !c.is_finite()) {
            return Err(WaterMetalError::Config(
                "risk thresholds must be finite".to_string(),
            ));
        }
        if cut_points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(WaterMetalError::Config(format!(
                "risk thresholds must be strictly increasing, got {:?}",
                cut_points
            )));
        }
        Ok(Self { cut_points })
    }

    /// Cut points for the aggregate index: 150, 300, 600, 1200.
    pub fn index_default() -> Self {
        Self {
            cut_points: [150.0, 300.0, 600.0, 1200.0],
        }
    }

    /// Cut points for a single-metal risk factor: 40, 80, 160, 320.
    pub fn metal_default() -> Self {
        Self {
            cut_points: [40.0, 80.0, 160.0, 320.0],
        }
    }

    pub fn cut_points(&self) -> &[f64; 4] {
        &self.cut_points
    }

    /// Classify a value; lower bounds are inclusive.
    pub fn classify(&self, value: f64) -> RiskClass {
        let passed = self.cut_points.iter().filter(|&&c| value >= c).count();
        RiskClass::ALL[passed]
    }

    /// Inclusive lower bound of a class (`0.0` for [`RiskClass::Low`]).
    pub fn lower_bound(&self, class: RiskClass) -> f64 {
        match class.index() {
            0 => 0.0,
            i => self.cut_points[i - 1],
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::index_default()
    }
}

impl TryFrom<Vec<f64>> for RiskThresholds {
    type Error = WaterMetalError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        let cut_points: [f64; 4] = values.try_into().map_err(|v: Vec<f64>| {
            WaterMetalError::Config(format!(
                "expected 4 risk thresholds, got {}",
                v.len()
            ))
        })?;
        Self::new(cut_points)
    }
}

impl From<RiskThresholds> for Vec<f64> {
    fn from(thresholds: RiskThresholds) -> Self {
        thresholds.cut_points.to_vec()
    }
}
