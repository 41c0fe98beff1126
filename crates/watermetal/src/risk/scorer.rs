//! Potential Ecological Risk Index scoring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::class::{RiskClass, RiskThresholds};
use crate::dataset::{Dataset, Sample};
use crate::error::{Result, WaterMetalError};
use crate::reference::{MetalReference, ReferenceTable};

/// How single-metal risk factors combine into the aggregate index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFormula {
    /// Sum of single-metal risk factors (Hakanson RI).
    #[default]
    Sum,
    /// Sum divided by the number of scored metals.
    Mean,
}

/// Risk scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Cut points for classifying the aggregate index.
    pub thresholds: RiskThresholds,
    /// Cut points for classifying single-metal risk factors.
    pub metal_thresholds: RiskThresholds,
    /// Aggregation formula.
    pub formula: RiskFormula,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::index_default(),
            metal_thresholds: RiskThresholds::metal_default(),
            formula: RiskFormula::Sum,
        }
    }
}

/// Risk contribution of one metal in one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalRisk {
    /// Measured concentration.
    pub concentration: f64,
    /// Measured / background concentration.
    pub contamination_factor: f64,
    /// Toxic response × contamination factor (Er).
    pub risk_factor: f64,
    /// Class of the single-metal risk factor.
    pub class: RiskClass,
}

/// Why a metal was left out of a sample's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No concentration was measured.
    MissingValue,
    /// The concentration failed validation (e.g. negative).
    InvalidValue,
}

/// A metal excluded from one sample's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedMetal {
    pub metal: String,
    pub reason: ExclusionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Per-sample scoring output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub sample_id: String,
    /// Scored metals in column order.
    pub metals: IndexMap<String, MetalRisk>,
    /// Aggregate ecological risk index.
    pub index: f64,
    pub class: RiskClass,
    /// True when any referenced metal was excluded for this sample.
    pub partial_coverage: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedMetal>,
}

impl RiskResult {
    /// Sum of the included single-metal risk factors.
    pub fn risk_factor_sum(&self) -> f64 {
        self.metals.values().map(|m| m.risk_factor).sum()
    }
}

/// Scoring output for a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Metals that had reference values and were scored.
    pub scored_metals: Vec<String>,
    /// Metal columns skipped for lack of reference values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreferenced_metals: Vec<String>,
    /// One result per sample, in dataset order.
    pub results: Vec<RiskResult>,
}

impl RiskAssessment {
    /// Number of samples with at least one excluded metal.
    pub fn partial_count(&self) -> usize {
        self.results.iter().filter(|r| r.partial_coverage).count()
    }
}

/// Computes contamination factors, risk factors and the aggregate index.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Score every sample of a dataset.
    ///
    /// Metal columns without a reference entry are skipped and listed in
    /// [`RiskAssessment::unreferenced_metals`]. Missing or invalid
    /// concentrations only exclude that metal from that sample.
    ///
    /// # Errors
    ///
    /// [`WaterMetalError::InsufficientData`] when no metal column has a
    /// reference, [`WaterMetalError::InvalidInput`] when a reference used by
    /// the dataset is not positive.
    pub fn score(&self, dataset: &Dataset, references: &ReferenceTable) -> Result<RiskAssessment> {
        let (scored, unreferenced): (Vec<&String>, Vec<&String>) = dataset
            .metals()
            .iter()
            .partition(|m| references.contains(m));

        for metal in &unreferenced {
            log::warn!("no reference values for '{}', metal excluded from scoring", metal);
        }
        if scored.is_empty() {
            return Err(WaterMetalError::InsufficientData(format!(
                "none of the metal columns ({}) has reference values",
                dataset.metals().join(", ")
            )));
        }

        let mut scored_refs = Vec::with_capacity(scored.len());
        for metal in &scored {
            let reference = references
                .get(metal)
                .ok_or_else(|| WaterMetalError::MissingReference {
                    metal: metal.to_string(),
                })?;
            reference.validate(metal)?;
            scored_refs.push((metal.as_str(), reference));
        }

        let results: Vec<RiskResult> = dataset
            .samples()
            .iter()
            .map(|sample| self.score_sample(sample, &scored_refs))
            .collect();

        log::debug!(
            "scored {} samples over {} metals",
            results.len(),
            scored_refs.len()
        );

        Ok(RiskAssessment {
            scored_metals: scored.into_iter().cloned().collect(),
            unreferenced_metals: unreferenced.into_iter().cloned().collect(),
            results,
        })
    }

    fn score_sample(&self, sample: &Sample, references: &[(&str, &MetalReference)]) -> RiskResult {
        let mut metals = IndexMap::with_capacity(references.len());
        let mut excluded = Vec::new();

        for &(metal, reference) in references {
            let Some(concentration) = sample.concentration(metal) else {
                excluded.push(ExcludedMetal {
                    metal: metal.to_string(),
                    reason: ExclusionReason::MissingValue,
                    detail: None,
                });
                continue;
            };

            match factor_for(metal, concentration, reference) {
                Ok(contamination_factor) => {
                    let risk_factor = reference.toxic_response * contamination_factor;
                    metals.insert(
                        metal.to_string(),
                        MetalRisk {
                            concentration,
                            contamination_factor,
                            risk_factor,
                            class: self.config.metal_thresholds.classify(risk_factor),
                        },
                    );
                }
                Err(e) => {
                    log::warn!("sample '{}': {}", sample.id, e);
                    excluded.push(ExcludedMetal {
                        metal: metal.to_string(),
                        reason: ExclusionReason::InvalidValue,
                        detail: Some(e.to_string()),
                    });
                }
            }
        }

        let sum: f64 = metals.values().map(|m: &MetalRisk| m.risk_factor).sum();
        let index = match self.config.formula {
            RiskFormula::Sum => sum,
            RiskFormula::Mean if metals.is_empty() => 0.0,
            RiskFormula::Mean => sum / metals.len() as f64,
        };

        RiskResult {
            sample_id: sample.id.clone(),
            metals,
            index,
            class: self.config.thresholds.classify(index),
            partial_coverage: !excluded.is_empty(),
            excluded,
        }
    }
}

/// Measured / background concentration of a metal.
///
/// # Errors
///
/// [`WaterMetalError::MissingReference`] if the table has no entry for the
/// metal; [`WaterMetalError::InvalidInput`] if the background is not
/// positive or the concentration is negative or not finite.
pub fn contamination_factor(
    metal: &str,
    concentration: f64,
    references: &ReferenceTable,
) -> Result<f64> {
    factor_for(metal, concentration, checked_reference(metal, references)?)
}

/// Single-metal ecological risk factor: toxic response × contamination factor.
pub fn risk_factor(metal: &str, concentration: f64, references: &ReferenceTable) -> Result<f64> {
    let reference = checked_reference(metal, references)?;
    Ok(reference.toxic_response * factor_for(metal, concentration, reference)?)
}

fn checked_reference<'a>(
    metal: &str,
    references: &'a ReferenceTable,
) -> Result<&'a MetalReference> {
    let reference = references
        .get(metal)
        .ok_or_else(|| WaterMetalError::MissingReference {
            metal: metal.to_string(),
        })?;
    reference.validate(metal)?;
    Ok(reference)
}

fn factor_for(metal: &str, concentration: f64, reference: &MetalReference) -> Result<f64> {
    if !concentration.is_finite() {
        return Err(WaterMetalError::InvalidInput(format!(
            "concentration of '{}' is not a finite number",
            metal
        )));
    }
    if concentration < 0.0 {
        return Err(WaterMetalError::InvalidInput(format!(
            "concentration of '{}' is negative ({})",
            metal, concentration
        )));
    }
    Ok(concentration / reference.background)
}
