//! Pattern analysis engine.
//!
//! Correlation between metal columns and principal components of the
//! standardized concentrations reveal metals that rise and fall together,
//! which usually points at a shared pollution source.

mod correlation;
mod eigen;
mod pca;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, InvalidCell};
use crate::error::{Result, WaterMetalError};

pub use correlation::{correlation_matrix, pearson, CorrelationMatrix};
pub use pca::{
    principal_components, PcaConfig, PcaExclusion, PcaExclusionReason, PcaResult,
    PrincipalComponent, SampleScores,
};

/// Correlation matrix and principal components of one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternResult {
    pub correlation: CorrelationMatrix,
    /// None when the data cannot support a decomposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pca: Option<PcaResult>,
    /// Why PCA was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pca_skipped: Option<String>,
    /// Readings left out of correlation and PCA as negative or non-finite.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_values: Vec<InvalidCell>,
}

/// Runs correlation and PCA with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: PcaConfig,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PcaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    /// Correlate every metal pair and decompose the standardized matrix.
    ///
    /// The correlation matrix is always produced. A dataset too thin for
    /// PCA yields `pca = None` with the reason in `pca_skipped`.
    ///
    /// # Errors
    ///
    /// [`WaterMetalError::Config`] for an invalid PCA configuration.
    pub fn analyze(&self, dataset: &Dataset) -> Result<PatternResult> {
        let invalid_values = dataset.invalid_cells();
        if !invalid_values.is_empty() {
            log::warn!(
                "{} negative or non-finite reading(s) treated as missing",
                invalid_values.len()
            );
        }

        let (pca, pca_skipped) = match principal_components(dataset, &self.config) {
            Ok(pca) => (Some(pca), None),
            Err(WaterMetalError::InsufficientData(message)) => {
                log::warn!("PCA skipped: {}", message);
                (None, Some(message))
            }
            Err(e) => return Err(e),
        };

        Ok(PatternResult {
            correlation: correlation_matrix(dataset),
            pca,
            pca_skipped,
            invalid_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Sample;

    fn metals(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_correlation_survives_skipped_pca() {
        let dataset = Dataset::new(
            metals(&["Pb", "Zn", "Cu"]),
            vec![
                Sample::new("A").with("Pb", 40.0).with("Zn", 100.0).with_missing("Cu"),
                Sample::new("B").with("Pb", 20.0).with_missing("Zn").with("Cu", 5.0),
                Sample::new("C").with_missing("Pb").with("Zn", 125.0).with("Cu", 8.0),
                Sample::new("D").with("Pb", 30.0).with("Zn", 90.0).with_missing("Cu"),
            ],
        )
        .unwrap();
        let result = PatternAnalyzer::new().analyze(&dataset).unwrap();

        assert!(result.pca.is_none());
        assert!(result.pca_skipped.as_deref().unwrap().contains("complete samples"));
        // A and D are complete for Pb/Zn
        let r = result.correlation.get("Pb", "Zn").unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(result.correlation.get("Pb", "Cu").unwrap().is_nan());
    }

    #[test]
    fn test_invalid_values_reported() {
        let dataset = Dataset::new(
            metals(&["Pb", "Zn"]),
            vec![
                Sample::new("A").with("Pb", -500.0).with("Zn", 100.0),
                Sample::new("B").with("Pb", 20.0).with("Zn", 80.0),
                Sample::new("C").with("Pb", 10.0).with("Zn", 125.0),
                Sample::new("D").with("Pb", 30.0).with("Zn", 90.0),
            ],
        )
        .unwrap();
        let result = PatternAnalyzer::new().analyze(&dataset).unwrap();

        assert_eq!(result.invalid_values.len(), 1);
        assert_eq!(result.invalid_values[0].sample_id, "A");
        assert_eq!(result.pca.unwrap().dropped_samples, vec!["A".to_string()]);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dataset = Dataset::new(
            metals(&["Pb"]),
            vec![Sample::new("A").with("Pb", 1.0), Sample::new("B").with("Pb", 2.0)],
        )
        .unwrap();
        let analyzer = PatternAnalyzer::with_config(PcaConfig {
            variance_threshold: 0.0,
            ..PcaConfig::default()
        });
        assert!(matches!(analyzer.analyze(&dataset), Err(WaterMetalError::Config(_))));
    }
}
