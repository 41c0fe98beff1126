//! Principal component analysis of standardized concentrations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::correlation::is_constant;
use super::eigen::jacobi_eigen;
use crate::dataset::Dataset;
use crate::error::{Result, WaterMetalError};

/// Slack when comparing cumulative variance against the threshold.
const RETENTION_EPSILON: f64 = 1e-9;

/// PCA configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaConfig {
    /// Keep components until their cumulative explained variance reaches
    /// this fraction, in `(0, 1]`.
    pub variance_threshold: f64,
    /// Upper bound on retained components.
    pub max_components: Option<usize>,
    /// Drop constant columns before decomposition instead of keeping them
    /// as all-zero standardized columns.
    pub exclude_zero_variance: bool,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            variance_threshold: 0.8,
            max_components: None,
            exclude_zero_variance: true,
        }
    }
}

impl PcaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.variance_threshold > 0.0 && self.variance_threshold <= 1.0) {
            return Err(WaterMetalError::Config(format!(
                "PCA variance threshold must be in (0, 1], got {}",
                self.variance_threshold
            )));
        }
        if self.max_components == Some(0) {
            return Err(WaterMetalError::Config(
                "PCA max_components must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a metal column took no part in the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcaExclusionReason {
    /// The column holds no values at all.
    NoData,
    /// The column holds a single value.
    TooFewValues,
    /// Every used sample has the same value.
    ZeroVariance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaExclusion {
    pub metal: String,
    pub reason: PcaExclusionReason,
}

/// One retained principal component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipalComponent {
    /// 1-based component number (PC1, PC2, ...).
    pub number: usize,
    pub eigenvalue: f64,
    pub explained_variance_ratio: f64,
    pub cumulative_variance_ratio: f64,
    /// Unit-length loading vector over the decomposed metals. The entry
    /// with the largest magnitude is always positive.
    pub loadings: IndexMap<String, f64>,
}

impl PrincipalComponent {
    /// Metal with the largest absolute loading.
    pub fn dominant_metal(&self) -> Option<&str> {
        self.loadings
            .iter()
            .fold(None, |best: Option<(&String, f64)>, (metal, &l)| match best {
                Some((_, b)) if b >= l.abs() => best,
                _ => Some((metal, l.abs())),
            })
            .map(|(metal, _)| metal.as_str())
    }
}

/// Coordinates of one sample on the retained components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleScores {
    pub sample_id: String,
    pub scores: Vec<f64>,
}

/// Result of the decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaResult {
    /// Metals that entered the decomposition, in column order.
    pub metals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_metals: Vec<PcaExclusion>,
    /// Samples left out because a decomposed metal was missing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_samples: Vec<String>,
    /// Eigenvalues of every component, descending.
    pub eigenvalues: Vec<f64>,
    /// Retained components, descending explained variance.
    pub components: Vec<PrincipalComponent>,
    /// Per-sample scores on the retained components.
    pub scores: Vec<SampleScores>,
}

impl PcaResult {
    /// Metals excluded for having zero variance.
    pub fn zero_variance_metals(&self) -> impl Iterator<Item = &str> {
        self.excluded_metals
            .iter()
            .filter(|e| e.reason == PcaExclusionReason::ZeroVariance)
            .map(|e| e.metal.as_str())
    }

    /// Metals excluded for holding fewer than two usable values.
    pub fn sparse_metals(&self) -> impl Iterator<Item = &str> {
        self.excluded_metals
            .iter()
            .filter(|e| e.reason != PcaExclusionReason::ZeroVariance)
            .map(|e| e.metal.as_str())
    }


    /// Total explained variance of the retained components.
    pub fn retained_variance(&self) -> f64 {
        self.components
            .last()
            .map_or(0.0, |c| c.cumulative_variance_ratio)
    }
}

/// Run PCA on the dataset's concentration matrix.
///
/// Negative or non-finite readings count as missing. Columns with fewer
/// than two values are excluded first; the remaining columns are restricted
/// to samples that have every value (listwise deletion), then standardized
/// with the sample standard deviation. The decomposition is of the
/// correlation matrix of the standardized data.
///
/// # Errors
///
/// [`WaterMetalError::InsufficientData`] when fewer than two complete
/// samples remain or no column has variance.
pub fn principal_components(dataset: &Dataset, config: &PcaConfig) -> Result<PcaResult> {
    config.validate()?;

    let mut excluded_metals = Vec::new();
    let mut candidates: Vec<(&str, Vec<Option<f64>>)> = Vec::new();
    for metal in dataset.metals() {
        let column = dataset.valid_column(metal).unwrap_or_default();
        let reason = match column.iter().flatten().count() {
            0 => PcaExclusionReason::NoData,
            1 => PcaExclusionReason::TooFewValues,
            _ => {
                candidates.push((metal.as_str(), column));
                continue;
            }
        };
        log::warn!("PCA: '{}' has fewer than 2 usable values and is excluded", metal);
        excluded_metals.push(PcaExclusion {
            metal: metal.clone(),
            reason,
        });
    }

    let mut used_rows = Vec::new();
    let mut dropped_samples = Vec::new();
    for (row, sample) in dataset.samples().iter().enumerate() {
        if candidates.iter().all(|(_, col)| col[row].is_some()) {
            used_rows.push(row);
        } else {
            dropped_samples.push(sample.id.clone());
        }
    }
    if !dropped_samples.is_empty() {
        log::warn!(
            "PCA: {} sample(s) with missing values left out",
            dropped_samples.len()
        );
    }
    if used_rows.len() < 2 {
        return Err(WaterMetalError::InsufficientData(format!(
            "PCA needs at least 2 complete samples, found {}",
            used_rows.len()
        )));
    }

    // Standardize each column over the used rows.
    let n = used_rows.len();
    let mut metals = Vec::new();
    let mut z_columns: Vec<Vec<f64>> = Vec::new();
    for (metal, column) in &candidates {
        let values: Vec<f64> = used_rows.iter().filter_map(|&r| column[r]).collect();
        if is_constant(&values) {
            if config.exclude_zero_variance {
                log::warn!("PCA: '{}' has zero variance and is excluded", metal);
                excluded_metals.push(PcaExclusion {
                    metal: metal.to_string(),
                    reason: PcaExclusionReason::ZeroVariance,
                });
                continue;
            }
            metals.push(metal.to_string());
            z_columns.push(vec![0.0; n]);
            continue;
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let sd = var.sqrt();
        metals.push(metal.to_string());
        z_columns.push(values.iter().map(|v| (v - mean) / sd).collect());
    }

    let p = metals.len();
    if p == 0 {
        return Err(WaterMetalError::InsufficientData(
            "no metal column with variance left for PCA".to_string(),
        ));
    }

    let mut corr = vec![0.0; p * p];
    for i in 0..p {
        for j in i..p {
            let dot: f64 = z_columns[i]
                .iter()
                .zip(&z_columns[j])
                .map(|(a, b)| a * b)
                .sum();
            let c = dot / (n - 1) as f64;
            corr[i * p + j] = c;
            corr[j * p + i] = c;
        }
    }

    let eigen = jacobi_eigen(&corr, p);
    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&a, &b| eigen.values[b].total_cmp(&eigen.values[a]));

    let eigenvalues: Vec<f64> = order.iter().map(|&k| eigen.values[k].max(0.0)).collect();
    let total: f64 = eigenvalues.iter().sum();
    if total <= 0.0 {
        return Err(WaterMetalError::InsufficientData(
            "standardized data has no variance to decompose".to_string(),
        ));
    }

    let limit = config.max_components.unwrap_or(p).min(p);
    let mut components = Vec::new();
    let mut cumulative = 0.0;
    for (rank, &k) in order.iter().enumerate().take(limit) {
        let eigenvalue = eigenvalues[rank];
        let ratio = eigenvalue / total;
        cumulative += ratio;

        let mut vector: Vec<f64> = (0..p).map(|row| eigen.vector_component(row, k)).collect();
        orient(&mut vector);

        components.push(PrincipalComponent {
            number: rank + 1,
            eigenvalue,
            explained_variance_ratio: ratio,
            cumulative_variance_ratio: cumulative,
            loadings: metals.iter().cloned().zip(vector).collect(),
        });

        if cumulative + RETENTION_EPSILON >= config.variance_threshold {
            break;
        }
    }

    let scores = used_rows
        .iter()
        .enumerate()
        .map(|(i, &row)| SampleScores {
            sample_id: dataset.samples()[row].id.clone(),
            scores: components
                .iter()
                .map(|c| {
                    c.loadings
                        .values()
                        .zip(&z_columns)
                        .map(|(l, z)| l * z[i])
                        .sum::<f64>()
                })
                .collect(),
        })
        .collect();

    log::debug!(
        "PCA over {} metals and {} samples retained {} component(s)",
        p,
        n,
        components.len()
    );

    Ok(PcaResult {
        metals,
        excluded_metals,
        dropped_samples,
        eigenvalues,
        components,
        scores,
    })
}

/// Flip a loading vector so its largest-magnitude entry is positive.
/// Exact magnitude ties resolve to the first entry.
fn orient(vector: &mut [f64]) {
    let mut pivot = 0;
    for (i, v) in vector.iter().enumerate() {
        if v.abs() > vector[pivot].abs() {
            pivot = i;
        }
    }
    if vector.get(pivot).is_some_and(|&v| v < 0.0) {
        vector.iter_mut().for_each(|v| *v = -*v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Sample;

    fn dataset(metals: &[&str], rows: &[(&str, &[f64])]) -> Dataset {
        let samples = rows
            .iter()
            .map(|(id, values)| {
                metals
                    .iter()
                    .zip(values.iter())
                    .fold(Sample::new(*id), |s, (m, v)| s.with(*m, *v))
            })
            .collect();
        Dataset::new(metals.iter().map(|m| m.to_string()).collect(), samples).unwrap()
    }

    fn sample_data() -> Dataset {
        dataset(
            &["Pb", "Cd", "Zn", "Cu"],
            &[
                ("S1", &[40.0, 2.0, 100.0, 30.0]),
                ("S2", &[20.0, 1.1, 80.0, 45.0]),
                ("S3", &[10.0, 0.4, 120.0, 25.0]),
                ("S4", &[35.0, 1.8, 90.0, 50.0]),
                ("S5", &[28.0, 1.2, 140.0, 33.0]),
                ("S6", &[15.0, 0.9, 70.0, 41.0]),
            ],
        )
    }

    fn all_components() -> PcaConfig {
        PcaConfig {
            variance_threshold: 1.0,
            ..PcaConfig::default()
        }
    }

    #[test]
    fn test_components_orthonormal_and_ordered() {
        let result = principal_components(&sample_data(), &all_components()).unwrap();
        assert_eq!(result.components.len(), 4);

        for (i, a) in result.components.iter().enumerate() {
            let norm: f64 = a.loadings.values().map(|v| v * v).sum();
            assert!((norm - 1.0).abs() < 1e-9);
            for b in &result.components[i + 1..] {
                let dot: f64 = a.loadings.values().zip(b.loadings.values()).map(|(x, y)| x * y).sum();
                assert!(dot.abs() < 1e-9, "PC{} · PC{} = {}", a.number, b.number, dot);
                assert!(a.explained_variance_ratio >= b.explained_variance_ratio);
            }
        }
        assert!((result.retained_variance() - 1.0).abs() < 1e-9);
        // eigenvalues of a correlation matrix sum to the number of variables
        let total: f64 = result.eigenvalues.iter().sum();
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_retention() {
        let result = principal_components(&sample_data(), &PcaConfig::default()).unwrap();
        let last = result.components.last().unwrap();
        assert!(last.cumulative_variance_ratio >= 0.8 - 1e-9);
        if result.components.len() > 1 {
            let before = &result.components[result.components.len() - 2];
            assert!(before.cumulative_variance_ratio < 0.8);
        }
    }

    #[test]
    fn test_max_components_caps_retention() {
        let config = PcaConfig {
            variance_threshold: 1.0,
            max_components: Some(2),
            ..PcaConfig::default()
        };
        let result = principal_components(&sample_data(), &config).unwrap();
        assert_eq!(result.components.len(), 2);
        assert_eq!(result.scores[0].scores.len(), 2);
    }

    #[test]
    fn test_sign_convention() {
        let result = principal_components(&sample_data(), &all_components()).unwrap();
        for component in &result.components {
            let max = component
                .loadings
                .values()
                .copied()
                .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            assert!(max > 0.0);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = principal_components(&sample_data(), &PcaConfig::default()).unwrap();
        let b = principal_components(&sample_data(), &PcaConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_variance_column_excluded_and_reported() {
        let ds = dataset(
            &["Pb", "Cd", "Zn"],
            &[
                ("S1", &[40.0, 1.0, 100.0]),
                ("S2", &[20.0, 1.0, 80.0]),
                ("S3", &[10.0, 1.0, 125.0]),
            ],
        );
        let result = principal_components(&ds, &all_components()).unwrap();

        assert_eq!(result.metals, vec!["Pb".to_string(), "Zn".to_string()]);
        assert_eq!(result.zero_variance_metals().collect::<Vec<_>>(), vec!["Cd"]);
        assert!(result.components.iter().all(|c| !c.loadings.contains_key("Cd")));
    }

    #[test]
    fn test_zero_variance_column_kept_when_configured() {
        let ds = dataset(
            &["Pb", "Cd", "Zn"],
            &[
                ("S1", &[40.0, 1.0, 100.0]),
                ("S2", &[20.0, 1.0, 80.0]),
                ("S3", &[10.0, 1.0, 125.0]),
            ],
        );
        let config = PcaConfig {
            variance_threshold: 1.0,
            exclude_zero_variance: false,
            ..PcaConfig::default()
        };
        let result = principal_components(&ds, &config).unwrap();
        assert_eq!(result.metals.len(), 3);
        assert!(result.eigenvalues.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_incomplete_samples_dropped() {
        let ds = Dataset::new(
            vec!["Pb".to_string(), "Zn".to_string()],
            vec![
                Sample::new("S1").with("Pb", 40.0).with("Zn", 100.0),
                Sample::new("S2").with("Pb", 20.0).with_missing("Zn"),
                Sample::new("S3").with("Pb", 10.0).with("Zn", 125.0),
                Sample::new("S4").with("Pb", 30.0).with("Zn", 90.0),
            ],
        )
        .unwrap();
        let result = principal_components(&ds, &PcaConfig::default()).unwrap();
        assert_eq!(result.dropped_samples, vec!["S2".to_string()]);
        assert_eq!(result.scores.len(), 3);
    }

    #[test]
    fn test_single_value_column_excluded_before_listwise_deletion() {
        let ds = Dataset::new(
            vec!["Pb".to_string(), "Cu".to_string(), "Zn".to_string()],
            vec![
                Sample::new("A").with("Pb", 40.0).with("Cu", 12.0).with("Zn", 100.0),
                Sample::new("B").with("Pb", 20.0).with_missing("Cu").with("Zn", 80.0),
                Sample::new("C").with("Pb", 10.0).with_missing("Cu").with("Zn", 125.0),
                Sample::new("D").with("Pb", 30.0).with_missing("Cu").with("Zn", 90.0),
            ],
        )
        .unwrap();
        let result = principal_components(&ds, &PcaConfig::default()).unwrap();

        assert_eq!(result.metals, vec!["Pb".to_string(), "Zn".to_string()]);
        assert_eq!(
            result.excluded_metals,
            vec![PcaExclusion {
                metal: "Cu".to_string(),
                reason: PcaExclusionReason::TooFewValues,
            }]
        );
        assert_eq!(result.sparse_metals().collect::<Vec<_>>(), vec!["Cu"]);
        assert!(result.dropped_samples.is_empty());
        assert_eq!(result.scores.len(), 4);
    }

    #[test]
    fn test_negative_reading_drops_sample() {
        let ds = dataset(
            &["Pb", "Zn"],
            &[
                ("S1", &[-500.0, 100.0]),
                ("S2", &[20.0, 80.0]),
                ("S3", &[10.0, 125.0]),
                ("S4", &[30.0, 90.0]),
            ],
        );
        let result = principal_components(&ds, &PcaConfig::default()).unwrap();
        assert_eq!(result.dropped_samples, vec!["S1".to_string()]);
        assert!(result.scores.iter().all(|s| s.sample_id != "S1"));
    }

    #[test]
    fn test_insufficient_samples() {
        let ds = dataset(&["Pb", "Zn"], &[("S1", &[40.0, 100.0])]);
        let err = principal_components(&ds, &PcaConfig::default()).unwrap_err();
        assert!(matches!(err, WaterMetalError::InsufficientData(_)));
    }

    #[test]
    fn test_all_constant_is_insufficient() {
        let ds = dataset(&["Pb", "Zn"], &[("S1", &[1.0, 2.0]), ("S2", &[1.0, 2.0])]);
        let err = principal_components(&ds, &PcaConfig::default()).unwrap_err();
        assert!(matches!(err, WaterMetalError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = PcaConfig {
            variance_threshold: 1.5,
            ..PcaConfig::default()
        };
        assert!(matches!(
            principal_components(&sample_data(), &config),
            Err(WaterMetalError::Config(_))
        ));
    }

    #[test]
    fn test_scores_have_zero_mean() {
        let result = principal_components(&sample_data(), &all_components()).unwrap();
        for k in 0..result.components.len() {
            let mean: f64 =
                result.scores.iter().map(|s| s.scores[k]).sum::<f64>() / result.scores.len() as f64;
            assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn test_dominant_metal() {
        let mut loadings = IndexMap::new();
        loadings.insert("Pb".to_string(), 0.3);
        loadings.insert("Cd".to_string(), -0.9);
        let pc = PrincipalComponent {
            number: 1,
            eigenvalue: 1.0,
            explained_variance_ratio: 1.0,
            cumulative_variance_ratio: 1.0,
            loadings,
        };
        assert_eq!(pc.dominant_metal(), Some("Cd"));
    }
}
