//! Main Analyzer struct and public API.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Result, WaterMetalError};
use crate::hotspot::{HotspotConfig, HotspotDetector, HotspotResult};
use crate::input::{DatasetLoader, LoadReport, LoaderConfig, Parser, ParserConfig, SourceMetadata};
use crate::llm::{LlmProvider, QuestionResponse};
use crate::pattern::{PatternAnalyzer, PatternResult, PcaConfig};
use crate::reference::ReferenceTable;
use crate::risk::{MetalContribution, RiskAssessment, RiskClass, RiskConfig, RiskScorer};

/// Configuration for an analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Risk classification and aggregation.
    pub risk: RiskConfig,
    /// Principal component analysis.
    pub pca: PcaConfig,
    /// Hotspot threshold and summary size.
    pub hotspot: HotspotConfig,
    /// Identifier and metal column selection.
    pub loader: LoaderConfig,
    /// Input parsing.
    #[serde(skip)]
    pub parser: ParserConfig,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file; absent keys keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| WaterMetalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.pca.validate()?;
        Ok(config)
    }
}

/// Result of analyzing one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Metadata about the source file (None for in-memory datasets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// How columns were interpreted (None for in-memory datasets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<LoadReport>,
    /// Per-sample risk scores.
    pub risk: RiskAssessment,
    /// Metal-wise share of the total risk.
    pub contributions: Vec<MetalContribution>,
    /// Ranking and hotspot flags.
    pub hotspots: HotspotResult,
    /// Correlation and PCA.
    pub pattern: PatternResult,
    /// Non-fatal problems met during the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Summary statistics.
    pub summary: AnalysisSummary,
    /// LLM-written interpretation, if a provider is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Summary of the analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub sample_count: usize,
    pub scored_metal_count: usize,
    /// Samples with at least one metal excluded.
    pub partial_samples: usize,
    pub hotspot_count: usize,
    /// Number of samples per risk class, every class listed.
    pub class_counts: IndexMap<RiskClass, usize>,
    pub mean_index: f64,
    pub max_index: f64,
    /// Metal with the largest share of total risk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_metal: Option<String>,
    /// Human-readable recommendation.
    pub recommendation: String,
}

/// The main analysis engine.
pub struct Analyzer {
    config: AnalyzerConfig,
    references: ReferenceTable,
    llm_provider: Option<Arc<dyn LlmProvider>>,
}

impl Analyzer {
    /// Analyzer with default configuration and the standard reference table.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            references: ReferenceTable::standard(),
            llm_provider: None,
        }
    }

    /// Replace the reference table.
    pub fn with_references(mut self, references: ReferenceTable) -> Self {
        self.references = references;
        self
    }

    /// Add an LLM provider that writes a narrative for each result and can
    /// answer questions about it. The provider never changes numbers.
    pub fn with_llm(mut self, provider: impl LlmProvider + 'static) -> Self {
        self.llm_provider = Some(Arc::new(provider));
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    /// Parse, load and analyze a delimited text file or xlsx workbook.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<AnalysisResult> {
        let parser = Parser::with_config(self.config.parser.clone());
        let (table, source) = parser.parse_file(path)?;
        let (dataset, report) = DatasetLoader::with_config(self.config.loader.clone()).load(&table)?;

        let mut result = self.analyze_dataset(&dataset)?;
        if report.below_detection_limit > 0 {
            result.warnings.insert(
                0,
                format!(
                    "{} value(s) below the detection limit were treated as missing",
                    report.below_detection_limit
                ),
            );
        }
        result.source = Some(source);
        result.columns = Some(report);
        Ok(result)
    }

    /// Analyze an in-memory dataset.
    pub fn analyze_dataset(&self, dataset: &Dataset) -> Result<AnalysisResult> {
        let mut warnings = Vec::new();

        let risk = RiskScorer::with_config(self.config.risk.clone()).score(dataset, &self.references)?;
        for metal in &risk.unreferenced_metals {
            warnings.push(format!(
                "'{}' has no reference values and was excluded from risk scoring",
                metal
            ));
        }
        let partial = risk.partial_count();
        if partial > 0 {
            warnings.push(format!(
                "{} sample(s) have partial metal coverage",
                partial
            ));
        }

        let contributions = risk.metal_contributions();
        let hotspots = HotspotDetector::from_config(&self.config.hotspot, &self.config.risk.thresholds)
            .detect(&risk.results);

        let pattern = PatternAnalyzer::with_config(self.config.pca.clone()).analyze(dataset)?;
        pattern_warnings(&pattern, &mut warnings);

        let summary = compute_summary(&risk, &contributions, &hotspots);

        let mut result = AnalysisResult {
            source: None,
            columns: None,
            risk,
            contributions,
            hotspots,
            pattern,
            warnings,
            summary,
            narrative: None,
        };

        if let Some(ref llm) = self.llm_provider {
            if llm.config().summarize {
                match llm.summarize(&result) {
                    Ok(text) if !text.trim().is_empty() => result.narrative = Some(text),
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("{} narrative unavailable: {}", llm.name(), e);
                        result
                            .warnings
                            .push(format!("AI narrative unavailable: {}", e));
                    }
                }
            }
        }

        Ok(result)
    }

    /// Ask the configured LLM a question about a result.
    pub fn ask(&self, result: &AnalysisResult, question: &str) -> Result<QuestionResponse> {
        let llm = self
            .llm_provider
            .as_ref()
            .ok_or_else(|| WaterMetalError::Config("no LLM provider configured".to_string()))?;
        llm.answer_question(question, result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern_warnings(pattern: &PatternResult, warnings: &mut Vec<String>) {
    if !pattern.invalid_values.is_empty() {
        let samples: IndexSet<&str> = pattern
            .invalid_values
            .iter()
            .map(|c| c.sample_id.as_str())
            .collect();
        warnings.push(format!(
            "{} negative or non-finite value(s) in sample(s) {} were left out of correlation and PCA",
            pattern.invalid_values.len(),
            samples.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    if let Some(ref message) = pattern.pca_skipped {
        warnings.push(format!("PCA skipped: {}", message));
    }
    let Some(ref pca) = pattern.pca else {
        return;
    };
    for metal in pca.sparse_metals() {
        warnings.push(format!(
            "'{}' has fewer than 2 usable values and was excluded from PCA",
            metal
        ));
    }
    for metal in pca.zero_variance_metals() {
        warnings.push(format!(
            "'{}' has zero variance and was excluded from PCA",
            metal
        ));
    }
    if !pca.dropped_samples.is_empty() {
        warnings.push(format!(
            "{} sample(s) with missing values were left out of PCA",
            pca.dropped_samples.len()
        ));
    }
}

fn compute_summary(
    risk: &RiskAssessment,
    contributions: &[MetalContribution],
    hotspots: &HotspotResult,
) -> AnalysisSummary {
    let mut class_counts: IndexMap<RiskClass, usize> =
        RiskClass::ALL.iter().map(|&c| (c, 0)).collect();
    for result in &risk.results {
        *class_counts.entry(result.class).or_insert(0) += 1;
    }

    let sample_count = risk.results.len();
    let mean_index = if sample_count == 0 {
        0.0
    } else {
        risk.results.iter().map(|r| r.index).sum::<f64>() / sample_count as f64
    };
    let max_index = risk
        .results
        .iter()
        .map(|r| r.index)
        .fold(0.0_f64, f64::max);

    let dominant_metal = contributions
        .iter()
        .filter(|c| c.total_risk > 0.0)
        .max_by(|a, b| a.total_risk.total_cmp(&b.total_risk))
        .map(|c| c.metal.clone());

    let hotspot_count = hotspots.hotspot_count();
    let worst = risk.results.iter().map(|r| r.class).max();
    let recommendation = generate_recommendation(worst, hotspot_count, dominant_metal.as_deref());

    AnalysisSummary {
        sample_count,
        scored_metal_count: risk.scored_metals.len(),
        partial_samples: risk.partial_count(),
        hotspot_count,
        class_counts,
        mean_index,
        max_index,
        dominant_metal,
        recommendation,
    }
}

fn generate_recommendation(
    worst: Option<RiskClass>,
    hotspot_count: usize,
    dominant_metal: Option<&str>,
) -> String {
    let driver = dominant_metal
        .map(|m| format!(" {} contributes most of the risk.", m))
        .unwrap_or_default();

    match worst {
        Some(RiskClass::VeryHigh | RiskClass::High) => format!(
            "{} hotspot station(s) need immediate follow-up sampling and source investigation.{}",
            hotspot_count, driver
        ),
        Some(RiskClass::Considerable) => format!(
            "{} station(s) show considerable ecological risk; schedule monitoring.{}",
            hotspot_count, driver
        ),
        Some(RiskClass::Moderate) => {
            format!("Risk is moderate at worst; continue routine monitoring.{}", driver)
        }
        Some(RiskClass::Low) | None => "All stations show low ecological risk.".to_string(),
    }
}
