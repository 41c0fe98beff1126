//! Mock LLM provider for testing.

use crate::analyzer::AnalysisResult;
use crate::error::Result;

use super::provider::{LlmConfig, LlmProvider, QuestionResponse};

/// Mock LLM provider that returns predictable responses for testing.
///
/// Answers are assembled from the result itself, so they stay consistent
/// with the numbers without any network access.
pub struct MockProvider {
    config: LlmConfig,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self {
            config: LlmConfig {
                model: "mock".to_string(),
                ..LlmConfig::default()
            },
        }
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self { config }
    }

    fn worst_station(result: &AnalysisResult) -> String {
        match result.hotspots.ranking.first() {
            Some(top) => format!(
                "Station {} has the highest PERI ({:.2}, {}).",
                top.sample_id, top.index, top.class
            ),
            None => "No stations were scored.".to_string(),
        }
    }

    fn dominant_metal(result: &AnalysisResult) -> String {
        result
            .contributions
            .iter()
            .max_by(|a, b| a.total_risk.total_cmp(&b.total_risk))
            .map(|c| format!("{} contributes {:.1}% of the total risk.", c.metal, c.percent))
            .unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for MockProvider {
    fn summarize(&self, result: &AnalysisResult) -> Result<String> {
        if !self.config.summarize {
            return Ok(String::new());
        }

        Ok(format!(
            "{} {} station(s) reach the hotspot threshold of {:.0}. {}",
            Self::worst_station(result),
            result.summary.hotspot_count,
            result.hotspots.threshold,
            Self::dominant_metal(result)
        )
        .trim_end()
        .to_string())
    }

    fn answer_question(&self, question: &str, result: &AnalysisResult) -> Result<QuestionResponse> {
        let q = question.to_lowercase();

        let answer = if q.contains("metal") || q.contains("contribut") || q.contains("source") {
            Self::dominant_metal(result)
        } else if q.contains("component") || q.contains("pca") {
            match result.pattern.pca.as_ref().and_then(|p| p.components.first()) {
                Some(pc) => format!(
                    "PC1 explains {:.1}% of the variance and is dominated by {}.",
                    pc.explained_variance_ratio * 100.0,
                    pc.dominant_metal().unwrap_or("no single metal")
                ),
                None => "Principal component analysis was not available for this data.".to_string(),
            }
        } else {
            Self::worst_station(result)
        };

        Ok(QuestionResponse {
            answer,
            confidence: 0.8,
            follow_up_questions: vec!["Which metal contributes most to the risk?".to_string()],
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}
