//! LLM provider trait and types.

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::error::{Result, WaterMetalError};

/// Response to an interactive question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    /// The answer to the question.
    pub answer: String,

    /// Confidence in the answer (0.0-1.0).
    #[serde(default)]
    pub confidence: f64,

    /// Suggested follow-up questions.
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

/// Configuration for LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "gpt-4o").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Whether to write a narrative for every analysis.
    pub summarize: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            summarize: true,
        }
    }
}

/// Trait for LLM providers.
///
/// Providers read structured results only; they never alter scores.
/// Implementations must be thread-safe (Send + Sync).
pub trait LlmProvider: Send + Sync {
    /// Write a short interpretation of an analysis for a report.
    fn summarize(&self, result: &AnalysisResult) -> Result<String>;

    /// Answer a free-form question about an analysis.
    fn answer_question(&self, question: &str, result: &AnalysisResult) -> Result<QuestionResponse>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}

/// Parse JSON from an LLM response, handling markdown code blocks.
pub(crate) fn parse_json_response<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T> {
    let json_str = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    };

    serde_json::from_str(json_str)
        .map_err(|e| WaterMetalError::Llm(format!("Failed to parse LLM JSON response: {}", e)))
}
