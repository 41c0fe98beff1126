//! Anthropic Claude API provider implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::analyzer::AnalysisResult;
use crate::error::{Result, WaterMetalError};

use super::prompts;
use super::provider::{parse_json_response, LlmConfig, LlmProvider, QuestionResponse};

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Default model for this provider.
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = LlmConfig {
            model: DEFAULT_MODEL.to_string(),
            ..LlmConfig::default()
        };
        Self::with_config(api_key, config)
    }

    /// Create a new Anthropic provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| WaterMetalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = read_key()?;
        Self::new(api_key)
    }

    pub fn from_env_with_config(config: LlmConfig) -> Result<Self> {
        Self::with_config(read_key()?, config)
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| WaterMetalError::Config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Send a message to the Claude API.
    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        log::debug!("sending request to Anthropic model {}", self.config.model);
        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| WaterMetalError::Llm(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(WaterMetalError::Llm(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .map_err(|e| WaterMetalError::Llm(format!("Failed to parse API response: {}", e)))?;

        api_response
            .content
            .into_iter()
            .find_map(|block| (block.content_type == "text").then_some(block.text))
            .ok_or_else(|| WaterMetalError::Llm("No text in API response".to_string()))
    }
}

fn read_key() -> Result<String> {
    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        WaterMetalError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
    })
}

impl LlmProvider for AnthropicProvider {
    fn summarize(&self, result: &AnalysisResult) -> Result<String> {
        let response = self.send_message(&prompts::summary_prompt(result))?;
        Ok(response.trim().to_string())
    }

    fn answer_question(&self, question: &str, result: &AnalysisResult) -> Result<QuestionResponse> {
        let response = self.send_message(&prompts::question_prompt(question, result))?;
        parse_json_response(&response)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Anthropic API response structure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

/// Content block in API response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
