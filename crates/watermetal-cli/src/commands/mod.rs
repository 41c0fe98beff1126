//! CLI command implementations.

pub mod analyze;
pub mod ask;
pub mod export;
pub mod references;
pub mod report;

use watermetal::{
    Analyzer, AnalyzerConfig, AnthropicProvider, LlmConfig, MockProvider, OpenAIProvider,
    ReferenceTable,
};

use crate::cli::{InputArgs, LlmProviderChoice};

/// Build an analyzer from the shared input options and an optional LLM.
/// With `summarize` off the provider is only used for questions.
pub(crate) fn build_analyzer(
    input: &InputArgs,
    llm: &LlmProviderChoice,
    model: Option<&str>,
    summarize: bool,
) -> Result<Analyzer, Box<dyn std::error::Error>> {
    if !input.file.exists() {
        return Err(format!("File not found: {}", input.file.display()).into());
    }

    let config = match input.config {
        Some(ref path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let mut analyzer = Analyzer::with_config(config);

    if let Some(ref path) = input.references {
        analyzer = analyzer.with_references(ReferenceTable::from_json_file(path)?);
    }

    let llm_config = |default_model: &str| LlmConfig {
        model: model.unwrap_or(default_model).to_string(),
        summarize,
        ..LlmConfig::default()
    };

    analyzer = match llm {
        LlmProviderChoice::None => analyzer,
        LlmProviderChoice::OpenAI => {
            analyzer.with_llm(OpenAIProvider::from_env_with_config(llm_config("gpt-4o"))?)
        }
        LlmProviderChoice::Anthropic => analyzer.with_llm(
            AnthropicProvider::from_env_with_config(llm_config("claude-sonnet-4-20250514"))?,
        ),
        LlmProviderChoice::Mock => analyzer.with_llm(MockProvider::with_config(llm_config("mock"))),
    };

    Ok(analyzer)
}
