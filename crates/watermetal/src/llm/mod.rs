//! LLM provider integration for narratives and questions about results.
//!
//! Providers receive the finished [`AnalysisResult`](crate::AnalysisResult)
//! (PERI table, metal contributions, hotspots, principal components) and
//! return text. They never change a score. The analyzer works fully
//! without one.
//!
//! # Supported Providers
//!
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **Mock** - deterministic answers built from the results, for tests
//!
//! # Example
//!
//! ```no_run
//! use watermetal::{Analyzer, OpenAIProvider};
//!
//! let analyzer = Analyzer::new().with_llm(OpenAIProvider::from_env().unwrap());
//! let result = analyzer.analyze("samples.csv").unwrap();
//! println!("{}", result.narrative.unwrap_or_default());
//! ```

mod anthropic;
mod mock;
mod openai;
mod prompts;
mod provider;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use prompts::results_context;
pub use provider::{LlmConfig, LlmProvider, QuestionResponse};
