//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// WaterMetal: heavy metal ecological risk analysis
#[derive(Parser)]
#[command(name = "watermetal")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Input file plus optional configuration shared by the analysis commands.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Path to the data file (CSV/TSV or xlsx)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Analyzer configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Reference table (JSON: {"Pb": {"toxic_response": 5, "background": 20}, ...})
    #[arg(short, long)]
    pub references: Option<PathBuf>,
}

/// LLM selection shared by commands that can use one.
#[derive(Args, Clone, Debug)]
pub struct LlmArgs {
    /// LLM provider for an interpretation of the results
    #[arg(long, default_value = "none")]
    pub llm: LlmProviderChoice,

    /// Model to use (provider-specific, e.g., "gpt-4o")
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score samples, rank hotspots and run pattern analysis
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        llm: LlmArgs,

        /// Write the full result as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Render a Markdown or plain-text report
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        llm: LlmArgs,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (markdown, text)
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Number of hotspots listed (default: from configuration)
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Report title
        #[arg(long)]
        title: Option<String>,
    },

    /// Export result tables as CSV files
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory (default: next to the input file)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// File name prefix (default: input file stem)
        #[arg(long)]
        stem: Option<String>,
    },

    /// Ask a question about the results of a data file
    Ask {
        #[command(flatten)]
        input: InputArgs,

        /// The question to ask
        #[arg(short, long)]
        question: String,

        /// LLM provider to answer with
        #[arg(long, default_value = "openai")]
        llm: LlmProviderChoice,

        /// Model to use (provider-specific)
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the reference table used for scoring
    References {
        /// Reference table to show instead of the built-in one
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// LLM provider choice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LlmProviderChoice {
    /// No LLM
    #[default]
    None,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    OpenAI,
    /// Anthropic Claude API (requires ANTHROPIC_API_KEY)
    Anthropic,
    /// Mock provider for testing
    Mock,
}

impl std::str::FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(LlmProviderChoice::None),
            "openai" | "gpt" => Ok(LlmProviderChoice::OpenAI),
            "anthropic" | "claude" => Ok(LlmProviderChoice::Anthropic),
            "mock" | "test" => Ok(LlmProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: none, openai, anthropic, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::None => write!(f, "none"),
            LlmProviderChoice::OpenAI => write!(f, "openai"),
            LlmProviderChoice::Anthropic => write!(f, "anthropic"),
            LlmProviderChoice::Mock => write!(f, "mock"),
        }
    }
}
