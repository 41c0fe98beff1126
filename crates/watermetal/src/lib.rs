//! WaterMetal: ecological risk and pattern analysis of heavy metal
//! measurements in water and sediment samples.
//!
//! Each sample is scored with the Potential Ecological Risk Index (PERI),
//! samples are ranked to find contamination hotspots, and the concentration
//! matrix is examined with Pearson correlation and principal component
//! analysis to suggest shared pollution sources.
//!
//! # Core Principles
//!
//! - **Pure computation**: the engines take an in-memory [`Dataset`] and a
//!   [`ReferenceTable`] and never touch files or global state
//! - **Per-item isolation**: a bad value excludes one metal from one sample,
//!   not the whole run
//! - **Deterministic**: identical input gives identical rankings and
//!   component signs
//!
//! # Example
//!
//! ```no_run
//! use watermetal::Analyzer;
//!
//! let analyzer = Analyzer::new();
//! let result = analyzer.analyze("stations.csv").unwrap();
//!
//! for row in result.hotspots.top(5) {
//!     println!("Station {} : PERI = {:.2}", row.sample_id, row.index);
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod hotspot;
pub mod input;
pub mod llm;
pub mod pattern;
pub mod reference;
pub mod report;
pub mod risk;

mod analyzer;

pub use crate::analyzer::{AnalysisResult, AnalysisSummary, Analyzer, AnalyzerConfig};
pub use dataset::{is_valid_concentration, Dataset, InvalidCell, Sample};
pub use error::{Result, WaterMetalError};
pub use hotspot::{HotspotConfig, HotspotDetector, HotspotResult, RankedSample};
pub use input::{DataTable, DatasetLoader, LoadReport, Parser, SourceMetadata};
pub use llm::{AnthropicProvider, LlmConfig, LlmProvider, MockProvider, OpenAIProvider};
pub use pattern::{CorrelationMatrix, PatternAnalyzer, PatternResult, PcaConfig, PcaResult};
pub use reference::{MetalReference, ReferenceTable};
pub use report::{Report, ReportFormat};
pub use risk::{RiskAssessment, RiskClass, RiskConfig, RiskFormula, RiskResult, RiskScorer, RiskThresholds};
