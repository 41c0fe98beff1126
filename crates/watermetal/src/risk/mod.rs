//! Risk scoring engine.
//!
//! For each sample and each referenced metal *m*:
//!
//! - contamination factor `Cf = C / Cb` (measured over background)
//! - single-metal risk factor `Er = Tr × Cf`
//! - aggregate index `RI = Σ Er` over the metals with a usable value
//!
//! The index is then classified with [`RiskThresholds`].

mod class;
mod contribution;
mod scorer;

pub use class::{RiskClass, RiskThresholds};
pub use contribution::MetalContribution;
pub use scorer::{
    contamination_factor, risk_factor, ExcludedMetal, ExclusionReason, MetalRisk, RiskAssessment,
    RiskConfig, RiskFormula, RiskResult, RiskScorer,
};
