//! Human-readable reports and tabular exports of an analysis.

mod export;

use std::fmt::Write;
use std::str::FromStr;

use crate::analyzer::AnalysisResult;
use crate::error::WaterMetalError;
use crate::risk::RiskClass;

pub use export::{
    export_tables, write_hotspot_table, write_metal_table, write_risk_table, write_score_table,
};

/// Default report title.
pub const DEFAULT_TITLE: &str = "WaterMetal Analyzer - Heavy Metal Risk Report";

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Text,
}

impl FromStr for ReportFormat {
    type Err = WaterMetalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(ReportFormat::Markdown),
            "txt" | "text" => Ok(ReportFormat::Text),
            other => Err(WaterMetalError::Config(format!(
                "unknown report format '{}' (expected markdown or text)",
                other
            ))),
        }
    }
}

/// A report over one analysis result.
pub struct Report<'a> {
    result: &'a AnalysisResult,
    title: String,
    top_n: usize,
}

impl<'a> Report<'a> {
    /// Report listing the `top_n` highest-risk stations.
    pub fn from_analysis(result: &'a AnalysisResult, top_n: usize) -> Self {
        Self {
            result,
            title: DEFAULT_TITLE.to_string(),
            top_n,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Text => self.to_text(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let r = self.result;
        let mut out = String::new();

        let _ = writeln!(out, "# {}\n", self.title);
        if let Some(ref source) = r.source {
            let _ = writeln!(
                out,
                "Source: `{}` ({} rows, sha256 `{}`), loaded {}\n",
                source.file,
                source.row_count,
                short_hash(&source.hash),
                source.loaded_at.format("%Y-%m-%d %H:%M UTC")
            );
        }

        let _ = writeln!(out, "## Summary\n");
        let _ = writeln!(out, "- Stations: {}", r.summary.sample_count);
        let _ = writeln!(out, "- Metals scored: {}", r.risk.scored_metals.join(", "));
        let _ = writeln!(out, "- Mean PERI: {:.2}", r.summary.mean_index);
        let _ = writeln!(out, "- Max PERI: {:.2}", r.summary.max_index);
        let _ = writeln!(
            out,
            "- Hotspots (PERI >= {:.0}): {}\n",
            r.hotspots.threshold, r.summary.hotspot_count
        );
        let _ = writeln!(out, "| Class | Stations |\n|---|---:|");
        for (class, count) in &r.summary.class_counts {
            let _ = writeln!(out, "| {} | {} |", class, count);
        }

        let _ = writeln!(out, "\n## Top {} Hotspots\n", self.top_n);
        for row in r.hotspots.top(self.top_n) {
            let _ = writeln!(
                out,
                "{}. Station {} : PERI = {:.2} ({})",
                row.rank, row.sample_id, row.index, row.class
            );
        }

        let _ = writeln!(out, "\n## Metal Contribution\n");
        let _ = writeln!(out, "| Metal | Total Er | Share |\n|---|---:|---:|");
        for c in &r.contributions {
            let _ = writeln!(out, "| {} | {:.2} | {:.1}% |", c.metal, c.total_risk, c.percent);
        }

        if let Some(ref pca) = r.pattern.pca {
            let _ = writeln!(out, "\n## Principal Components\n");
            let _ = writeln!(
                out,
                "| Component | Eigenvalue | Variance | Cumulative | Dominant metal |\n|---|---:|---:|---:|---|"
            );
            for pc in &pca.components {
                let _ = writeln!(
                    out,
                    "| PC{} | {:.3} | {:.1}% | {:.1}% | {} |",
                    pc.number,
                    pc.eigenvalue,
                    pc.explained_variance_ratio * 100.0,
                    pc.cumulative_variance_ratio * 100.0,
                    pc.dominant_metal().unwrap_or("-")
                );
            }
        }

        let pairs = r.pattern.correlation.strong_pairs(0.7);
        if !pairs.is_empty() {
            let _ = writeln!(out, "\nStrongly correlated metals (|r| >= 0.7):\n");
            for (a, b, v) in pairs {
                let _ = writeln!(out, "- {} / {}: r = {:.2}", a, b, v);
            }
        }

        if let Some(ref narrative) = r.narrative {
            let _ = writeln!(out, "\n## Interpretation\n\n{}", narrative);
        }

        if !r.warnings.is_empty() {
            let _ = writeln!(out, "\n## Data Notes\n");
            for w in &r.warnings {
                let _ = writeln!(out, "- {}", w);
            }
        }

        let _ = writeln!(out, "\n## Recommendation\n\n{}", r.summary.recommendation);
        out
    }

    pub fn to_text(&self) -> String {
        let r = self.result;
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}\n", "=".repeat(self.title.chars().count()));
        if let Some(ref source) = r.source {
            let _ = writeln!(out, "Source: {} ({} rows)\n", source.file, source.row_count);
        }

        let _ = writeln!(
            out,
            "Stations: {}   Mean PERI: {:.2}   Max PERI: {:.2}",
            r.summary.sample_count, r.summary.mean_index, r.summary.max_index
        );
        let counts: Vec<String> = r
            .summary
            .class_counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| format!("{} {}", n, class_word(*c)))
            .collect();
        let _ = writeln!(out, "Classes: {}\n", counts.join(", "));

        let _ = writeln!(out, "Top {} Hotspots:", self.top_n);
        for row in r.hotspots.top(self.top_n) {
            let _ = writeln!(out, "Station {} : PERI = {:.2}", row.sample_id, row.index);
        }

        let _ = writeln!(out, "\nMetal Contribution:");
        for c in &r.contributions {
            let _ = writeln!(out, "{:<4} {:>6.1}%", c.metal, c.percent);
        }

        if let Some(ref pca) = r.pattern.pca {
            let _ = writeln!(out, "\nPrincipal Components:");
            for pc in &pca.components {
                let _ = writeln!(
                    out,
                    "PC{}  {:.1}% of variance  ({})",
                    pc.number,
                    pc.explained_variance_ratio * 100.0,
                    pc.dominant_metal().unwrap_or("-")
                );
            }
        }

        if let Some(ref narrative) = r.narrative {
            let _ = writeln!(out, "\nInterpretation:\n{}", narrative);
        }

        for w in &r.warnings {
            let _ = writeln!(out, "Note: {}", w);
        }

        let _ = writeln!(out, "\n{}", r.summary.recommendation);
        out
    }
}

fn class_word(class: RiskClass) -> String {
    class.label().to_lowercase()
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
