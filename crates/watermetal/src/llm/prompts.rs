//! Prompt templates for LLM interactions.

use std::fmt::Write;

use crate::analyzer::AnalysisResult;

/// Ranked rows included before the table is cut short.
const MAX_TABLE_ROWS: usize = 50;

/// Render the structured results as plain text for a prompt.
pub fn results_context(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## PERI table (rank, station, index, class)");
    for row in result.hotspots.top(MAX_TABLE_ROWS) {
        let _ = writeln!(
            out,
            "{}. {} : PERI = {:.2} ({}){}",
            row.rank,
            row.sample_id,
            row.index,
            row.class,
            if row.hotspot { " [hotspot]" } else { "" }
        );
    }
    let remaining = result.hotspots.ranking.len().saturating_sub(MAX_TABLE_ROWS);
    if remaining > 0 {
        let _ = writeln!(out, "... {} more stations", remaining);
    }

    let _ = writeln!(out, "\n## Metal-wise risk contribution");
    for c in &result.contributions {
        let _ = writeln!(
            out,
            "- {}: total Er = {:.2} ({:.1}%)",
            c.metal, c.total_risk, c.percent
        );
    }

    let _ = writeln!(
        out,
        "\n## Hotspots\n{} station(s) at or above PERI {:.0}",
        result.summary.hotspot_count, result.hotspots.threshold
    );

    if let Some(ref pca) = result.pattern.pca {
        let _ = writeln!(out, "\n## Principal components");
        for pc in &pca.components {
            let _ = writeln!(
                out,
                "- PC{}: {:.1}% of variance, dominated by {}",
                pc.number,
                pc.explained_variance_ratio * 100.0,
                pc.dominant_metal().unwrap_or("n/a")
            );
        }
    }
    let pairs = result.pattern.correlation.strong_pairs(0.7);
    if !pairs.is_empty() {
        let _ = writeln!(out, "\n## Strong correlations (|r| >= 0.7)");
        for (a, b, r) in pairs {
            let _ = writeln!(out, "- {}-{}: r = {:.2}", a, b, r);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n## Data warnings");
        for w in &result.warnings {
            let _ = writeln!(out, "- {}", w);
        }
    }

    out
}

/// Build a prompt asking for a short interpretation of the results.
pub fn summary_prompt(result: &AnalysisResult) -> String {
    format!(
        r#"Interpret these heavy metal contamination results for a water quality report.

{}

## Task
Write one or two short paragraphs that:
1. Name the stations with the highest ecological risk
2. Identify which metals drive the risk
3. Suggest likely sources where the principal components point to them

Refer only to numbers given above. Respond in plain text, not JSON."#,
        results_context(result)
    )
}

/// Build a prompt for an interactive question about the results.
pub fn question_prompt(question: &str, result: &AnalysisResult) -> String {
    format!(
        r#"Answer a question about these heavy metal contamination results.

{}

## Question
{}

## Task
Answer using only the results above. If they cannot answer the question,
say so.

Respond with a JSON object:
{{
  "answer": "Your answer...",
  "confidence": 0.0-1.0,
  "follow_up_questions": ["Optional follow-up question", "..."]
}}"#,
        results_context(result),
        question
    )
}

/// System prompt for all LLM interactions.
pub fn system_prompt() -> &'static str {
    r#"You are an environmental scientist assisting with heavy metal contamination analysis of water samples.

The results use the Potential Ecological Risk Index (PERI):
- Cf = concentration / background
- Er = toxic-response coefficient * Cf
- PERI = sum of Er over metals
Classes: Low < 150 <= Moderate < 300 <= Considerable < 600 <= High < 1200 <= Very high.

Guidelines:
- Be concise and specific
- Quote station ids and values from the results
- Never invent measurements that are not in the results
- Always respond with valid JSON when requested"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::dataset::{Dataset, Sample};

    fn result() -> AnalysisResult {
        let dataset = Dataset::new(
            vec!["Pb".to_string(), "Zn".to_string()],
            vec![
                Sample::new("S1").with("Pb", 400.0).with("Zn", 95.0),
                Sample::new("S2").with("Pb", 20.0).with("Zn", 190.0),
                Sample::new("S3").with("Pb", 60.0).with("Zn", 120.0),
            ],
        )
        .unwrap();
        Analyzer::new().analyze_dataset(&dataset).unwrap()
    }

    #[test]
    fn test_context_lists_ranking_and_contributions() {
        let context = results_context(&result());

        assert!(context.contains("1. S1 : PERI = 201.00"));
        assert!(context.contains("- Pb: total Er"));
        assert!(context.contains("Principal components"));
    }

    #[test]
    fn test_question_prompt_embeds_question() {
        let prompt = question_prompt("Which metal dominates?", &result());
        assert!(prompt.contains("Which metal dominates?"));
        assert!(prompt.contains("follow_up_questions"));
    }
}
