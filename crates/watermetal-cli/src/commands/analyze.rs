//! Analyze command - score a data file and print a summary.

use std::fs;
use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use watermetal::RiskClass;

use crate::cli::{InputArgs, LlmArgs};

pub fn run(
    input: InputArgs,
    llm: LlmArgs,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = super::build_analyzer(&input, &llm.llm, llm.model.as_deref(), true)?;

    if !json {
        println!(
            "{} {}",
            "Analyzing".cyan().bold(),
            input.file.display().to_string().white()
        );
    }

    let result = analyzer.analyze(&input.file)?;

    if let Some(ref path) = output {
        fs::write(path, serde_json::to_string_pretty(&result)?)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if verbose {
        if let Some(ref columns) = result.columns {
            println!();
            println!("{}", "Columns:".yellow().bold());
            println!(
                "  {:20} id",
                columns.id_column.as_deref().unwrap_or("(row number)")
            );
            for (header, metal) in &columns.metal_columns {
                println!("  {:20} {}", header, metal);
            }
            for header in &columns.ignored_columns {
                println!("  {:20} {}", header, "ignored".dimmed());
            }
        }
    }

    let summary = &result.summary;
    println!();
    println!(
        "Scored {} stations on {} metals (mean PERI {:.2}, max {:.2})",
        summary.sample_count.to_string().white().bold(),
        summary.scored_metal_count.to_string().white().bold(),
        summary.mean_index,
        summary.max_index
    );
    for (class, count) in &summary.class_counts {
        if *count > 0 {
            println!("  {:14} {}", paint(*class, class.label()), count);
        }
    }

    println!();
    println!("{}", "Top hotspots:".yellow().bold());
    for row in result.hotspots.top(analyzer.config().hotspot.top_n) {
        let marker = if row.hotspot { "●".red() } else { "○".dimmed() };
        println!(
            "  {} Station {} : PERI = {:.2} ({})",
            marker,
            row.sample_id.white().bold(),
            row.index,
            paint(row.class, row.class.label())
        );
    }

    println!();
    println!("{}", "Metal contribution:".yellow().bold());
    for c in &result.contributions {
        println!("  {:4} {:>6.1}%", c.metal, c.percent);
    }

    if let Some(ref pca) = result.pattern.pca {
        println!();
        println!("{}", "Principal components:".yellow().bold());
        for pc in &pca.components {
            println!(
                "  PC{}  {:>5.1}%  dominated by {}",
                pc.number,
                pc.explained_variance_ratio * 100.0,
                pc.dominant_metal().unwrap_or("-")
            );
        }
    }

    if let Some(ref narrative) = result.narrative {
        println!();
        println!("{}", "Interpretation:".yellow().bold());
        println!("{}", narrative);
    }

    if !result.warnings.is_empty() {
        println!();
        for w in &result.warnings {
            println!("{} {}", "warning:".yellow(), w);
        }
    }

    println!();
    println!("{}", summary.recommendation);

    if let Some(path) = output {
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

fn paint(class: RiskClass, text: &str) -> ColoredString {
    match class {
        RiskClass::Low => text.green(),
        RiskClass::Moderate => text.yellow(),
        RiskClass::Considerable => text.bright_red(),
        RiskClass::High | RiskClass::VeryHigh => text.red().bold(),
    }
}
