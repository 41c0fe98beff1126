//! Report command - render a Markdown or text report.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use watermetal::{Report, ReportFormat};

use crate::cli::{InputArgs, LlmArgs};

pub fn run(
    input: InputArgs,
    llm: LlmArgs,
    output: Option<PathBuf>,
    format: String,
    top: Option<usize>,
    title: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format: ReportFormat = format.parse()?;
    let analyzer = super::build_analyzer(&input, &llm.llm, llm.model.as_deref(), true)?;
    let result = analyzer.analyze(&input.file)?;

    let top_n = top.unwrap_or(analyzer.config().hotspot.top_n);
    let mut report = Report::from_analysis(&result, top_n);
    if let Some(title) = title {
        report = report.with_title(title);
    }
    let rendered = report.render(format);

    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!(
                "{} {}",
                "Report written to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
