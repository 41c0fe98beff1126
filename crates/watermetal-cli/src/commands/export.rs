//! Export command - write result tables as CSV.

use std::path::PathBuf;

use colored::Colorize;
use watermetal::report::export_tables;

use crate::cli::{InputArgs, LlmProviderChoice};

pub fn run(
    input: InputArgs,
    dir: Option<PathBuf>,
    stem: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = super::build_analyzer(&input, &LlmProviderChoice::None, None, false)?;
    let result = analyzer.analyze(&input.file)?;

    let dir = dir.unwrap_or_else(|| {
        input
            .file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let stem = stem.unwrap_or_else(|| {
        input
            .file
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    });

    let written = export_tables(&result, &dir, &stem)?;

    println!("{}", "Exported:".green().bold());
    for path in written {
        println!("  {}", path.display().to_string().white());
    }
    Ok(())
}
