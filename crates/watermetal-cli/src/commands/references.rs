//! References command - show the metal reference table.

use std::path::PathBuf;

use colored::Colorize;
use watermetal::ReferenceTable;

pub fn run(file: Option<PathBuf>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let table = match file {
        Some(ref path) => ReferenceTable::from_json_file(path)?,
        None => ReferenceTable::standard(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    let source = file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    println!("{} {}", "Reference table".cyan().bold(), source.white());
    println!();
    println!("  {:6} {:>10} {:>14}", "Metal", "Tr", "Background");
    for (metal, reference) in table.iter() {
        println!(
            "  {:6} {:>10} {:>14}",
            metal.white().bold(),
            reference.toxic_response,
            reference.background
        );
    }
    Ok(())
}
