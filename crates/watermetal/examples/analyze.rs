//! Example: Score a station file and print the highest-risk stations.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path>

use std::env;
use std::path::Path;

use watermetal::{Analyzer, MockProvider, Report, ReportFormat};

fn main() -> watermetal::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example analyze -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    // Mock LLM so the example runs without an API key
    let analyzer = Analyzer::new().with_llm(MockProvider::new());
    let result = analyzer.analyze(path)?;

    println!("{}", Report::from_analysis(&result, 5).render(ReportFormat::Text));

    for r in result.risk.results.iter().filter(|r| r.partial_coverage) {
        let missing: Vec<&str> = r.excluded.iter().map(|e| e.metal.as_str()).collect();
        println!("  {} scored without: {}", r.sample_id, missing.join(", "));
    }

    Ok(())
}
