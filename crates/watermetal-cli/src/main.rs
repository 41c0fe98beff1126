//! WaterMetal CLI - heavy metal ecological risk analysis.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Analyze {
            input,
            llm,
            output,
            json,
        } => commands::analyze::run(input, llm, output, json, cli.verbose),

        Commands::Report {
            input,
            llm,
            output,
            format,
            top,
            title,
        } => commands::report::run(input, llm, output, format, top, title),

        Commands::Export { input, dir, stem } => commands::export::run(input, dir, stem),

        Commands::Ask {
            input,
            question,
            llm,
            model,
        } => commands::ask::run(input, question, llm, model),

        Commands::References { file, json } => commands::references::run(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
