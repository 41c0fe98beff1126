//! Ask command - question an LLM about the results of a data file.

use colored::Colorize;

use crate::cli::{InputArgs, LlmProviderChoice};

pub fn run(
    input: InputArgs,
    question: String,
    llm: LlmProviderChoice,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if llm == LlmProviderChoice::None {
        return Err("An LLM provider is required. Use --llm openai, anthropic or mock.".into());
    }

    let analyzer = super::build_analyzer(&input, &llm, model.as_deref(), false)?;
    let result = analyzer.analyze(&input.file)?;

    let response = analyzer.ask(&result, &question)?;

    println!("{}", response.answer);
    if !response.follow_up_questions.is_empty() {
        println!();
        println!("{}", "You might also ask:".dimmed());
        for q in &response.follow_up_questions {
            println!("  - {}", q.cyan());
        }
    }
    Ok(())
}
