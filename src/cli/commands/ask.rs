//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
///
/// The video must already be ingested; otherwise the answer has no context.
pub async fn run_ask(reference: &str, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let source_id = orchestrator.resolve_id(reference)?;
    if !orchestrator.is_ingested(&source_id).await? {
        Output::warning(&format!(
            "{} has not been ingested. Run 'vidqa ingest {}' first.",
            source_id, reference
        ));
    }

    let spinner = Output::spinner("Searching transcript...");

    match orchestrator.answer(question, reference).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            println!("\n{}\n", answer.text.trim());

            if !answer.chunks.is_empty() {
                Output::header("Context");
                for (i, chunk) in answer.chunks.iter().enumerate() {
                    Output::chunk(i + 1, &chunk.text);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
