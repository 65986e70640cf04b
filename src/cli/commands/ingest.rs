//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::pipeline::IngestOutcome;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(reference: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    ingest_with(&orchestrator, reference).await?;
    Ok(())
}

/// Ingest `reference` with progress output. Shared with the chat command.
pub(crate) async fn ingest_with(
    orchestrator: &Orchestrator,
    reference: &str,
) -> Result<IngestOutcome> {
    if let Err(e) = preflight::check(Operation::Ingest(reference), orchestrator.settings()) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    Output::info(&format!("Processing: {}", reference));
    let spinner = Output::spinner("Fetching and indexing transcript...");

    match orchestrator.ingest(reference).await {
        Ok(outcome) => {
            spinner.finish_and_clear();
            if outcome.skipped {
                Output::info(&format!(
                    "'{}' ({}) is already ingested.",
                    outcome.title, outcome.source_id
                ));
            } else {
                Output::success(&format!(
                    "Indexed '{}' ({} chunks)",
                    outcome.title, outcome.chunks_indexed
                ));
                if outcome.chunks_indexed == 0 {
                    Output::warning(
                        "The transcript was too short to produce any chunk; answers will have no context.",
                    );
                }
            }
            Ok(outcome)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to ingest {}: {}", reference, e));
            Err(e.into())
        }
    }
}
