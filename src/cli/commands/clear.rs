//! Clear command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the clear command.
pub async fn run_clear(yes: bool, settings: Settings) -> Result<()> {
    let collection = settings.vector_index.collection.clone();

    if !yes {
        print!(
            "{} Delete collection '{}' and all ingestion records? [y/N] ",
            style("??").yellow().bold(),
            collection
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !matches!(input.trim(), "y" | "Y" | "yes") {
            Output::info("Aborted.");
            return Ok(());
        }
    }

    let orchestrator = Orchestrator::new(settings)?;
    let removed = orchestrator.clear().await?;
    Output::success(&format!(
        "Deleted collection '{}' and {} video records.",
        collection, removed
    ));

    Ok(())
}
