//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.list().await {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos ingested yet. Use 'vidqa ingest <reference>' to add one.");
            } else {
                Output::header(&format!("Ingested Videos ({})", videos.len()));
                println!();

                for video in &videos {
                    Output::video_info(&video.title, &video.id, &video.ingested_at);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
