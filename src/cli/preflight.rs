//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before
//! starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, VidqaError};
use crate::video_source::{LocalSource, VideoSource};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingesting needs embeddings, and yt-dlp unless the reference is a local file.
    Ingest(&'a str),
    /// Asking questions needs embeddings.
    Ask,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest(reference) => {
            check_embedding_key(settings)?;
            if !LocalSource::new().can_handle(reference) {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Ask => {
            check_embedding_key(settings)?;
        }
    }
    Ok(())
}

/// The hosted OpenAI endpoint needs a key; custom endpoints may not.
fn check_embedding_key(settings: &Settings) -> Result<()> {
    if settings.embedding.base_url.is_some() || settings.embedding.api_key.is_some() {
        return Ok(());
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(VidqaError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(VidqaError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidqaError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidqaError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidqaError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_endpoint_needs_no_key() {
        let mut settings = Settings::default();
        settings.embedding.base_url = Some("http://localhost:11434/v1".to_string());
        assert!(check(Operation::Ask, &settings).is_ok());
    }

    #[test]
    fn test_local_file_skips_ytdlp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.vtt");
        std::fs::write(&path, "WEBVTT\n").unwrap();

        let mut settings = Settings::default();
        settings.embedding.api_key = Some("sk-test".to_string());
        let reference = path.to_string_lossy().to_string();
        assert!(check(Operation::Ingest(&reference), &settings).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("vidqa-definitely-not-installed"),
            Err(VidqaError::ToolNotFound(_))
        ));
    }
}
