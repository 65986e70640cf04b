//! Video source abstraction for vidqa.
//!
//! A source turns a user-supplied reference (URL, id, path) into a stable
//! source id, a title, and raw transcript text.

mod local;
mod youtube;

pub use local::LocalSource;
pub use youtube::YoutubeSource;

use crate::config::Settings;
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata about a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Unique identifier.
    pub id: String,
    /// Title.
    pub title: String,
}

/// Raw transcript of one video, as fetched from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Identifier of the video.
    pub source_id: String,
    /// Video title, recorded when ingestion completes.
    pub title: String,
    /// Raw transcript text (subtitle file contents).
    pub text: String,
}

/// Trait for video sources.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Check if this source can handle the given reference.
    fn can_handle(&self, reference: &str) -> bool;

    /// Extract the source id, or fail with `InvalidReference`.
    fn resolve_id(&self, reference: &str) -> Result<String>;

    /// Fetch title and id.
    async fn fetch_metadata(&self, reference: &str) -> Result<VideoMetadata>;

    /// Fetch raw transcript text, or fail with `TranscriptNotFound`.
    async fn fetch_transcript(&self, reference: &str) -> Result<String>;

    /// Fetch metadata and transcript together.
    async fn fetch_document(&self, reference: &str) -> Result<SourceDocument> {
        let metadata = self.fetch_metadata(reference).await?;
        let text = self.fetch_transcript(reference).await?;
        Ok(SourceDocument {
            source_id: metadata.id,
            title: metadata.title,
            text,
        })
    }
}

/// Detect the appropriate source for the given reference.
///
/// Local transcript files take precedence over YouTube references.
pub fn detect_source(reference: &str, settings: &Settings) -> Result<Box<dyn VideoSource>> {
    let local = LocalSource::new();
    if local.can_handle(reference) {
        return Ok(Box::new(local));
    }

    let youtube = YoutubeSource::new(settings.subtitles_dir(), settings.youtube.subtitle_langs.clone());
    if youtube.can_handle(reference) {
        return Ok(Box::new(youtube));
    }

    Err(VidqaError::InvalidReference(format!(
        "No video id found in '{}'",
        reference
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_detect_youtube() {
        let settings = Settings::default();
        let source = detect_source("https://www.youtube.com/watch?v=D5u7trVY5Ho", &settings).unwrap();
        assert_eq!(
            source.resolve_id("https://www.youtube.com/watch?v=D5u7trVY5Ho").unwrap(),
            "D5u7trVY5Ho"
        );
    }

    #[test]
    fn test_detect_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.vtt");
        std::fs::write(&path, "WEBVTT\n").unwrap();
        let reference = path.to_str().unwrap();

        let source = detect_source(reference, &Settings::default()).unwrap();
        assert_eq!(source.resolve_id(reference).unwrap(), "local_talk");
    }

    #[test]
    fn test_detect_rejects_unknown_reference() {
        let err = detect_source("https://example.com/page", &Settings::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Reference);
    }
}
