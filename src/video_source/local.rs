//! Local transcript file source.
//!
//! Lets a subtitle or plain-text transcript already on disk be ingested
//! without contacting YouTube.

use super::{VideoMetadata, VideoSource};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use std::path::Path;

/// Supported transcript file extensions.
const TRANSCRIPT_EXTENSIONS: &[&str] = &["vtt", "srt", "txt"];

/// Local transcript file source.
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    /// Check if path has a supported transcript extension.
    fn is_transcript_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| TRANSCRIPT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn file_stem(path: &Path) -> Option<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSource for LocalSource {
    fn can_handle(&self, reference: &str) -> bool {
        let path = Path::new(reference);
        path.is_file() && Self::is_transcript_file(path)
    }

    fn resolve_id(&self, reference: &str) -> Result<String> {
        let path = Path::new(reference);
        if !Self::is_transcript_file(path) {
            return Err(VidqaError::InvalidReference(format!(
                "Not a recognized transcript file: {}",
                reference
            )));
        }

        Self::file_stem(path)
            .map(|stem| format!("local_{}", stem))
            .ok_or_else(|| {
                VidqaError::InvalidReference(format!("No file name in {}", reference))
            })
    }

    async fn fetch_metadata(&self, reference: &str) -> Result<VideoMetadata> {
        let id = self.resolve_id(reference)?;
        let title = Self::file_stem(Path::new(reference)).unwrap_or_else(|| id.clone());
        Ok(VideoMetadata { id, title })
    }

    async fn fetch_transcript(&self, reference: &str) -> Result<String> {
        let path = Path::new(reference);
        if !path.exists() {
            return Err(VidqaError::TranscriptNotFound(format!(
                "File not found: {}",
                reference
            )));
        }
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture-01.vtt");
        std::fs::write(&path, "WEBVTT\n\nSome words.").unwrap();
        let reference = path.to_str().unwrap();

        let source = LocalSource::new();
        assert!(source.can_handle(reference));

        let doc = source.fetch_document(reference).await.unwrap();
        assert_eq!(doc.source_id, "local_lecture-01");
        assert_eq!(doc.title, "lecture-01");
        assert_eq!(doc.text, "WEBVTT\n\nSome words.");
    }

    #[tokio::test]
    async fn test_missing_file_is_missing_artifact() {
        let source = LocalSource::new();
        let err = source
            .fetch_transcript("/definitely/not/here.vtt")
            .await
            .unwrap_err();
        assert!(matches!(err, VidqaError::TranscriptNotFound(_)));
    }

    #[test]
    fn test_rejects_media_files() {
        let source = LocalSource::new();
        assert!(!source.can_handle("/tmp/video.mp4"));
        assert!(matches!(
            source.resolve_id("/tmp/video.mp4"),
            Err(VidqaError::InvalidReference(_))
        ));
    }
}
