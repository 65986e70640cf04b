//! Error types for vidqa.

use thiserror::Error;

/// Library-level error type for vidqa operations.
#[derive(Error, Debug)]
pub enum VidqaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Metadata store error: {0}")]
    MetadataStore(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Broad failure category, so callers can tell "not found" apart from
/// "backend failure" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input reference could not be resolved to a source id.
    Reference,
    /// An expected artifact (transcript, video) is absent.
    MissingArtifact,
    /// A backend (vector service, embedder, completer, database, tool) failed.
    Service,
    /// Settings or model configuration are inconsistent.
    Config,
}

impl VidqaError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidqaError::InvalidReference(_) => ErrorKind::Reference,
            VidqaError::TranscriptNotFound(_) | VidqaError::VideoNotFound(_) => {
                ErrorKind::MissingArtifact
            }
            VidqaError::Config(_)
            | VidqaError::DimensionMismatch { .. }
            | VidqaError::TomlParse(_) => ErrorKind::Config,
            _ => ErrorKind::Service,
        }
    }
}

/// Result type alias for vidqa operations.
pub type Result<T> = std::result::Result<T, VidqaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            VidqaError::InvalidReference("x".into()).kind(),
            ErrorKind::Reference
        );
        assert_eq!(
            VidqaError::TranscriptNotFound("abc".into()).kind(),
            ErrorKind::MissingArtifact
        );
        assert_eq!(
            VidqaError::DimensionMismatch { expected: 3, actual: 4 }.kind(),
            ErrorKind::Config
        );
        assert_eq!(
            VidqaError::VectorIndex("boom".into()).kind(),
            ErrorKind::Service
        );
    }
}
