//! Transcript chunking for retrieval.
//!
//! Subtitles are normalized into a single line of text, cut at sentence
//! delimiters, and accumulated into overlapping character-bounded chunks.

mod clean;
mod sentence;

pub use clean::clean_subtitles;
pub use sentence::SentenceChunker;

use serde::{Deserialize, Serialize};

/// A bounded span of transcript text tagged with the video it came from.
///
/// This is also the payload stored alongside each vector in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub text: String,
    /// Identifier of the source video.
    pub source_id: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// A chunk is emitted once the buffer holds at least this many characters.
    /// Zero makes every sentence emit.
    pub chunk_size: usize,
    /// Trailing characters of an emitted chunk that seed the next one.
    pub overlap: usize,
    /// Emit the final buffer when it holds more than the overlap seed.
    pub flush_trailing: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
            flush_trailing: false,
        }
    }
}

impl From<&crate::config::ChunkingSettings> for ChunkingConfig {
    fn from(settings: &crate::config::ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            overlap: settings.overlap,
            flush_trailing: settings.flush_trailing,
        }
    }
}

/// Split raw subtitle text into chunks using the given configuration.
pub fn split(text: &str, source_id: &str, config: ChunkingConfig) -> Vec<Chunk> {
    SentenceChunker::new(config).split(text, source_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reference_trace() {
        let text = "Hello world. This is a test. Another sentence here.";
        let config = ChunkingConfig {
            chunk_size: 20,
            overlap: 5,
            flush_trailing: false,
        };

        let chunks = split(text, "vid", config);

        assert_eq!(
            chunks,
            vec![
                Chunk::new("Hello world This is a test", "vid"),
                Chunk::new(" test Another sentence here", "vid"),
            ]
        );
    }

    #[test]
    fn test_split_short_text_yields_no_chunks() {
        assert!(split("Too short.", "vid", ChunkingConfig::default()).is_empty());
    }
}
