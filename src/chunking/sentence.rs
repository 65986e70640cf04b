//! Sentence-accumulating chunker with character overlap.

use super::{clean_subtitles, Chunk, ChunkingConfig};
use tracing::debug;

/// Splits text on `.` and accumulates sentences into overlapping chunks.
///
/// The size check runs before each sentence is appended, so a chunk is the
/// first buffer that reached `chunk_size`, and whatever accumulates after the
/// last check is dropped unless `flush_trailing` is set. Each new buffer
/// starts with the last `min(overlap, len)` characters of the previous chunk.
pub struct SentenceChunker {
    config: ChunkingConfig,
}

impl SentenceChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Normalize `text` and split it into chunks tagged with `source_id`.
    pub fn split(&self, text: &str, source_id: &str) -> Vec<Chunk> {
        let cleaned = clean_subtitles(text);
        debug!("Splitting {} characters", cleaned.chars().count());

        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0;
        let mut seed_len = 0;

        for sentence in cleaned.split('.') {
            if buffer_len >= self.config.chunk_size {
                let overlap = self.config.overlap.min(buffer_len);
                let seed = tail_chars(&buffer, overlap).to_string();
                debug!("New chunk of {} characters", buffer_len);
                chunks.push(Chunk::new(std::mem::replace(&mut buffer, seed), source_id));
                buffer_len = overlap;
                seed_len = overlap;
            }
            buffer.push_str(sentence);
            buffer_len += sentence.chars().count();
        }

        if self.config.flush_trailing && buffer_len > seed_len {
            debug!("Flushing trailing chunk of {} characters", buffer_len);
            chunks.push(Chunk::new(buffer, source_id));
        }

        chunks
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

/// The last `n` characters of `s`. `n` must not exceed the character count.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| &s[i..])
        .unwrap_or(s)
}
