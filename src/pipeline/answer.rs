//! Question answering over one ingested video.

use crate::chunking::Chunk;
use crate::completion::Completer;
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{Result, VidqaError};
use crate::vector_index::{VectorIndex, DEFAULT_SEARCH_LIMIT};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An answer with the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub chunks: Vec<Chunk>,
}

/// Retrieves context for a question and asks the completer to answer it.
pub struct Answerer {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    completer: Arc<dyn Completer>,
    prompts: Prompts,
    search_limit: usize,
}

impl Answerer {
    /// Create an answerer with the default prompt and search limit.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        completer: Arc<dyn Completer>,
    ) -> Self {
        Self {
            embedder,
            index,
            completer,
            prompts: Prompts::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Use custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set how many chunks are retrieved per question.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Answer `question` using only chunks from `source_id`.
    ///
    /// An empty retrieval still reaches the completer, with an empty context.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str, source_id: &str) -> Result<Answer> {
        info!("[{}] Answering question", source_id);

        let vector = self.embedder.embed(question).await?;
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(VidqaError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let chunks = self
            .index
            .search(&vector, Some(source_id), self.search_limit)
            .await?;
        debug!("Retrieved {} chunks", chunks.len());

        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = self.prompts.render_qa(question, &context);
        debug!("Prompt:\n{}", prompt);

        let text = self.completer.complete(&prompt).await?;

        Ok(Answer { text, chunks })
    }
}
