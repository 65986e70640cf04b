//! OpenAI-compatible embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, VidqaError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    send_dimensions: bool,
}

impl OpenAIEmbedder {
    /// Create a new embedder from settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let client = create_client(settings.base_url.as_deref(), settings.api_key.as_deref())?;
        Ok(Self {
            client,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            send_dimensions: settings.send_dimensions,
        })
    }

    /// Create a new embedder with custom model and dimensions against api.openai.com.
    pub fn with_config(model: &str, dimensions: usize) -> Result<Self> {
        Self::from_settings(&EmbeddingSettings {
            model: model.to_string(),
            dimensions: dimensions as u32,
            ..EmbeddingSettings::default()
        })
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(VidqaError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VidqaError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Providers cap the number of inputs per request
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if self.send_dimensions {
                args.dimensions(self.dimensions as u32);
            }
            let request = args
                .build()
                .map_err(|e| VidqaError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                VidqaError::OpenAI(format!("Embedding API error: {}", e))
            })?;

            if response.data.len() != chunk.len() {
                return Err(VidqaError::Embedding(format!(
                    "Requested {} embeddings, received {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                self.check_dimensions(&embedding_data.embedding)?;
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::with_config("text-embedding-3-small", 1536).unwrap();
        assert_eq!(embedder.dimensions(), 1536);

        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_check_dimensions() {
        let embedder = OpenAIEmbedder::with_config("text-embedding-3-small", 3).unwrap();
        assert!(embedder.check_dimensions(&[0.1, 0.2, 0.3]).is_ok());
        assert!(matches!(
            embedder.check_dimensions(&[0.1, 0.2]),
            Err(VidqaError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }
}
