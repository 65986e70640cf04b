//! Ingestion: fetch, chunk, embed, upload, then mark as ingested.

use crate::chunking::{ChunkingConfig, SentenceChunker};
use crate::embedding::Embedder;
use crate::error::{Result, VidqaError};
use crate::metadata_store::{MetadataStore, VideoRecord};
use crate::vector_index::{EmbeddedChunk, VectorIndex};
use crate::video_source::SourceDocument;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of ingesting one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub source_id: String,
    pub title: String,
    pub chunks_indexed: usize,
    /// The video was already ingested and nothing was fetched.
    pub skipped: bool,
}

/// Writes transcripts into the vector index at most once per source id.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    store: Arc<dyn MetadataStore>,
    chunker: SentenceChunker,
}

impl Ingestor {
    /// Create an ingestor over the given collaborators.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        store: Arc<dyn MetadataStore>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            chunker: SentenceChunker::new(chunking),
        }
    }

    /// Ingest `source_id`, calling `fetch` only if it has not been ingested yet.
    ///
    /// The ingestion mark is written only after the upload succeeds, so any
    /// earlier failure leaves the video eligible for a full retry.
    #[instrument(skip(self, fetch))]
    pub async fn ingest<F, Fut>(&self, source_id: &str, fetch: F) -> Result<IngestOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SourceDocument>>,
    {
        info!("[{}] Processing ...", source_id);

        if let Some(record) = self.store.get(source_id).await? {
            info!("[{}] Already ingested, skipping", source_id);
            return Ok(IngestOutcome {
                source_id: record.id,
                title: record.title,
                chunks_indexed: 0,
                skipped: true,
            });
        }

        info!("[{}] Downloading ...", source_id);
        let document = fetch().await?;

        info!("[{}] Splitting ...", source_id);
        let chunks = self.chunker.split(&document.text, source_id);
        if chunks.is_empty() {
            warn!(
                "[{}] Transcript produced no chunks; marking as ingested anyway",
                source_id
            );
        }

        let mut chunks_indexed = 0;
        if !chunks.is_empty() {
            info!("[{}] Embeddings ...", source_id);
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != chunks.len() {
                return Err(VidqaError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunks.len(),
                    vectors.len()
                )));
            }

            let embedded: Vec<EmbeddedChunk> = vectors
                .into_iter()
                .zip(chunks)
                .map(|(vector, chunk)| EmbeddedChunk { vector, chunk })
                .collect();

            self.index.ensure_collection(self.embedder.dimensions()).await?;
            chunks_indexed = self.index.upload(embedded).await?;
        }

        info!("[{}] Updating DB ...", source_id);
        self.store
            .put(&VideoRecord::new(source_id, document.title.clone()))
            .await?;

        info!("[{}] Done!", source_id);
        Ok(IngestOutcome {
            source_id: source_id.to_string(),
            title: document.title,
            chunks_indexed,
            skipped: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::metadata_store::MemoryMetadataStore;
    use crate::pipeline::fakes::{FailingUploadBackend, FakeEmbedder};
    use crate::vector_index::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TRANSCRIPT: &str = "Hello world. This is a test. Another sentence here.";

    fn document(id: &str) -> SourceDocument {
        SourceDocument {
            source_id: id.to_string(),
            title: "A talk".to_string(),
            text: TRANSCRIPT.to_string(),
        }
    }

    fn small_chunks() -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: 20,
            overlap: 5,
            flush_trailing: false,
        }
    }

    struct Setup {
        ingestor: Ingestor,
        index: Arc<VectorIndex>,
        store: Arc<MemoryMetadataStore>,
        embedder: Arc<FakeEmbedder>,
    }

    fn setup(chunking: ChunkingConfig) -> Setup {
        let embedder = Arc::new(FakeEmbedder::new());
        let index = Arc::new(VectorIndex::new(Arc::new(MemoryBackend::new()), "embeddings"));
        let store = Arc::new(MemoryMetadataStore::new());
        let ingestor = Ingestor::new(embedder.clone(), index.clone(), store.clone(), chunking);
        Setup {
            ingestor,
            index,
            store,
            embedder,
        }
    }

    #[tokio::test]
    async fn test_ingest_uploads_chunks_and_marks() {
        let s = setup(small_chunks());

        let outcome = s
            .ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap();

        assert!(!outcome.skipped);
        assert_eq!(outcome.title, "A talk");
        assert_eq!(outcome.chunks_indexed, 2);
        assert_eq!(s.store.get("abc").await.unwrap().unwrap().title, "A talk");

        let vector = FakeEmbedder::new().embed("anything").await.unwrap();
        let chunks = s.index.search(&vector, Some("abc"), 10).await.unwrap();
        let mut texts: Vec<String> = chunks.into_iter().map(|c| c.text).collect();
        texts.sort();
        assert_eq!(
            texts,
            vec![
                " test Another sentence here".to_string(),
                "Hello world This is a test".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_ingest_skips_fetch() {
        let s = setup(small_chunks());
        let fetches = AtomicUsize::new(0);
        let counter = &fetches;

        for _ in 0..2 {
            s.ingestor
                .ingest("abc", move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(document("abc"))
                })
                .await
                .unwrap();
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(s.embedder.batch_calls.load(Ordering::SeqCst), 1);

        let outcome = s
            .ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap();
        assert!(outcome.skipped);
        assert_eq!(outcome.title, "A talk");
        assert_eq!(outcome.chunks_indexed, 0);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_no_mark() {
        let embedder = Arc::new(FakeEmbedder::new());
        let index = Arc::new(VectorIndex::new(Arc::new(FailingUploadBackend), "embeddings"));
        let store = Arc::new(MemoryMetadataStore::new());
        let ingestor = Ingestor::new(embedder, index, store.clone(), small_chunks());

        let err = ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap_err();

        assert!(matches!(err, VidqaError::VectorIndex(_)));
        assert!(store.get("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_mark() {
        let s = setup(small_chunks());

        let err = s
            .ingestor
            .ingest("abc", || async {
                Err(VidqaError::TranscriptNotFound("abc".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, VidqaError::TranscriptNotFound(_)));
        assert!(s.store.get("abc").await.unwrap().is_none());

        let outcome = s
            .ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap();
        assert!(!outcome.skipped);
    }

    #[tokio::test]
    async fn test_short_transcript_still_marks() {
        let s = setup(ChunkingConfig::default());

        let outcome = s
            .ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap();

        assert_eq!(outcome.chunks_indexed, 0);
        assert_eq!(s.embedder.batch_calls.load(Ordering::SeqCst), 0);
        assert!(s.store.get("abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_flush_trailing_indexes_final_buffer() {
        let s = setup(ChunkingConfig {
            flush_trailing: true,
            ..ChunkingConfig::default()
        });

        let outcome = s
            .ingestor
            .ingest("abc", || async { Ok(document("abc")) })
            .await
            .unwrap();

        assert_eq!(outcome.chunks_indexed, 1);
        let vector = FakeEmbedder::new().embed("x").await.unwrap();
        let chunks = s.index.search(&vector, Some("abc"), 10).await.unwrap();
        assert_eq!(
            chunks,
            vec![Chunk::new(
                "Hello world This is a test Another sentence here",
                "abc"
            )]
        );
    }
}
