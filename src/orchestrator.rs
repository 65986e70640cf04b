//! Pipeline orchestrator for vidqa.
//!
//! Wires settings into concrete services and exposes the ingest, answer,
//! list and clear operations the CLI drives.

use crate::completion::{Completer, OpenAICompleter};
use crate::config::{Prompts, Settings, VectorIndexProvider};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::metadata_store::{
    MemoryMetadataStore, MetadataStore, SqliteMetadataStore, VideoRecord,
};
use crate::pipeline::{Answer, Answerer, IngestOutcome, Ingestor};
use crate::vector_index::{MemoryBackend, QdrantBackend, VectorBackend, VectorIndex};
use crate::video_source::detect_source;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the vidqa pipeline.
pub struct Orchestrator {
    settings: Settings,
    index: Arc<VectorIndex>,
    store: Arc<dyn MetadataStore>,
    ingestor: Ingestor,
    answerer: Answerer,
}

impl Orchestrator {
    /// Create an orchestrator with services built from `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.qa_path.as_deref())?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let completer = OpenAICompleter::from_settings(&settings.completion)?;
        info!("Using completion model {}", completer.model());
        let completer: Arc<dyn Completer> = Arc::new(completer);

        let backend: Arc<dyn VectorBackend> = match settings.vector_index.provider {
            VectorIndexProvider::Qdrant => Arc::new(QdrantBackend::new(
                &settings.vector_index.url,
                settings.qdrant_api_key().as_deref(),
            )?),
            VectorIndexProvider::Memory => Arc::new(MemoryBackend::new()),
        };

        let store = build_metadata_store(&settings)?;

        Ok(Self::with_components(
            settings, prompts, embedder, backend, store, completer,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn VectorBackend>,
        store: Arc<dyn MetadataStore>,
        completer: Arc<dyn Completer>,
    ) -> Self {
        let index = Arc::new(VectorIndex::new(backend, &settings.vector_index.collection));

        let ingestor = Ingestor::new(
            embedder.clone(),
            index.clone(),
            store.clone(),
            (&settings.chunking).into(),
        );
        let answerer = Answerer::new(embedder, index.clone(), completer)
            .with_prompts(prompts)
            .with_search_limit(settings.rag.search_limit);

        Self {
            settings,
            index,
            store,
            ingestor,
            answerer,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve a reference (URL, id, path) to its source id.
    pub fn resolve_id(&self, reference: &str) -> Result<String> {
        detect_source(reference, &self.settings)?.resolve_id(reference)
    }

    /// Ingest the video behind `reference` unless it already was.
    #[instrument(skip(self))]
    pub async fn ingest(&self, reference: &str) -> Result<IngestOutcome> {
        let source = detect_source(reference, &self.settings)?;
        let source_id = source.resolve_id(reference)?;

        self.ingestor
            .ingest(&source_id, || source.fetch_document(reference))
            .await
    }

    /// Answer a question about the video behind `reference`.
    ///
    /// The video is not ingested implicitly.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str, reference: &str) -> Result<Answer> {
        let source_id = self.resolve_id(reference)?;
        self.answerer.answer(question, &source_id).await
    }

    /// Whether `source_id` has an ingestion record.
    pub async fn is_ingested(&self, source_id: &str) -> Result<bool> {
        Ok(self.store.get(source_id).await?.is_some())
    }

    /// All ingested videos, most recent first.
    pub async fn list(&self) -> Result<Vec<VideoRecord>> {
        self.store.list().await
    }

    /// Delete every indexed chunk and every ingestion record.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize> {
        self.index.clear().await?;
        let removed = self.store.clear().await?;
        info!("Cleared index and {} video records", removed);
        Ok(removed)
    }
}

/// Metadata store whose lifetime matches the configured vector index.
///
/// Ingestion records must not outlive the chunks they vouch for, so an
/// in-process index gets an in-process store.
pub fn build_metadata_store(settings: &Settings) -> Result<Arc<dyn MetadataStore>> {
    match settings.vector_index.provider {
        VectorIndexProvider::Qdrant => Ok(Arc::new(SqliteMetadataStore::new(
            &settings.sqlite_path(),
        )?)),
        VectorIndexProvider::Memory => Ok(Arc::new(MemoryMetadataStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VidqaError;
    use crate::pipeline::fakes::{FakeEmbedder, RecordingCompleter};
    use tempfile::TempDir;

    fn orchestrator(completer: Arc<RecordingCompleter>) -> Orchestrator {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 20;
        settings.chunking.overlap = 5;

        Orchestrator::with_components(
            settings,
            Prompts {
                qa: "{{context}}|{{question}}".to_string(),
            },
            Arc::new(FakeEmbedder::new()),
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryMetadataStore::new()),
            completer,
        )
    }

    fn transcript_file(dir: &TempDir) -> String {
        let path = dir.path().join("lecture.vtt");
        std::fs::write(
            &path,
            "WEBVTT\n\n00:00:00.000 --> 00:00:03.000\nHello world. This is a test.\n\n\
             00:00:03.000 --> 00:00:06.000\nAnother sentence here.\n",
        )
        .unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_ingest_then_answer() {
        let dir = TempDir::new().unwrap();
        let reference = transcript_file(&dir);
        let completer = Arc::new(RecordingCompleter::new());
        let orchestrator = orchestrator(completer.clone());

        let outcome = orchestrator.ingest(&reference).await.unwrap();
        assert_eq!(outcome.source_id, "local_lecture");
        assert_eq!(outcome.title, "lecture");
        assert!(outcome.chunks_indexed > 0);

        let again = orchestrator.ingest(&reference).await.unwrap();
        assert!(again.skipped);

        let answer = orchestrator.answer("What is this?", &reference).await.unwrap();
        assert_eq!(answer.text, "fake answer");
        assert!(!answer.chunks.is_empty());
        assert!(answer.chunks.iter().all(|c| c.source_id == "local_lecture"));
        assert!(completer
            .last_prompt()
            .unwrap()
            .ends_with("|What is this?"));

        let videos = orchestrator.list().await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "local_lecture");
    }

    #[tokio::test]
    async fn test_clear_allows_reingest() {
        let dir = TempDir::new().unwrap();
        let reference = transcript_file(&dir);
        let orchestrator = orchestrator(Arc::new(RecordingCompleter::new()));

        orchestrator.ingest(&reference).await.unwrap();
        assert_eq!(orchestrator.clear().await.unwrap(), 1);
        assert!(orchestrator.list().await.unwrap().is_empty());

        let answer = orchestrator.answer("anything", &reference).await.unwrap();
        assert!(answer.chunks.is_empty());

        let outcome = orchestrator.ingest(&reference).await.unwrap();
        assert!(!outcome.skipped);
    }

    #[tokio::test]
    async fn test_invalid_reference() {
        let orchestrator = orchestrator(Arc::new(RecordingCompleter::new()));
        let err = orchestrator.ingest("not a video").await.unwrap_err();
        assert!(matches!(err, VidqaError::InvalidReference(_)));
    }

    fn settings_with_sqlite(dir: &TempDir, provider: VectorIndexProvider) -> Settings {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 20;
        settings.chunking.overlap = 5;
        settings.vector_index.provider = provider;
        settings.metadata_store.sqlite_path =
            dir.path().join("main.db").to_string_lossy().to_string();
        settings
    }

    fn orchestrator_from(settings: Settings) -> Orchestrator {
        let store = build_metadata_store(&settings).unwrap();
        Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(FakeEmbedder::new()),
            Arc::new(MemoryBackend::new()),
            store,
            Arc::new(RecordingCompleter::new()),
        )
    }

    #[tokio::test]
    async fn test_memory_index_does_not_keep_records_across_runs() {
        let dir = TempDir::new().unwrap();
        let reference = transcript_file(&dir);
        let settings = settings_with_sqlite(&dir, VectorIndexProvider::Memory);

        let first = orchestrator_from(settings.clone());
        let outcome = first.ingest(&reference).await.unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.chunks_indexed, 2);

        let second = orchestrator_from(settings);
        let outcome = second.ingest(&reference).await.unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.chunks_indexed, 2);

        let answer = second.answer("What is this?", &reference).await.unwrap();
        assert!(!answer.chunks.is_empty());
        assert!(!dir.path().join("main.db").exists());
    }

    #[tokio::test]
    async fn test_qdrant_provider_persists_records() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with_sqlite(&dir, VectorIndexProvider::Qdrant);

        let store = build_metadata_store(&settings).unwrap();
        store.put(&VideoRecord::new("abc", "Kept")).await.unwrap();
        drop(store);

        let reopened = build_metadata_store(&settings).unwrap();
        assert_eq!(reopened.get("abc").await.unwrap().unwrap().title, "Kept");
    }
}
