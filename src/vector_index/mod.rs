//! Vector index for transcript chunks.
//!
//! [`VectorIndex`] owns the collection lifecycle and the filtered search
//! contract on top of a [`VectorBackend`], the opaque vector-search service.

mod memory;
mod qdrant;

pub use memory::MemoryBackend;
pub use qdrant::QdrantBackend;

use crate::chunking::Chunk;
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Payload field holding the source id; keyword-indexed for filtering.
pub const SOURCE_ID_FIELD: &str = "source_id";

/// Default number of results returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 4;

/// A chunk paired with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub vector: Vec<f32>,
    pub chunk: Chunk,
}

/// A record as written to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Position within its upload batch, starting at 0.
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Chunk,
}

/// A search hit with its similarity score (higher is better).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Exact-match condition on a keyword payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    pub key: String,
    pub value: String,
}

impl KeywordFilter {
    /// Restrict results to one source id.
    pub fn source_id(value: &str) -> Self {
        Self {
            key: SOURCE_ID_FIELD.to_string(),
            value: value.to_string(),
        }
    }
}

/// Trait for vector-search services.
///
/// Collections use cosine distance. Implementations report an existing
/// collection on create as [`VidqaError::AlreadyExists`] and a missing one as
/// [`VidqaError::CollectionNotFound`].
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Create a collection of `dimension`-sized vectors.
    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<()>;

    /// Create a keyword index on a payload field.
    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<()>;

    /// Delete a collection and all its records. Deleting a missing collection succeeds.
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Write records. Records are never merged with existing ones.
    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()>;

    /// Nearest neighbours by decreasing similarity, at most `limit`.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&KeywordFilter>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;
}

/// Collection-scoped handle over a vector backend.
pub struct VectorIndex {
    backend: Arc<dyn VectorBackend>,
    collection: String,
    /// Configured vector size; 0 until `ensure_collection` runs.
    dimension: AtomicUsize,
}

impl VectorIndex {
    /// Create a handle for `collection`. Call [`ensure_collection`](Self::ensure_collection) before use.
    pub fn new(backend: Arc<dyn VectorBackend>, collection: &str) -> Self {
        Self {
            backend,
            collection: collection.to_string(),
            dimension: AtomicUsize::new(0),
        }
    }

    /// Collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Configured vector dimension, once known.
    pub fn dimension(&self) -> Option<usize> {
        match self.dimension.load(Ordering::Relaxed) {
            0 => None,
            d => Some(d),
        }
    }

    /// Create the collection and its `source_id` keyword index if absent.
    ///
    /// An existing collection is not an error.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(VidqaError::Config(
                "Vector dimension must be greater than zero".to_string(),
            ));
        }
        self.dimension.store(dimension, Ordering::Relaxed);

        match self.backend.create_collection(&self.collection, dimension).await {
            Ok(()) => {
                self.backend
                    .create_keyword_index(&self.collection, SOURCE_ID_FIELD)
                    .await?;
                info!("Created collection {} ({} dimensions)", self.collection, dimension);
                Ok(())
            }
            Err(VidqaError::AlreadyExists(_)) => {
                debug!("Collection {} already exists", self.collection);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the whole collection, for every source id.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn clear(&self) -> Result<()> {
        self.backend.delete_collection(&self.collection).await?;
        info!("Deleted collection {}", self.collection);
        Ok(())
    }

    /// Write a batch, assigning ids `0..n` in order. Returns the number written.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn upload(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize> {
        for embedded in &chunks {
            self.check_dimension(&embedded.vector)?;
        }

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .enumerate()
            .map(|(idx, embedded)| IndexRecord {
                id: idx as u64,
                vector: embedded.vector,
                payload: embedded.chunk,
            })
            .collect();

        self.backend.upsert(&self.collection, &records).await?;
        debug!("Uploaded {} records", records.len());
        Ok(records.len())
    }

    /// Most similar chunks, restricted to `source_id` when given.
    pub async fn search(
        &self,
        query_vector: &[f32],
        source_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Chunk>> {
        let hits = self.search_scored(query_vector, source_id, limit).await?;
        Ok(hits.into_iter().map(|hit| hit.chunk).collect())
    }

    /// A missing collection yields no results rather than an error.
    #[instrument(skip(self, query_vector))]
    async fn search_scored(
        &self,
        query_vector: &[f32],
        source_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        self.check_dimension(query_vector)?;

        let filter = source_id.map(KeywordFilter::source_id);
        match self
            .backend
            .search(&self.collection, query_vector, filter.as_ref(), limit)
            .await
        {
            Ok(hits) => {
                debug!("Found {} matching chunks", hits.len());
                Ok(hits)
            }
            Err(VidqaError::CollectionNotFound(_)) => {
                debug!("Collection {} is missing, returning no results", self.collection);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        match self.dimension() {
            Some(expected) if expected != vector.len() => Err(VidqaError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
