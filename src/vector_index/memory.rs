//! In-memory vector backend.
//!
//! Useful for testing and for trying the pipeline without a Qdrant server.

use super::{cosine_similarity, IndexRecord, KeywordFilter, ScoredChunk, VectorBackend};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

struct MemoryCollection {
    dimension: usize,
    keyword_fields: Vec<String>,
    records: Vec<IndexRecord>,
}

/// In-memory vector backend with brute-force cosine search.
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records stored in `collection`.
    pub fn record_count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(lock_error)?;
        collections
            .get(collection)
            .map(|c| c.records.len())
            .ok_or_else(|| VidqaError::CollectionNotFound(collection.to_string()))
    }

    /// Payload fields with a keyword index in `collection`.
    pub fn keyword_fields(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(lock_error)?;
        collections
            .get(collection)
            .map(|c| c.keyword_fields.clone())
            .ok_or_else(|| VidqaError::CollectionNotFound(collection.to_string()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> VidqaError {
    VidqaError::VectorIndex(format!("Failed to acquire lock: {}", e))
}

fn matches_filter(record: &IndexRecord, filter: Option<&KeywordFilter>) -> Result<bool> {
    let Some(filter) = filter else {
        return Ok(true);
    };
    let payload = serde_json::to_value(&record.payload)?;
    Ok(payload.get(&filter.key).and_then(|v| v.as_str()) == Some(filter.value.as_str()))
}

#[async_trait]
impl VectorBackend for MemoryBackend {
    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<()> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        if collections.contains_key(collection) {
            return Err(VidqaError::AlreadyExists(collection.to_string()));
        }
        collections.insert(
            collection.to_string(),
            MemoryCollection {
                dimension,
                keyword_fields: Vec::new(),
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VidqaError::CollectionNotFound(collection.to_string()))?;
        if !entry.keyword_fields.iter().any(|f| f == field) {
            entry.keyword_fields.push(field.to_string());
        }
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        collections.remove(collection);
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VidqaError::CollectionNotFound(collection.to_string()))?;

        if let Some(bad) = records.iter().find(|r| r.vector.len() != entry.dimension) {
            return Err(VidqaError::VectorIndex(format!(
                "Wrong vector dimension for record {}: expected {}, got {}",
                bad.id,
                entry.dimension,
                bad.vector.len()
            )));
        }

        entry.records.extend_from_slice(records);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&KeywordFilter>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().map_err(lock_error)?;
        let entry = collections
            .get(collection)
            .ok_or_else(|| VidqaError::CollectionNotFound(collection.to_string()))?;

        let mut results = Vec::new();
        for record in &entry.records {
            if matches_filter(record, filter)? {
                results.push(ScoredChunk {
                    chunk: record.payload.clone(),
                    score: cosine_similarity(vector, &record.vector),
                });
            }
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }
}
