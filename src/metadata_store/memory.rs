//! In-memory metadata store (useful for testing).

use super::{MetadataStore, VideoRecord};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory metadata store.
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<String, VideoRecord>>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> VidqaError {
    VidqaError::MetadataStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.get(id).cloned())
    }

    async fn put(&self, record: &VideoRecord) -> Result<bool> {
        let mut records = self.records.write().map_err(lock_error)?;
        if records.contains_key(&record.id) {
            return Ok(false);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        let mut all: Vec<VideoRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
        Ok(all)
    }

    async fn clear(&self) -> Result<usize> {
        let mut records = self.records.write().map_err(lock_error)?;
        let count = records.len();
        records.clear();
        Ok(count)
    }
}
