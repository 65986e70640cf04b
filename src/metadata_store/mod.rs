//! Record of which videos have been ingested.
//!
//! A [`VideoRecord`] is written only after a video's chunks have been
//! uploaded, and its presence is what makes re-ingestion a no-op.

mod memory;
mod sqlite;

pub use memory::MemoryMetadataStore;
pub use sqlite::SqliteMetadataStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ingested video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Source id of the video.
    pub id: String,
    /// Video title.
    pub title: String,
    /// When ingestion completed.
    pub ingested_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ingested_at: Utc::now(),
        }
    }
}

/// Trait for ingestion-mark storage.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up a video by id.
    async fn get(&self, id: &str) -> Result<Option<VideoRecord>>;

    /// Insert a record unless one with the same id exists.
    ///
    /// Returns `true` if a row was inserted.
    async fn put(&self, record: &VideoRecord) -> Result<bool>;

    /// All records, most recently ingested first.
    async fn list(&self) -> Result<Vec<VideoRecord>>;

    /// Remove every record. Returns the number removed.
    async fn clear(&self) -> Result<usize>;
}
