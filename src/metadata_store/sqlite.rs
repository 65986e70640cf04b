//! SQLite-based metadata store.

use super::{MetadataStore, VideoRecord};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    ingested_at TEXT NOT NULL
);
"#;

/// SQLite-based metadata store.
pub struct SqliteMetadataStore {
    conn: Mutex<Connection>,
}

impl SqliteMetadataStore {
    /// Open (or create) the database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite metadata store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VidqaError::MetadataStore(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<VideoRecord> {
        let ingested_at_str: String = row.get(2)?;
        Ok(VideoRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            ingested_at: DateTime::parse_from_rfc3339(&ingested_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        let conn = self.lock()?;
        let record = conn.query_row(
            "SELECT id, title, ingested_at FROM videos WHERE id = ?1",
            params![id],
            Self::row_to_record,
        );

        match record {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn put(&self, record: &VideoRecord) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO videos (id, title, ingested_at) VALUES (?1, ?2, ?3)",
            params![record.id, record.title, record.ingested_at.to_rfc3339()],
        )?;

        debug!("Stored video {} ({} row inserted)", record.id, inserted);
        Ok(inserted > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, title, ingested_at FROM videos ORDER BY ingested_at DESC")?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM videos", [])?;
        info!("Deleted {} video records", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        assert!(store.get("abc").await.unwrap().is_none());

        let record = VideoRecord::new("abc", "A talk");
        assert!(store.put(&record).await.unwrap());

        let stored = store.get("abc").await.unwrap().unwrap();
        assert_eq!(stored.id, "abc");
        assert_eq!(stored.title, "A talk");
        assert_eq!(stored.ingested_at.timestamp(), record.ingested_at.timestamp());
    }

    #[tokio::test]
    async fn test_put_ignores_existing_id() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        assert!(store.put(&VideoRecord::new("abc", "First")).await.unwrap());
        assert!(!store.put(&VideoRecord::new("abc", "Second")).await.unwrap());
        assert_eq!(store.get("abc").await.unwrap().unwrap().title, "First");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let mut older = VideoRecord::new("old", "Old");
        older.ingested_at = Utc::now() - Duration::hours(1);
        store.put(&older).await.unwrap();
        store.put(&VideoRecord::new("new", "New")).await.unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("main.db");

        {
            let store = SqliteMetadataStore::new(&path).unwrap();
            store.put(&VideoRecord::new("abc", "Kept")).await.unwrap();
        }

        let store = SqliteMetadataStore::new(&path).unwrap();
        assert_eq!(store.get("abc").await.unwrap().unwrap().title, "Kept");
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.get("abc").await.unwrap().is_none());
    }
}
