//! Qdrant vector backend over the REST API.

use super::{IndexRecord, KeywordFilter, ScoredChunk, VectorBackend};
use crate::chunking::Chunk;
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Vector backend talking to a Qdrant server.
///
/// Each record is stored under a fresh UUID point id so that batches never
/// overwrite each other; the batch-local id is kept in the payload as
/// `record_id`.
pub struct QdrantBackend {
    client: Client,
    base_url: String,
}

impl QdrantBackend {
    /// Create a backend for the server at `url`.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VidqaError::Config(format!(
                "Qdrant URL must be an http(s) URL: {}",
                url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| VidqaError::Config(format!("Invalid Qdrant API key: {}", e)))?;
            headers.insert("api-key", value);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Server URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str, suffix: &str) -> String {
        format!("{}/collections/{}{}", self.base_url, collection, suffix)
    }
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    field_name: &'a str,
    field_schema: &'static str,
}

#[derive(Serialize)]
struct UpsertRequest {
    points: Vec<PointStruct>,
}

#[derive(Serialize)]
struct PointStruct {
    id: String,
    vector: Vec<f32>,
    payload: PointPayload,
}

#[derive(Serialize, Deserialize)]
struct PointPayload {
    text: String,
    source_id: String,
    #[serde(default)]
    record_id: u64,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<SearchFilter<'a>>,
}

#[derive(Serialize)]
struct SearchFilter<'a> {
    must: Vec<FieldCondition<'a>>,
}

#[derive(Serialize)]
struct FieldCondition<'a> {
    key: &'a str,
    #[serde(rename = "match")]
    matches: MatchValue<'a>,
}

#[derive(Serialize)]
struct MatchValue<'a> {
    value: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: Option<PointPayload>,
}

impl<'a> SearchFilter<'a> {
    fn from_keyword(filter: &'a KeywordFilter) -> Self {
        Self {
            must: vec![FieldCondition {
                key: &filter.key,
                matches: MatchValue {
                    value: &filter.value,
                },
            }],
        }
    }
}

/// Map a non-success response to an error, keeping the body for context.
async fn check_status(response: Response, collection: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(status_error(status, &body, collection))
}

fn status_error(status: StatusCode, body: &str, collection: &str) -> VidqaError {
    match status {
        StatusCode::NOT_FOUND => VidqaError::CollectionNotFound(collection.to_string()),
        StatusCode::CONFLICT => VidqaError::AlreadyExists(collection.to_string()),
        StatusCode::BAD_REQUEST if body.contains("already exists") => {
            VidqaError::AlreadyExists(collection.to_string())
        }
        _ => VidqaError::VectorIndex(format!("Qdrant request failed ({}): {}", status, body)),
    }
}

#[async_trait]
impl VectorBackend for QdrantBackend {
    #[instrument(skip(self))]
    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<()> {
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: dimension,
                distance: "Cosine",
            },
        };
        let response = self
            .client
            .put(self.collection_url(collection, ""))
            .json(&request)
            .send()
            .await?;
        check_status(response, collection).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<()> {
        let request = CreateIndexRequest {
            field_name: field,
            field_schema: "keyword",
        };
        let response = self
            .client
            .put(self.collection_url(collection, "/index?wait=true"))
            .json(&request)
            .send()
            .await?;
        check_status(response, collection).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.collection_url(collection, ""))
            .send()
            .await?;
        match check_status(response, collection).await {
            Ok(_) | Err(VidqaError::CollectionNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points = records
            .iter()
            .map(|record| PointStruct {
                id: Uuid::new_v4().to_string(),
                vector: record.vector.clone(),
                payload: PointPayload {
                    text: record.payload.text.clone(),
                    source_id: record.payload.source_id.clone(),
                    record_id: record.id,
                },
            })
            .collect();

        let response = self
            .client
            .put(self.collection_url(collection, "/points?wait=true"))
            .json(&UpsertRequest { points })
            .send()
            .await?;
        check_status(response, collection).await?;
        debug!("Upserted {} points into {}", records.len(), collection);
        Ok(())
    }

    #[instrument(skip(self, vector, filter))]
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&KeywordFilter>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
            filter: filter.map(SearchFilter::from_keyword),
        };
        let response = self
            .client
            .post(self.collection_url(collection, "/points/search"))
            .json(&request)
            .send()
            .await?;
        let response = check_status(response, collection).await?;
        let parsed: SearchResponse = response.json().await?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|point| {
                point.payload.map(|payload| ScoredChunk {
                    chunk: Chunk::new(payload.text, payload.source_id),
                    score: point.score,
                })
            })
            .collect())
    }
}
