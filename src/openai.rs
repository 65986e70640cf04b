//! OpenAI-compatible client construction.
//!
//! Both embeddings and completions may point at api.openai.com or at any
//! server speaking the same API (Ollama, vLLM, ...).

use crate::error::{Result, VidqaError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the given endpoint.
///
/// `api_key` falls back to the `OPENAI_API_KEY` environment variable.
pub fn create_client(base_url: Option<&str>, api_key: Option<&str>) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    base_url: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidqaError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(url) = base_url {
        config = config.with_api_base(url.trim_end_matches('/'));
    }
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
