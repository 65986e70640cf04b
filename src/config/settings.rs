//! Configuration settings for vidqa.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_index: VectorIndexSettings,
    pub metadata_store: MetadataStoreSettings,
    pub completion: CompletionSettings,
    pub rag: RagSettings,
    pub youtube: YoutubeSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory where downloaded subtitle files are kept.
    pub subtitles_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vidqa".to_string(),
            subtitles_dir: "~/.vidqa/subtitles".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible API. `None` uses api.openai.com.
    pub base_url: Option<String>,
    /// API key. Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions. Must match the vector index collection.
    pub dimensions: u32,
    /// Send `dimensions` with each request (only some models accept it).
    pub send_dimensions: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
            send_dimensions: true,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Character count at which a chunk is emitted.
    pub chunk_size: usize,
    /// Characters carried over from one chunk into the next.
    pub overlap: usize,
    /// Emit the final undersized buffer instead of dropping it.
    pub flush_trailing: bool,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
            flush_trailing: false,
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VectorIndexProvider {
    /// Qdrant over its REST API.
    #[default]
    Qdrant,
    /// In-process index, lost when the process exits.
    Memory,
}

impl std::str::FromStr for VectorIndexProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(VectorIndexProvider::Qdrant),
            "memory" => Ok(VectorIndexProvider::Memory),
            _ => Err(format!("Unknown vector index provider: {}", s)),
        }
    }
}

impl std::fmt::Display for VectorIndexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorIndexProvider::Qdrant => write!(f, "qdrant"),
            VectorIndexProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexSettings {
    /// Backend provider (qdrant, memory).
    pub provider: VectorIndexProvider,
    /// Qdrant REST endpoint.
    pub url: String,
    /// Qdrant API key. Falls back to `QDRANT_API_KEY`.
    pub api_key: Option<String>,
    /// Collection name.
    pub collection: String,
}

impl Default for VectorIndexSettings {
    fn default() -> Self {
        Self {
            provider: VectorIndexProvider::Qdrant,
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "embeddings".to_string(),
        }
    }
}

/// Metadata store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataStoreSettings {
    /// Path to the SQLite database holding ingested videos.
    pub sqlite_path: String,
}

impl Default for MetadataStoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.vidqa/main.db".to_string(),
        }
    }
}

/// Completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Base URL of an OpenAI-compatible chat API.
    pub base_url: Option<String>,
    /// API key. Local servers ignore it but the client requires one.
    pub api_key: Option<String>,
    /// Chat model name.
    pub model: String,
    /// Maximum tokens in the generated answer.
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: Some("http://localhost:11434/v1".to_string()),
            api_key: Some("mistral".to_string()),
            model: "mistral".to_string(),
            max_tokens: 1024,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Number of chunks retrieved per question.
    pub search_limit: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self { search_limit: 4 }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Subtitle languages requested from yt-dlp, in preference order.
    pub subtitle_langs: Vec<String>,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            subtitle_langs: vec!["en".to_string()],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Path to a custom question-answering template.
    pub qa_path: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded subtitles directory path.
    pub fn subtitles_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.subtitles_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.metadata_store.sqlite_path)
    }

    /// Qdrant API key from settings or the environment.
    pub fn qdrant_api_key(&self) -> Option<String> {
        self.vector_index
            .api_key
            .clone()
            .or_else(|| std::env::var("QDRANT_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}
