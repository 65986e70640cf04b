//! Configuration module for vidqa.
//!
//! Handles loading application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QA_PLACEHOLDERS};
pub use settings::{
    ChunkingSettings, CompletionSettings, EmbeddingSettings, GeneralSettings,
    MetadataStoreSettings, PromptSettings, RagSettings, Settings, VectorIndexProvider,
    VectorIndexSettings, YoutubeSettings,
};
