//! vidqa - Question answering over video transcripts
//!
//! Ingests a video's subtitles into a vector index and answers questions
//! about that one video with a language model.
//!
//! # Overview
//!
//! - Fetch subtitles for a YouTube video (via `yt-dlp`) or read a local transcript
//! - Split them into overlapping, sentence-aligned chunks
//! - Embed the chunks and store them in Qdrant, tagged with the video id
//! - Answer questions using only chunks from the asked-about video
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `video_source` - Reference resolution and transcript fetching
//! - `chunking` - Subtitle cleanup and chunking
//! - `embedding` - Embedding generation
//! - `vector_index` - Collection lifecycle and filtered similarity search
//! - `metadata_store` - Record of ingested videos
//! - `completion` - Answer generation
//! - `pipeline` - Ingestion and answering pipelines
//! - `orchestrator` - Wiring from settings
//!
//! # Example
//!
//! ```rust,no_run
//! use vidqa::config::Settings;
//! use vidqa::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let outcome = orchestrator.ingest("dQw4w9WgXcQ").await?;
//!     println!("Indexed {} chunks", outcome.chunks_indexed);
//!
//!     let answer = orchestrator.answer("What is the song about?", "dQw4w9WgXcQ").await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod metadata_store;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;
pub mod vector_index;
pub mod video_source;

pub use error::{ErrorKind, Result, VidqaError};
