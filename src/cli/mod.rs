//! CLI module for vidqa.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidqa - Ask questions about videos
///
/// Downloads a video's subtitles, indexes them in a vector database, and
/// answers questions using only that video's transcript as context.
#[derive(Parser, Debug)]
#[command(name = "vidqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and index a video's transcript
    Ingest {
        /// YouTube URL/ID, or local transcript file (.vtt, .srt, .txt)
        reference: String,
    },

    /// Ask a single question about an ingested video
    Ask {
        /// YouTube URL/ID, or local transcript file
        reference: String,

        /// The question to ask
        question: String,
    },

    /// Ingest a video, then answer questions until an empty line is entered
    Chat {
        /// YouTube URL/ID, or local transcript file
        reference: String,
    },

    /// List ingested videos
    List,

    /// Delete the whole index and every ingestion record
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
