//! vidqa CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidqa::cli::{commands, Cli, Commands};
use vidqa::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidqa={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Ingest { reference } => {
            commands::run_ingest(reference, settings).await?;
        }

        Commands::Ask {
            reference,
            question,
        } => {
            commands::run_ask(reference, question, settings).await?;
        }

        Commands::Chat { reference } => {
            commands::run_chat(reference, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Clear { yes } => {
            commands::run_clear(*yes, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), settings)?;
        }
    }

    Ok(())
}
