//! tubequery CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubequery::cli::{commands, Cli, Commands};
use tubequery::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubequery={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Ingest { input, force } => {
            commands::run_ingest(input, *force, settings).await?;
        }

        Commands::Ask { video_id, question, k } => {
            commands::run_ask(video_id, question, *k, settings).await?;
        }

        Commands::Summarize { video_id } => {
            commands::run_summarize(video_id, settings).await?;
        }

        Commands::Context {
            video_id,
            seconds,
            window,
        } => {
            commands::run_context(video_id, *seconds, *window, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Remove { video_id } => {
            commands::run_remove(video_id, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), settings)?;
        }
    }

    Ok(())
}
