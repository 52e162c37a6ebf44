//! Ingest command implementation.

use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(input: &str, force: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    preflight::check(Operation::Ingest { input })?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching and indexing transcript...");
    let result = orchestrator.ingest(input, force).await;
    spinner.finish_and_clear();

    let result = result?;
    if result.skipped {
        Output::info(&format!(
            "{} is already indexed ({} chunks). Use --force to re-index.",
            result.video_id, result.chunks_indexed
        ));
        return Ok(());
    }

    Output::success(&format!("Indexed {}", result.video_id));
    Output::kv("Source", &result.source);
    Output::kv("Chunks", &result.chunks_indexed.to_string());
    if let Some(duration) = result.duration_seconds {
        Output::kv("Duration", &format_duration(duration));
    }

    Ok(())
}
