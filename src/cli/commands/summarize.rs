//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(video_id: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Query)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Summarizing video...");
    let result = orchestrator.summarize(video_id).await;
    spinner.finish_and_clear();

    let summary = result?;
    println!("\n{}\n", summary.summary_text);
    Output::kv("Excerpts used", &summary.chunks_used.to_string());
    Output::kv("Model", &summary.model_id);

    Ok(())
}
