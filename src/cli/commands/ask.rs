//! Ask command implementation.

use crate::citation::{format_timestamp, generate_youtube_link};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video_id: &str,
    question: &str,
    k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    preflight::check(Operation::Query)?;

    let watch_url = settings.youtube.watch_url.clone();
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching transcript...");
    let result = orchestrator.ask(video_id, question, k).await;
    spinner.finish_and_clear();

    let response = result?;

    if let Some(error) = &response.synthesis_error {
        Output::warning(&format!("Answer generation failed: {}", error));
    }
    println!("\n{}\n", response.answer_text);

    if !response.sources.is_empty() {
        Output::header("Sources");
        for source in &response.sources {
            Output::source(
                source.rank,
                &format_timestamp(source.timestamp),
                source.similarity,
                &source.text,
                &generate_youtube_link(&watch_url, &response.video_id, source.timestamp),
            );
        }
    }

    if let Some(usage) = response.token_usage {
        tracing::info!(
            "Token usage: {} prompt, {} completion",
            usage.prompt_tokens,
            usage.completion_tokens
        );
    }

    Ok(())
}
