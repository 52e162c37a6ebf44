//! Context command implementation.

use crate::citation::{format_timestamp, generate_youtube_link};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the context command.
pub async fn run_context(
    video_id: &str,
    seconds: f64,
    window: Option<f64>,
    settings: Settings,
) -> Result<()> {
    let watch_url = settings.youtube.watch_url.clone();
    let orchestrator = Orchestrator::new(settings)?;

    let chunks = orchestrator.context(video_id, seconds, window).await?;
    if chunks.is_empty() {
        Output::info(&format!(
            "No transcript found near {} in {}.",
            format_timestamp(seconds),
            video_id
        ));
        return Ok(());
    }

    Output::header(&format!("Around {} in {}", format_timestamp(seconds), video_id));
    for chunk in &chunks {
        Output::excerpt(
            &chunk.format_timestamp(),
            &chunk.text,
            &generate_youtube_link(&watch_url, video_id, chunk.timestamp),
        );
    }

    Ok(())
}
