//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let videos = orchestrator.list().await?;
    if videos.is_empty() {
        Output::info("No videos indexed yet. Use 'tubequery ingest <url>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Indexed Videos ({})", videos.len()));
    println!();

    for video in &videos {
        Output::video_info(
            &video.video_id,
            &video.source,
            video.chunk_count,
            &video.embedding_model,
            &video.created_at.format("%Y-%m-%d %H:%M").to_string(),
        );
    }

    let total_chunks: usize = videos.iter().map(|v| v.chunk_count).sum();
    println!();
    Output::kv("Total videos", &videos.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());

    Ok(())
}
