//! Remove command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the remove command.
pub async fn run_remove(video_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    if orchestrator.remove(video_id).await? {
        Output::success(&format!("Removed {} from the index.", video_id));
    } else {
        Output::warning(&format!("{} is not indexed.", video_id));
    }

    Ok(())
}
