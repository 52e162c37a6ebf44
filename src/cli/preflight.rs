//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::error::{Result, TubeQueryError};
use crate::transcript::{JsonFileSource, TranscriptSource};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingesting needs the API key, plus yt-dlp unless the input is a local file.
    Ingest { input: &'a str },
    /// Asking and summarizing need the API key.
    Query,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>) -> Result<()> {
    match operation {
        Operation::Ingest { input } => {
            check_api_key()?;
            if !JsonFileSource::new().can_handle(input) {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Query => {
            check_api_key()?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TubeQueryError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(TubeQueryError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubeQueryError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubeQueryError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubeQueryError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
