//! Local JSON transcript files.
//!
//! Reads files in the raw `[{"text", "start", "duration"}]` format produced by
//! common transcript exporters.

use super::{Transcript, TranscriptSegment, TranscriptSource};
use crate::error::{Result, TubeQueryError};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, instrument};

fn stem_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-zA-Z0-9_-]{11})(?:[ _.]|$)").expect("stem id regex is valid")
    })
}

/// Transcript source reading JSON files from disk.
pub struct JsonFileSource;

impl JsonFileSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFileSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn can_handle(&self, input: &str) -> bool {
        let path = Path::new(input);
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Uses the leading YouTube ID of the file name when there is one
    /// (`LPZh9BOjkQs_Some Title.json`), otherwise the sanitized file stem.
    fn video_id(&self, input: &str) -> Result<String> {
        let stem = Path::new(input)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TubeQueryError::InvalidInput(format!("Invalid file path: {}", input)))?;

        if let Some(caps) = stem_id_regex().captures(stem) {
            return Ok(caps[1].to_string());
        }

        let sanitized: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();

        if sanitized.trim_matches('_').is_empty() {
            return Err(TubeQueryError::InvalidInput(format!(
                "Cannot derive a video ID from {}",
                input
            )));
        }
        Ok(sanitized)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, input: &str) -> Result<Transcript> {
        let video_id = self.video_id(input)?;
        let content = tokio::fs::read_to_string(input).await?;
        let segments: Vec<TranscriptSegment> = serde_json::from_str(&content).map_err(|e| {
            TubeQueryError::InvalidInput(format!("{} is not a transcript file: {}", input, e))
        })?;

        info!("Loaded {} segments from {}", segments.len(), input);

        Ok(Transcript::new(video_id, input.to_string(), segments))
    }
}
