//! YouTube caption source.
//!
//! Captions are fetched with yt-dlp in the json3 subtitle format and converted
//! into transcript segments.

use super::{Transcript, TranscriptSegment, TranscriptSource};
use crate::citation::watch_url;
use crate::config::YoutubeSettings;
use crate::error::{Result, Stage, TubeQueryError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats and bare video IDs
        Regex::new(
            r"(?x)
            ^(?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:
                    youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/)
                    |
                    youtu\.be/
                )
                ([a-zA-Z0-9_-]{11})
                (?:[^a-zA-Z0-9_-]|$)
                |
                ([a-zA-Z0-9_-]{11})$
            )
        ",
        )
        .expect("video id regex is valid")
    })
}

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// YouTube transcript source backed by yt-dlp.
pub struct YoutubeSource {
    watch_url: String,
    languages: String,
    temp_dir: PathBuf,
}

impl YoutubeSource {
    pub fn new(settings: &YoutubeSettings, temp_dir: &Path) -> Self {
        Self {
            watch_url: settings.watch_url.clone(),
            languages: settings.subtitle_languages.clone(),
            temp_dir: temp_dir.to_path_buf(),
        }
    }

    /// Download captions into `dir` and return the path of the json3 file.
    async fn download_captions(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let template = dir.join("%(id)s.%(ext)s");

        let output = tokio::process::Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .args(["--sub-langs", &self.languages])
            .args(["--sub-format", "json3"])
            .arg("--no-warnings")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubeQueryError::ToolNotFound("yt-dlp".to_string())
                } else {
                    TubeQueryError::external(Stage::Transcript, format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubeQueryError::external(
                Stage::Transcript,
                format!("yt-dlp failed for {}: {}", url, stderr.trim()),
            ));
        }

        find_caption_file(dir).await?.ok_or_else(|| {
            TubeQueryError::external(
                Stage::Transcript,
                format!("No captions available for {} in languages '{}'", url, self.languages),
            )
        })
    }
}

/// First json3 file in `dir` by name, so language picks are stable.
async fn find_caption_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json3") {
            candidates.push(path);
        }
    }
    candidates.sort();

    debug!("Caption files: {:?}", candidates);

    Ok(candidates.into_iter().next())
}

#[async_trait]
impl TranscriptSource for YoutubeSource {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn can_handle(&self, input: &str) -> bool {
        extract_video_id(input).is_some()
    }

    fn video_id(&self, input: &str) -> Result<String> {
        extract_video_id(input).ok_or_else(|| {
            TubeQueryError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })
    }

    #[instrument(skip(self))]
    async fn fetch(&self, input: &str) -> Result<Transcript> {
        let video_id = self.video_id(input)?;
        let url = watch_url(&self.watch_url, &video_id);

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let dir = tempfile::Builder::new()
            .prefix("captions-")
            .tempdir_in(&self.temp_dir)?;

        let path = self.download_captions(&url, dir.path()).await?;
        let content = tokio::fs::read_to_string(&path).await?;
        let segments = parse_json3(&content)?;

        info!("Fetched {} caption segments for {}", segments.len(), video_id);

        Ok(Transcript::new(video_id, url, segments))
    }
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Convert yt-dlp json3 captions into segments.
///
/// Events without text or without duration (line-break markers) are dropped.
fn parse_json3(content: &str) -> Result<Vec<TranscriptSegment>> {
    let captions: Json3Captions = serde_json::from_str(content).map_err(|e| {
        TubeQueryError::external(Stage::Transcript, format!("Malformed json3 captions: {}", e))
    })?;

    let segments = captions
        .events
        .into_iter()
        .filter(|event| event.d_duration_ms > 0)
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text,
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(segments)
}
