//! Time-coded transcripts and the sources that supply them.
//!
//! A transcript is an ordered list of `{text, start, duration}` segments. The
//! [`normalize`] step flattens it into one text buffer plus a [`PositionMap`]
//! that translates byte offsets back into playback timestamps.

mod file;
mod normalize;
mod youtube;

pub use file::JsonFileSource;
pub use normalize::{normalize, NormalizedTranscript, PositionEntry, PositionMap};
pub use youtube::{extract_video_id, YoutubeSource};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single caption segment as emitted by the source transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Spoken text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A fetched transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Where the transcript came from (watch URL or file path).
    pub source: String,
    /// Caption segments in playback order.
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(video_id: String, source: String, segments: Vec<TranscriptSegment>) -> Self {
        Self {
            video_id,
            source,
            segments,
        }
    }

    /// Total duration in seconds (end of the last segment).
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Derive the video ID for an input (URL, path, bare ID).
    fn video_id(&self, input: &str) -> Result<String>;

    /// Fetch the transcript for an input.
    async fn fetch(&self, input: &str) -> Result<Transcript>;
}

/// Detect the appropriate transcript source for the given input.
pub fn detect_source(
    input: &str,
    youtube: &crate::config::YoutubeSettings,
    temp_dir: &std::path::Path,
) -> Option<Box<dyn TranscriptSource>> {
    let file = JsonFileSource::new();
    if file.can_handle(input) {
        return Some(Box::new(file));
    }

    let youtube = YoutubeSource::new(youtube, temp_dir);
    if youtube.can_handle(input) {
        return Some(Box::new(youtube));
    }

    None
}
