//! Transcript chunking for embedding and retrieval.
//!
//! Chunks are overlapping windows of whitespace-delimited tokens over a
//! normalized transcript. Each chunk keeps the byte span it was cut from and
//! the timestamp of the caption segment it starts in.

mod window;

pub use window::chunk;

use crate::config::ChunkingSettings;
use crate::error::{Result, TubeQueryError};
use serde::{Deserialize, Serialize};

/// Half-open byte range into the normalized transcript buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub video_id: String,
    /// Watch URL or file path of the transcript.
    pub source: String,
}

/// A window of transcript text, the unit stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable ID, `<video_id>:<order>`.
    pub chunk_id: String,
    /// Position of this chunk in the video.
    pub order: usize,
    /// Exactly `buffer[char_span]`.
    pub text: String,
    pub char_span: CharSpan,
    /// Playback offset in seconds where this chunk begins.
    pub timestamp: f64,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Deterministic chunk ID, so re-ingestion overwrites instead of duplicating.
    pub fn make_id(video_id: &str, order: usize) -> String {
        format!("{}:{:04}", video_id, order)
    }

    /// Format timestamp for display.
    pub fn format_timestamp(&self) -> String {
        crate::citation::format_timestamp(self.timestamp)
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Window size in tokens.
    pub chunk_size: usize,
    /// Tokens shared by consecutive windows.
    pub overlap: usize,
    /// End windows at a sentence terminator in their trailing half when possible.
    pub sentence_boundaries: bool,
}

impl ChunkingConfig {
    /// Create a validated config with sentence boundaries disabled.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap,
            sentence_boundaries: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_sentence_boundaries(mut self, enabled: bool) -> Self {
        self.sentence_boundaries = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(TubeQueryError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(TubeQueryError::InvalidChunkConfig(format!(
                "overlap ({}) must be smaller than chunk_size ({}) or the window cannot advance",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Nominal number of tokens the window advances by.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl TryFrom<&ChunkingSettings> for ChunkingConfig {
    type Error = TubeQueryError;

    fn try_from(settings: &ChunkingSettings) -> Result<Self> {
        Ok(ChunkingConfig::new(settings.chunk_size, settings.overlap)?
            .with_sentence_boundaries(settings.sentence_boundaries))
    }
}
