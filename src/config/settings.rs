//! Configuration settings for tubequery.

use crate::error::{Result, TubeQueryError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (downloaded captions).
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tubequery".to_string(),
            temp_dir: "/tmp/tubequery".to_string(),
        }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Watch URL used to build deep links; the video id is appended as `?v=<id>`.
    pub watch_url: String,
    /// Subtitle languages passed to yt-dlp (`--sub-langs`).
    pub subtitle_languages: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            watch_url: "https://www.youtube.com/watch".to_string(),
            subtitle_languages: "en.*".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use. Stored with every collection.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Window size in whitespace-delimited tokens.
    pub chunk_size: usize,
    /// Tokens shared between consecutive windows.
    pub overlap: usize,
    /// Prefer ending chunks at a sentence terminator.
    pub sentence_boundaries: bool,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 750,
            overlap: 150,
            sentence_boundaries: true,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.tubequery/index.db".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Default number of chunks retrieved for a question.
    pub top_k: usize,
    /// Number of chunks sampled for a whole-video summary.
    pub summary_k: usize,
    /// Upper bound on excerpts placed in a single prompt.
    pub max_snippets_in_prompt: usize,
    /// Default half-width of the `context` window, in seconds.
    pub window_seconds: f64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            summary_k: 15,
            max_snippets_in_prompt: 8,
            window_seconds: 30.0,
        }
    }
}

/// Completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Completion provider (openai).
    pub provider: String,
    /// LLM model for answers and summaries.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token cap for answers.
    pub max_output_tokens: u32,
    /// Output token cap for summaries.
    pub summary_max_output_tokens: u32,
    /// Word cap stated in the answer instructions.
    pub max_answer_words: usize,
    /// Word cap stated in the summary instructions.
    pub max_summary_words: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_output_tokens: 1000,
            summary_max_output_tokens: 800,
            max_answer_words: 250,
            max_summary_words: 300,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check required fields and value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(TubeQueryError::Config(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(TubeQueryError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 || self.retrieval.summary_k == 0 {
            return Err(TubeQueryError::Config(
                "retrieval.top_k and retrieval.summary_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.summary_k < self.retrieval.top_k {
            return Err(TubeQueryError::Config(format!(
                "retrieval.summary_k ({}) must not be smaller than retrieval.top_k ({})",
                self.retrieval.summary_k, self.retrieval.top_k
            )));
        }
        if self.retrieval.max_snippets_in_prompt == 0 {
            return Err(TubeQueryError::Config(
                "retrieval.max_snippets_in_prompt must be at least 1".to_string(),
            ));
        }
        if !self.retrieval.window_seconds.is_finite() || self.retrieval.window_seconds < 0.0 {
            return Err(TubeQueryError::Config(
                "retrieval.window_seconds must be a non-negative number".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(TubeQueryError::Config(
                "generation.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.generation.max_output_tokens == 0 || self.generation.summary_max_output_tokens == 0
        {
            return Err(TubeQueryError::Config(
                "generation output token limits must be greater than zero".to_string(),
            ));
        }
        if self.embedding.model.trim().is_empty() || self.generation.model.trim().is_empty() {
            return Err(TubeQueryError::Config(
                "embedding.model and generation.model are required".to_string(),
            ));
        }
        for (key, provider) in [
            ("embedding.provider", &self.embedding.provider),
            ("generation.provider", &self.generation.provider),
        ] {
            if provider != "openai" {
                return Err(TubeQueryError::Config(format!(
                    "Unknown {}: {}",
                    key, provider
                )));
            }
        }
        if !matches!(self.vector_store.provider.as_str(), "sqlite" | "memory") {
            return Err(TubeQueryError::Config(format!(
                "Unknown vector_store.provider: {}",
                self.vector_store.provider
            )));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TubeQueryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubequery")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}
