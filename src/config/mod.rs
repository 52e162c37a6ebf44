//! Configuration module for tubequery.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts, SummaryPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, PromptSettings,
    RetrievalSettings, Settings, VectorStoreSettings, YoutubeSettings,
};
