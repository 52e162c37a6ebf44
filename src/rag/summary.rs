//! Whole-video summaries.

use super::{PromptBuilder, Retriever};
use crate::chunking::Chunk;
use crate::completion::{Completer, CompletionRequest, TokenUsage};
use crate::config::GenerationSettings;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Query used to pick the excerpts a summary is built from.
pub const SUMMARY_SEED_QUERY: &str = "main topics discussed";

/// Returned without calling the model when the video has no indexed content.
pub const NOTHING_TO_SUMMARIZE: &str =
    "There is nothing to summarize: no transcript content is indexed for this video.";

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub summary_text: String,
    pub model_id: String,
    pub chunks_used: usize,
    pub token_usage: Option<TokenUsage>,
}

/// Summarizes a video from a broad sample of its chunks.
pub struct SummarySynthesizer {
    retriever: Arc<Retriever>,
    completer: Arc<dyn Completer>,
    prompt_builder: PromptBuilder,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    summary_k: usize,
}

impl SummarySynthesizer {
    pub fn new(
        retriever: Arc<Retriever>,
        completer: Arc<dyn Completer>,
        prompt_builder: PromptBuilder,
        generation: &GenerationSettings,
        summary_k: usize,
    ) -> Self {
        Self {
            retriever,
            completer,
            prompt_builder,
            model: generation.model.clone(),
            temperature: generation.temperature,
            max_output_tokens: generation.summary_max_output_tokens,
            summary_k,
        }
    }

    #[instrument(skip(self))]
    pub async fn summarize(&self, video_id: &str) -> Result<SummaryResult> {
        let retrieved = self
            .retriever
            .retrieve(video_id, SUMMARY_SEED_QUERY, self.summary_k)
            .await?;

        if retrieved.is_empty() {
            return Ok(SummaryResult {
                summary_text: NOTHING_TO_SUMMARIZE.to_string(),
                model_id: self.model.clone(),
                chunks_used: 0,
                token_usage: None,
            });
        }

        let mut chunks: Vec<Chunk> = retrieved.into_iter().map(|r| r.chunk).collect();
        chunks.sort_by_key(|c| c.order);

        let request = CompletionRequest {
            prompt: self.prompt_builder.build_summary(&chunks),
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };
        let completion = self.completer.complete(&request).await?;

        info!("Summarized {} from {} chunks", video_id, chunks.len());

        Ok(SummaryResult {
            summary_text: completion.text,
            model_id: self.model.clone(),
            chunks_used: chunks.len(),
            token_usage: completion.usage,
        })
    }
}
