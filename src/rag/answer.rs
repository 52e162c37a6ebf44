//! Grounded question answering with excerpt citations.

use super::{PromptBuilder, Retriever};
use crate::completion::{Completer, CompletionRequest, TokenUsage};
use crate::config::GenerationSettings;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Returned without calling the model when retrieval finds nothing.
pub const NO_RELEVANT_INFORMATION: &str =
    "I couldn't find any relevant information in the video transcript to answer your question.";

/// An excerpt the answer was grounded on. `rank` matches the `[n]` citation.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub rank: usize,
    pub chunk_id: String,
    pub text: String,
    pub timestamp: f64,
    pub similarity: f32,
}

/// The outcome of a question.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub query: String,
    pub video_id: String,
    pub model_id: String,
    /// Sources in prompt order.
    pub sources: Vec<Source>,
    pub token_usage: Option<TokenUsage>,
    /// Set when the model call failed; sources are still populated.
    pub synthesis_error: Option<String>,
}

/// Answers questions about one video from its retrieved excerpts.
pub struct AnswerSynthesizer {
    retriever: Arc<Retriever>,
    completer: Arc<dyn Completer>,
    prompt_builder: PromptBuilder,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    max_snippets: usize,
}

impl AnswerSynthesizer {
    pub fn new(
        retriever: Arc<Retriever>,
        completer: Arc<dyn Completer>,
        prompt_builder: PromptBuilder,
        generation: &GenerationSettings,
        max_snippets: usize,
    ) -> Self {
        Self {
            retriever,
            completer,
            prompt_builder,
            model: generation.model.clone(),
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
            max_snippets: max_snippets.max(1),
        }
    }

    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn answer(&self, video_id: &str, query: &str, k: usize) -> Result<AnswerResult> {
        let mut chunks = self.retriever.retrieve(video_id, query, k).await?;

        let mut result = AnswerResult {
            answer_text: String::new(),
            query: query.to_string(),
            video_id: video_id.to_string(),
            model_id: self.model.clone(),
            sources: Vec::new(),
            token_usage: None,
            synthesis_error: None,
        };

        if chunks.is_empty() {
            result.answer_text = NO_RELEVANT_INFORMATION.to_string();
            return Ok(result);
        }

        chunks.truncate(self.max_snippets);
        let prompt = self.prompt_builder.build(query, &chunks);

        result.sources = chunks
            .into_iter()
            .enumerate()
            .map(|(i, r)| Source {
                rank: i + 1,
                chunk_id: r.chunk.chunk_id,
                text: r.chunk.text,
                timestamp: r.chunk.timestamp,
                similarity: r.similarity,
            })
            .collect();

        let request = CompletionRequest {
            prompt,
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        match self.completer.complete(&request).await {
            Ok(completion) => {
                info!("Generated answer from {} sources", result.sources.len());
                result.answer_text = completion.text;
                result.token_usage = completion.usage;
            }
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                result.answer_text = format!(
                    "Could not generate an answer ({}). The most relevant excerpts are listed below.",
                    e
                );
                result.synthesis_error = Some(e.to_string());
            }
        }

        Ok(result)
    }
}
