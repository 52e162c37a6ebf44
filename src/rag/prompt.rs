//! Prompt assembly for answers and summaries.

use super::RetrievedChunk;
use crate::chunking::Chunk;
use crate::citation::format_timestamp;
use crate::config::Prompts;
use std::collections::HashMap;

/// Builds grounded prompts from transcript excerpts.
///
/// Output depends only on the inputs: the same query and chunks always
/// produce the same prompt.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    prompts: Prompts,
    max_answer_words: usize,
    max_summary_words: usize,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts, max_answer_words: usize, max_summary_words: usize) -> Self {
        Self {
            prompts,
            max_answer_words,
            max_summary_words,
        }
    }

    /// Question-answering prompt: role, numbered excerpts, question, format rules.
    pub fn build(&self, query: &str, chunks: &[RetrievedChunk]) -> String {
        let vars = self.vars(self.max_answer_words);
        let role = self.prompts.render_with_custom(&self.prompts.answer.role, &vars);
        let instructions = self
            .prompts
            .render_with_custom(&self.prompts.answer.instructions, &vars);

        format!(
            "{}\n\nTranscript excerpts:\n\n{}\n\nQuestion: {}\n\n{}",
            role.trim(),
            format_excerpts(chunks.iter().map(|r| &r.chunk)),
            query.trim(),
            instructions.trim()
        )
    }

    /// Summary prompt over excerpts already in playback order.
    pub fn build_summary(&self, chunks: &[Chunk]) -> String {
        let vars = self.vars(self.max_summary_words);
        let role = self.prompts.render_with_custom(&self.prompts.summary.role, &vars);
        let instructions = self
            .prompts
            .render_with_custom(&self.prompts.summary.instructions, &vars);

        format!(
            "{}\n\nTranscript excerpts:\n\n{}\n\n{}",
            role.trim(),
            format_excerpts(chunks.iter()),
            instructions.trim()
        )
    }

    fn vars(&self, max_words: usize) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("max_words".to_string(), max_words.to_string());
        vars
    }
}

/// `[n] (m:ss) text`, numbered from 1, one blank line apart.
fn format_excerpts<'a>(chunks: impl Iterator<Item = &'a Chunk>) -> String {
    chunks
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "[{}] ({}) {}",
                i + 1,
                format_timestamp(chunk.timestamp),
                chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
