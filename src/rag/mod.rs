//! RAG (Retrieval-Augmented Generation) over indexed video transcripts.
//!
//! Answers and summaries are grounded in retrieved excerpts, and every answer
//! carries the sources it was built from.

mod answer;
mod prompt;
mod retriever;
mod summary;

pub use answer::{AnswerResult, AnswerSynthesizer, Source, NO_RELEVANT_INFORMATION};
pub use prompt::PromptBuilder;
pub use retriever::{RetrievedChunk, Retriever};
pub use summary::{SummaryResult, SummarySynthesizer, NOTHING_TO_SUMMARIZE, SUMMARY_SEED_QUERY};
