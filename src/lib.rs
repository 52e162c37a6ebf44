//! tubequery - question answering over YouTube transcripts
//!
//! Fetches a video's captions, splits them into overlapping timestamped
//! chunks, embeds them into a per-video vector index, and answers questions
//! with a language model grounded in the retrieved excerpts. Every answer
//! cites its excerpts by number and each citation links back to the moment
//! in the video it came from.
//!
//! # Architecture
//!
//! - `transcript` - Transcript sources (YouTube captions, JSON files) and normalization
//! - `chunking` - Sliding-window chunking with character spans and timestamps
//! - `embedding` - Embedding generation
//! - `completion` - Text generation
//! - `vector_store` - Per-video vector collections
//! - `rag` - Retrieval, prompt building, answers and summaries
//! - `citation` - Timestamp formatting and deep links
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use tubequery::config::Settings;
//! use tubequery::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     orchestrator.ingest("https://www.youtube.com/watch?v=dQw4w9WgXcQ", false).await?;
//!     let answer = orchestrator
//!         .ask("dQw4w9WgXcQ", "What is the song about?", None)
//!         .await?;
//!     println!("{}", answer.answer_text);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod citation;
pub mod cli;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, TubeQueryError};
