//! Pipeline orchestrator for tubequery.
//!
//! Wires the configured services together and runs each user-facing flow:
//! ingesting a transcript, answering questions, summarizing, looking up the
//! transcript around a moment, and managing indexed videos.

use crate::chunking::{chunk, Chunk, ChunkMetadata, ChunkingConfig};
use crate::completion::{Completer, OpenAICompleter};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, Stage, TubeQueryError};
use crate::rag::{
    AnswerResult, AnswerSynthesizer, PromptBuilder, Retriever, SummaryResult, SummarySynthesizer,
};
use crate::transcript::{detect_source, normalize};
use crate::vector_store::{
    collection_id_for, CollectionInfo, IndexedChunk, MemoryVectorIndex, SqliteVectorIndex,
    VectorIndex,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The main orchestrator for the tubequery pipeline.
pub struct Orchestrator {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    retriever: Arc<Retriever>,
    answerer: AnswerSynthesizer,
    summarizer: SummarySynthesizer,
    chunking: ChunkingConfig,
}

impl Orchestrator {
    /// Create an orchestrator from configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = match settings.embedding.provider.as_str() {
            "openai" => Arc::new(OpenAIEmbedder::with_config(
                &settings.embedding.model,
                settings.embedding.dimensions as usize,
            )?),
            other => {
                return Err(TubeQueryError::Config(format!(
                    "Unknown embedding provider: {}",
                    other
                )))
            }
        };

        let completer: Arc<dyn Completer> = match settings.generation.provider.as_str() {
            "openai" => Arc::new(OpenAICompleter::new()?),
            other => {
                return Err(TubeQueryError::Config(format!(
                    "Unknown generation provider: {}",
                    other
                )))
            }
        };

        let index: Arc<dyn VectorIndex> = match settings.vector_store.provider.as_str() {
            "sqlite" => Arc::new(SqliteVectorIndex::new(&settings.sqlite_path())?),
            "memory" => Arc::new(MemoryVectorIndex::new()),
            other => {
                return Err(TubeQueryError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        Self::with_components(settings, prompts, embedder, completer, index)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        let chunking = ChunkingConfig::try_from(&settings.chunking)?;
        let retriever = Arc::new(Retriever::new(index.clone(), embedder.clone()));
        let prompt_builder = PromptBuilder::new(
            prompts,
            settings.generation.max_answer_words,
            settings.generation.max_summary_words,
        );

        let answerer = AnswerSynthesizer::new(
            retriever.clone(),
            completer.clone(),
            prompt_builder.clone(),
            &settings.generation,
            settings.retrieval.max_snippets_in_prompt,
        );
        let summarizer = SummarySynthesizer::new(
            retriever.clone(),
            completer,
            prompt_builder,
            &settings.generation,
            settings.retrieval.summary_k,
        );

        Ok(Self {
            settings,
            embedder,
            index,
            retriever,
            answerer,
            summarizer,
            chunking,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch, chunk, embed, and index a video's transcript.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn ingest(&self, input: &str, force: bool) -> Result<IngestResult> {
        let source = detect_source(input, &self.settings.youtube, &self.settings.temp_dir())
            .ok_or_else(|| {
                TubeQueryError::InvalidInput(format!(
                    "Not a YouTube URL, video ID, or JSON transcript file: {}",
                    input
                ))
            })?;
        let video_id = source.video_id(input)?;
        let collection_id = collection_id_for(&video_id);

        // Check if already indexed
        if let Some(existing) = self.index.collection(&collection_id).await? {
            if !force && existing.embedding_model == self.embedder.model_id() {
                info!("Video {} is already indexed, skipping", video_id);
                return Ok(IngestResult {
                    video_id,
                    source: existing.source,
                    chunks_indexed: existing.chunk_count,
                    duration_seconds: None,
                    skipped: true,
                });
            }
            if existing.embedding_model != self.embedder.model_id() {
                warn!(
                    "Re-indexing {}: stored with '{}', now using '{}'",
                    video_id,
                    existing.embedding_model,
                    self.embedder.model_id()
                );
            }
        }

        info!("Fetching transcript for {} via {}", video_id, source.name());
        let transcript = source.fetch(input).await?;
        if transcript.segments.is_empty() {
            return Err(TubeQueryError::EmptyTranscript(video_id));
        }

        let normalized = normalize(&transcript.segments)?;
        if normalized.buffer.trim().is_empty() {
            return Err(TubeQueryError::EmptyTranscript(video_id));
        }
        debug!(
            "Normalized {} segments into {} bytes",
            transcript.segments.len(),
            normalized.buffer.len()
        );

        let metadata = ChunkMetadata {
            video_id: video_id.clone(),
            source: transcript.source.clone(),
        };
        let chunks = chunk(
            &normalized.buffer,
            &normalized.position_map,
            &self.chunking,
            &metadata,
        )?;
        info!("Created {} chunks", chunks.len());

        // Generate embeddings in batch
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(TubeQueryError::external(
                Stage::Embedding,
                format!(
                    "Expected {} embeddings, received {}",
                    chunks.len(),
                    embeddings.len()
                ),
            ));
        }

        let items: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        let info = CollectionInfo::new(
            &video_id,
            &transcript.source,
            self.embedder.model_id(),
            self.embedder.dimensions(),
            items.len(),
        );
        self.index.replace_collection(&info, &items).await?;

        info!("Indexed {} chunks for {}", items.len(), video_id);

        Ok(IngestResult {
            video_id,
            source: transcript.source.clone(),
            chunks_indexed: items.len(),
            duration_seconds: Some(transcript.duration_seconds()),
            skipped: false,
        })
    }

    /// Answer a question about an indexed video. `k` defaults to `retrieval.top_k`.
    pub async fn ask(&self, video_id: &str, question: &str, k: Option<usize>) -> Result<AnswerResult> {
        let k = k.unwrap_or(self.settings.retrieval.top_k);
        self.answerer.answer(video_id, question, k).await
    }

    pub async fn summarize(&self, video_id: &str) -> Result<SummaryResult> {
        self.summarizer.summarize(video_id).await
    }

    /// Transcript chunks around `timestamp`, in playback order.
    pub async fn context(&self, video_id: &str, timestamp: f64, window: Option<f64>) -> Result<Vec<Chunk>> {
        let window = window.unwrap_or(self.settings.retrieval.window_seconds);
        self.retriever.retrieve_window(video_id, timestamp, window).await
    }

    /// All indexed videos, most recent first.
    pub async fn list(&self) -> Result<Vec<CollectionInfo>> {
        self.index.list_collections().await
    }

    /// Delete a video's collection. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn remove(&self, video_id: &str) -> Result<bool> {
        self.index.delete_collection(&collection_id_for(video_id)).await
    }
}

/// Result of ingesting a video.
#[derive(Debug)]
pub struct IngestResult {
    pub video_id: String,
    /// Watch URL or file path the transcript came from.
    pub source: String,
    pub chunks_indexed: usize,
    /// Transcript length, when it was fetched.
    pub duration_seconds: Option<f64>,
    /// Whether processing was skipped (already indexed).
    pub skipped: bool,
}
