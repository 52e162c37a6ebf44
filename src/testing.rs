//! Deterministic stand-ins for the network services, shared by unit tests.

use crate::completion::{Completer, Completion, CompletionRequest, TokenUsage};
use crate::embedding::Embedder;
use crate::error::{Result, Stage, TubeQueryError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds text as keyword counts over a fixed vocabulary, plus a constant
/// component so no vector is all zeros.
pub struct StubEmbedder {
    vocabulary: Vec<String>,
    model: String,
    fail: bool,
    pub calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
            model: "stub-embedding".to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut v: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect();
        v.push(0.1);
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TubeQueryError::external(Stage::Embedding, "stub failure"));
        }
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TubeQueryError::external(Stage::Embedding, "stub failure"));
        }
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len() + 1
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Returns a canned reply and remembers every prompt it was given.
pub struct StubCompleter {
    reply: String,
    fail: bool,
    pub prompts: Mutex<Vec<CompletionRequest>>,
}

impl StubCompleter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.prompts.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(TubeQueryError::external(Stage::Completion, "model overloaded"));
        }
        Ok(Completion {
            text: self.reply.clone(),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            }),
        })
    }
}

/// Store one chunk per `(text, timestamp)` pair as the collection for `video_id`.
pub async fn seed_index(
    index: &dyn crate::vector_store::VectorIndex,
    embedder: &dyn Embedder,
    video_id: &str,
    passages: &[(&str, f64)],
) -> Result<()> {
    use crate::chunking::{CharSpan, Chunk, ChunkMetadata};
    use crate::vector_store::{CollectionInfo, IndexedChunk};

    let source = format!("https://www.youtube.com/watch?v={}", video_id);
    let mut offset = 0;
    let mut items = Vec::with_capacity(passages.len());
    for (order, (text, timestamp)) in passages.iter().enumerate() {
        let chunk = Chunk {
            chunk_id: Chunk::make_id(video_id, order),
            order,
            text: text.to_string(),
            char_span: CharSpan {
                start: offset,
                end: offset + text.len(),
            },
            timestamp: *timestamp,
            metadata: ChunkMetadata {
                video_id: video_id.to_string(),
                source: source.clone(),
            },
        };
        offset += text.len() + 1;
        let embedding = embedder.embed(text).await?;
        items.push(IndexedChunk { chunk, embedding });
    }

    let info = CollectionInfo::new(
        video_id,
        &source,
        embedder.model_id(),
        embedder.dimensions(),
        items.len(),
    );
    index.replace_collection(&info, &items).await
}
