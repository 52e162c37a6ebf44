//! Vector index abstraction for tubequery.
//!
//! Each ingested video owns one collection of embedded chunks. Collections
//! record the embedding model that produced them so queries made with another
//! model can be refused instead of silently comparing unrelated vectors.

mod memory;
mod sqlite;

pub use memory::MemoryVectorIndex;
pub use sqlite::SqliteVectorIndex;

use crate::chunking::Chunk;
use crate::error::{Result, TubeQueryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection ID for a video.
pub fn collection_id_for(video_id: &str) -> String {
    format!("{}{}", COLLECTION_PREFIX, video_id)
}

const COLLECTION_PREFIX: &str = "video_";

/// `UnknownVideo` for a missing collection, reported by video id.
fn unknown_collection(collection_id: &str) -> TubeQueryError {
    let video_id = collection_id
        .strip_prefix(COLLECTION_PREFIX)
        .unwrap_or(collection_id);
    TubeQueryError::UnknownVideo(video_id.to_string())
}

/// Metadata about an indexed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub collection_id: String,
    pub video_id: String,
    /// Watch URL or file path the transcript came from.
    pub source: String,
    /// Model that produced every embedding in the collection.
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

impl CollectionInfo {
    pub fn new(
        video_id: &str,
        source: &str,
        embedding_model: &str,
        dimensions: usize,
        chunk_count: usize,
    ) -> Self {
        Self {
            collection_id: collection_id_for(video_id),
            video_id: video_id.to_string(),
            source: source.to_string(),
            embedding_model: embedding_model.to_string(),
            dimensions,
            chunk_count,
            created_at: Utc::now(),
        }
    }
}

/// A chunk paired with its embedding, ready to be stored.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A query hit.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub chunk: Chunk,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace a collection and all of its chunks in one step.
    ///
    /// Either every item is stored or the previous collection is left untouched.
    async fn replace_collection(&self, info: &CollectionInfo, items: &[IndexedChunk]) -> Result<()>;

    /// Insert or overwrite chunks (keyed by chunk ID) in an existing collection.
    async fn upsert(&self, collection_id: &str, items: &[IndexedChunk]) -> Result<usize>;

    /// Nearest chunks to `embedding`, ascending by distance, at most `k`.
    async fn query(&self, collection_id: &str, embedding: &[f32], k: usize) -> Result<Vec<IndexMatch>>;

    /// Every chunk of a collection in transcript order.
    async fn get_all(&self, collection_id: &str) -> Result<Vec<Chunk>>;

    async fn collection(&self, collection_id: &str) -> Result<Option<CollectionInfo>>;

    /// All collections, most recently created first.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Returns whether the collection existed.
    async fn delete_collection(&self, collection_id: &str) -> Result<bool>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, `1 - cosine_similarity`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Check every embedding against the collection before anything is written.
fn validate_items(info: &CollectionInfo, items: &[IndexedChunk]) -> Result<()> {
    for item in items {
        if item.embedding.len() != info.dimensions {
            return Err(TubeQueryError::DataIntegrity(format!(
                "chunk {} has {} dimensions, collection {} expects {}",
                item.chunk.chunk_id,
                item.embedding.len(),
                info.collection_id,
                info.dimensions
            )));
        }
    }
    Ok(())
}

fn validate_query(info: &CollectionInfo, embedding: &[f32]) -> Result<()> {
    if embedding.len() != info.dimensions {
        return Err(TubeQueryError::DataIntegrity(format!(
            "query embedding has {} dimensions, collection {} expects {}",
            embedding.len(),
            info.collection_id,
            info.dimensions
        )));
    }
    Ok(())
}

/// Rank scored chunks by ascending distance, ties broken by transcript order.
fn rank(mut matches: Vec<IndexMatch>, k: usize) -> Vec<IndexMatch> {
    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.order.cmp(&b.chunk.order))
    });
    matches.truncate(k);
    matches
}
