//! Similarity and time-window lookups over an indexed video.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, TubeQueryError};
use crate::vector_store::{collection_id_for, CollectionInfo, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A chunk returned by similarity search.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Cosine distance to the query.
    pub distance: f32,
    /// `1 - distance`.
    pub similarity: f32,
}

impl RetrievedChunk {
    fn new(chunk: Chunk, distance: f32) -> Self {
        Self {
            chunk,
            distance,
            similarity: 1.0 - distance,
        }
    }
}

/// Finds the chunks of a video relevant to a query.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// The `k` chunks closest to `query`, ascending by distance.
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, video_id: &str, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 {
            return Err(TubeQueryError::InvalidInput(
                "k must be at least 1".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(TubeQueryError::InvalidInput("query is empty".to_string()));
        }

        let info = self.collection(video_id).await?;
        if info.embedding_model != self.embedder.model_id() {
            return Err(TubeQueryError::IncompatibleIndex {
                collection: info.collection_id,
                stored: info.embedding_model,
                requested: self.embedder.model_id().to_string(),
            });
        }

        let embedding = self.embedder.embed(query).await?;
        let matches = self.index.query(&info.collection_id, &embedding, k).await?;

        debug!("Retrieved {} chunks for {}", matches.len(), video_id);

        Ok(matches
            .into_iter()
            .map(|m| RetrievedChunk::new(m.chunk, m.distance))
            .collect())
    }

    /// Every chunk starting within `window_seconds` of `timestamp`, in playback order.
    #[instrument(skip(self))]
    pub async fn retrieve_window(
        &self,
        video_id: &str,
        timestamp: f64,
        window_seconds: f64,
    ) -> Result<Vec<Chunk>> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(TubeQueryError::InvalidInput(format!(
                "timestamp must be a non-negative number of seconds, got {}",
                timestamp
            )));
        }
        if !window_seconds.is_finite() || window_seconds < 0.0 {
            return Err(TubeQueryError::InvalidInput(format!(
                "window must be a non-negative number of seconds, got {}",
                window_seconds
            )));
        }

        let info = self.collection(video_id).await?;
        let low = (timestamp - window_seconds).max(0.0);
        let high = timestamp + window_seconds;

        let mut chunks: Vec<Chunk> = self
            .index
            .get_all(&info.collection_id)
            .await?
            .into_iter()
            .filter(|c| c.timestamp >= low && c.timestamp <= high)
            .collect();
        chunks.sort_by(|a, b| {
            a.timestamp
                .partial_cmp(&b.timestamp)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.order.cmp(&b.order))
        });

        Ok(chunks)
    }

    async fn collection(&self, video_id: &str) -> Result<CollectionInfo> {
        self.index
            .collection(&collection_id_for(video_id))
            .await?
            .ok_or_else(|| TubeQueryError::UnknownVideo(video_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Stage};
    use crate::testing::{seed_index, StubEmbedder};
    use crate::vector_store::MemoryVectorIndex;

    const VOCAB: &[&str] = &["rust", "ownership", "borrow", "async", "cargo"];

    async fn setup() -> (Arc<MemoryVectorIndex>, Arc<StubEmbedder>) {
        let index = Arc::new(MemoryVectorIndex::new());
        let embedder = Arc::new(StubEmbedder::new(VOCAB));
        seed_index(
            index.as_ref(),
            embedder.as_ref(),
            "vid",
            &[
                ("Welcome to this rust tutorial.", 0.0),
                ("Ownership means every value has one owner.", 35.0),
                ("You can borrow a value without taking ownership.", 70.0),
                ("Async code runs on an executor.", 120.0),
                ("Cargo builds the project.", 180.0),
            ],
        )
        .await
        .unwrap();
        (index, embedder)
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_distance() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder);

        let results = retriever.retrieve("vid", "what is ownership", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.chunk_id, "vid:0001");
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        for r in &results {
            assert!((r.similarity - (1.0 - r.distance)).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_retrieve_fewer_than_k() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder);

        let results = retriever.retrieve("vid", "cargo", 50).await.unwrap();
        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_retrieve_validates_input() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder.clone());
        let before = embedder.call_count();

        assert!(matches!(
            retriever.retrieve("vid", "rust", 0).await,
            Err(TubeQueryError::InvalidInput(_))
        ));
        assert!(matches!(
            retriever.retrieve("vid", "   ", 3).await,
            Err(TubeQueryError::InvalidInput(_))
        ));
        assert_eq!(embedder.call_count(), before);
    }

    #[tokio::test]
    async fn test_retrieve_unknown_video() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder);

        let err = retriever.retrieve("missing", "rust", 3).await.unwrap_err();
        assert!(matches!(err, TubeQueryError::UnknownVideo(ref id) if id == "missing"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_retrieve_detects_model_change() {
        let (index, _) = setup().await;
        let other = Arc::new(StubEmbedder::new(VOCAB).with_model("stub-embedding-v2"));
        let retriever = Retriever::new(index, other.clone());

        let err = retriever.retrieve("vid", "rust", 3).await.unwrap_err();
        assert!(matches!(err, TubeQueryError::IncompatibleIndex { .. }));
        assert_eq!(other.call_count(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_reports_stage() {
        let (index, _) = setup().await;
        let retriever = Retriever::new(index, Arc::new(StubEmbedder::new(VOCAB).failing()));

        let err = retriever.retrieve("vid", "rust", 3).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Embedding));
    }

    #[tokio::test]
    async fn test_retrieve_window_is_chronological() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder);

        let chunks = retriever.retrieve_window("vid", 60.0, 30.0).await.unwrap();
        let timestamps: Vec<f64> = chunks.iter().map(|c| c.timestamp).collect();
        assert_eq!(timestamps, vec![35.0, 70.0]);

        // Lower bound clamps at zero.
        let chunks = retriever.retrieve_window("vid", 10.0, 40.0).await.unwrap();
        let timestamps: Vec<f64> = chunks.iter().map(|c| c.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 35.0]);

        let chunks = retriever.retrieve_window("vid", 1000.0, 5.0).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_window_validates_input() {
        let (index, embedder) = setup().await;
        let retriever = Retriever::new(index, embedder);

        assert!(matches!(
            retriever.retrieve_window("vid", -1.0, 30.0).await,
            Err(TubeQueryError::InvalidInput(_))
        ));
        assert!(matches!(
            retriever.retrieve_window("vid", f64::NAN, 30.0).await,
            Err(TubeQueryError::InvalidInput(_))
        ));
        assert!(matches!(
            retriever.retrieve_window("vid", 10.0, -5.0).await,
            Err(TubeQueryError::InvalidInput(_))
        ));
        assert!(matches!(
            retriever.retrieve_window("missing", 10.0, 5.0).await,
            Err(TubeQueryError::UnknownVideo(_))
        ));
    }
}
