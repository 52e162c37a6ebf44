//! In-memory vector index implementation.
//!
//! Useful for testing and one-off sessions.

use super::{
    cosine_distance, rank, unknown_collection, validate_items, validate_query, CollectionInfo,
    IndexMatch, IndexedChunk, VectorIndex,
};
use crate::chunking::Chunk;
use crate::error::{Result, Stage, TubeQueryError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Collection {
    info: CollectionInfo,
    /// Keyed by chunk ID, which sorts in transcript order.
    items: BTreeMap<String, IndexedChunk>,
}

/// In-memory vector index.
pub struct MemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryVectorIndex {
    /// Create a new in-memory vector index.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.collections.read().map_err(|e| {
            TubeQueryError::external(Stage::VectorIndex, format!("Failed to acquire lock: {}", e))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.collections.write().map_err(|e| {
            TubeQueryError::external(Stage::VectorIndex, format!("Failed to acquire lock: {}", e))
        })
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn replace_collection(&self, info: &CollectionInfo, items: &[IndexedChunk]) -> Result<()> {
        validate_items(info, items)?;

        let collection = Collection {
            info: CollectionInfo {
                chunk_count: items.len(),
                ..info.clone()
            },
            items: items
                .iter()
                .map(|item| (item.chunk.chunk_id.clone(), item.clone()))
                .collect(),
        };

        self.write()?.insert(info.collection_id.clone(), collection);
        Ok(())
    }

    async fn upsert(&self, collection_id: &str, items: &[IndexedChunk]) -> Result<usize> {
        let mut collections = self.write()?;
        let collection = collections
            .get_mut(collection_id)
            .ok_or_else(|| unknown_collection(collection_id))?;

        validate_items(&collection.info, items)?;

        for item in items {
            collection
                .items
                .insert(item.chunk.chunk_id.clone(), item.clone());
        }
        collection.info.chunk_count = collection.items.len();
        Ok(items.len())
    }

    async fn query(&self, collection_id: &str, embedding: &[f32], k: usize) -> Result<Vec<IndexMatch>> {
        let collections = self.read()?;
        let Some(collection) = collections.get(collection_id) else {
            return Err(unknown_collection(collection_id));
        };
        validate_query(&collection.info, embedding)?;

        let matches = collection
            .items
            .values()
            .map(|item| IndexMatch {
                chunk: item.chunk.clone(),
                distance: cosine_distance(embedding, &item.embedding),
            })
            .collect();

        Ok(rank(matches, k))
    }

    async fn get_all(&self, collection_id: &str) -> Result<Vec<Chunk>> {
        let collections = self.read()?;
        let Some(collection) = collections.get(collection_id) else {
            return Err(unknown_collection(collection_id));
        };

        let mut chunks: Vec<Chunk> = collection.items.values().map(|i| i.chunk.clone()).collect();
        chunks.sort_by_key(|c| c.order);
        Ok(chunks)
    }

    async fn collection(&self, collection_id: &str) -> Result<Option<CollectionInfo>> {
        Ok(self.read()?.get(collection_id).map(|c| c.info.clone()))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut infos: Vec<CollectionInfo> = self.read()?.values().map(|c| c.info.clone()).collect();
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    async fn delete_collection(&self, collection_id: &str) -> Result<bool> {
        Ok(self.write()?.remove(collection_id).is_some())
    }
}
