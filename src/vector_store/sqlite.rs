//! SQLite-based vector index implementation.
//!
//! Uses SQLite with cosine distance computed in Rust. One transcript holds at
//! most a few hundred chunks, so a full scan per collection is cheap.

use super::{
    cosine_distance, rank, unknown_collection, validate_items, validate_query, CollectionInfo,
    IndexMatch, IndexedChunk, VectorIndex,
};
use crate::chunking::{CharSpan, Chunk, ChunkMetadata};
use crate::error::{Result, Stage, TubeQueryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        collection_id TEXT PRIMARY KEY,
        video_id TEXT NOT NULL,
        source TEXT NOT NULL,
        embedding_model TEXT NOT NULL,
        dimensions INTEGER NOT NULL,
        chunk_count INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        collection_id TEXT NOT NULL,
        chunk_id TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        text TEXT NOT NULL,
        char_start INTEGER NOT NULL,
        char_end INTEGER NOT NULL,
        timestamp REAL NOT NULL,
        video_id TEXT NOT NULL,
        source TEXT NOT NULL,
        embedding BLOB NOT NULL,
        PRIMARY KEY (collection_id, chunk_id)
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection_id, chunk_order);
"#;

const CHUNK_COLUMNS: &str =
    "chunk_id, chunk_order, text, char_start, char_end, timestamp, video_id, source, embedding";

/// SQLite-based vector index.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl SqliteVectorIndex {
    /// Open (or create) an index database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite index (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            TubeQueryError::external(Stage::VectorIndex, format!("Failed to acquire lock: {}", e))
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_info(row: &Row<'_>) -> rusqlite::Result<CollectionInfo> {
        let created_at: String = row.get(6)?;
        let dimensions: i64 = row.get(4)?;
        let chunk_count: i64 = row.get(5)?;

        Ok(CollectionInfo {
            collection_id: row.get(0)?,
            video_id: row.get(1)?,
            source: row.get(2)?,
            embedding_model: row.get(3)?,
            dimensions: dimensions as usize,
            chunk_count: chunk_count as usize,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        })
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<IndexedChunk> {
        let order: i64 = row.get(1)?;
        let char_start: i64 = row.get(3)?;
        let char_end: i64 = row.get(4)?;
        let embedding_bytes: Vec<u8> = row.get(8)?;

        Ok(IndexedChunk {
            chunk: Chunk {
                chunk_id: row.get(0)?,
                order: order as usize,
                text: row.get(2)?,
                char_span: CharSpan {
                    start: char_start as usize,
                    end: char_end as usize,
                },
                timestamp: row.get(5)?,
                metadata: ChunkMetadata {
                    video_id: row.get(6)?,
                    source: row.get(7)?,
                },
            },
            embedding: Self::bytes_to_embedding(&embedding_bytes),
        })
    }

    fn load_info(conn: &Connection, collection_id: &str) -> Result<Option<CollectionInfo>> {
        Ok(conn
            .query_row(
                "SELECT collection_id, video_id, source, embedding_model, dimensions, chunk_count, created_at
                 FROM collections WHERE collection_id = ?1",
                params![collection_id],
                Self::row_to_info,
            )
            .optional()?)
    }

    fn load_items(conn: &Connection, collection_id: &str) -> Result<Vec<IndexedChunk>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM chunks WHERE collection_id = ?1 ORDER BY chunk_order",
            CHUNK_COLUMNS
        ))?;

        let items = stmt
            .query_map(params![collection_id], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn insert_items(tx: &Transaction<'_>, collection_id: &str, items: &[IndexedChunk]) -> Result<()> {
        let mut stmt = tx.prepare(
            r#"
            INSERT OR REPLACE INTO chunks
            (collection_id, chunk_id, chunk_order, text, char_start, char_end, timestamp,
             video_id, source, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )?;

        for item in items {
            let chunk = &item.chunk;
            stmt.execute(params![
                collection_id,
                chunk.chunk_id,
                chunk.order as i64,
                chunk.text,
                chunk.char_span.start as i64,
                chunk.char_span.end as i64,
                chunk.timestamp,
                chunk.metadata.video_id,
                chunk.metadata.source,
                Self::embedding_to_bytes(&item.embedding),
            ])?;
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    #[instrument(skip(self, info, items), fields(collection = %info.collection_id, count = items.len()))]
    async fn replace_collection(&self, info: &CollectionInfo, items: &[IndexedChunk]) -> Result<()> {
        validate_items(info, items)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM chunks WHERE collection_id = ?1",
            params![info.collection_id],
        )?;
        tx.execute(
            r#"
            INSERT OR REPLACE INTO collections
            (collection_id, video_id, source, embedding_model, dimensions, chunk_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                info.collection_id,
                info.video_id,
                info.source,
                info.embedding_model,
                info.dimensions as i64,
                items.len() as i64,
                info.created_at.to_rfc3339(),
            ],
        )?;
        Self::insert_items(&tx, &info.collection_id, items)?;

        tx.commit()?;
        info!("Stored {} chunks in {}", items.len(), info.collection_id);
        Ok(())
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn upsert(&self, collection_id: &str, items: &[IndexedChunk]) -> Result<usize> {
        let mut conn = self.conn()?;
        let info = Self::load_info(&conn, collection_id)?
            .ok_or_else(|| unknown_collection(collection_id))?;
        validate_items(&info, items)?;

        let tx = conn.transaction()?;
        Self::insert_items(&tx, collection_id, items)?;
        tx.execute(
            "UPDATE collections SET chunk_count =
                (SELECT COUNT(*) FROM chunks WHERE collection_id = ?1)
             WHERE collection_id = ?1",
            params![collection_id],
        )?;
        tx.commit()?;

        debug!("Upserted {} chunks into {}", items.len(), collection_id);
        Ok(items.len())
    }

    #[instrument(skip(self, embedding))]
    async fn query(&self, collection_id: &str, embedding: &[f32], k: usize) -> Result<Vec<IndexMatch>> {
        let conn = self.conn()?;
        let info = Self::load_info(&conn, collection_id)?
            .ok_or_else(|| unknown_collection(collection_id))?;
        validate_query(&info, embedding)?;

        let matches = Self::load_items(&conn, collection_id)?
            .into_iter()
            .map(|item| IndexMatch {
                distance: cosine_distance(embedding, &item.embedding),
                chunk: item.chunk,
            })
            .collect();

        let results = rank(matches, k);
        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn get_all(&self, collection_id: &str) -> Result<Vec<Chunk>> {
        let conn = self.conn()?;
        if Self::load_info(&conn, collection_id)?.is_none() {
            return Err(unknown_collection(collection_id));
        }

        Ok(Self::load_items(&conn, collection_id)?
            .into_iter()
            .map(|item| item.chunk)
            .collect())
    }

    async fn collection(&self, collection_id: &str) -> Result<Option<CollectionInfo>> {
        let conn = self.conn()?;
        Self::load_info(&conn, collection_id)
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT collection_id, video_id, source, embedding_model, dimensions, chunk_count, created_at
            FROM collections
            ORDER BY created_at DESC
            "#,
        )?;

        let infos = stmt
            .query_map([], Self::row_to_info)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(infos)
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection_id: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let chunks = tx.execute(
            "DELETE FROM chunks WHERE collection_id = ?1",
            params![collection_id],
        )?;
        let deleted = tx.execute(
            "DELETE FROM collections WHERE collection_id = ?1",
            params![collection_id],
        )?;
        tx.commit()?;

        info!("Deleted {} chunks for {}", chunks, collection_id);
        Ok(deleted > 0)
    }
}
