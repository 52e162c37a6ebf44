//! Error types for tubequery.

use std::fmt;
use thiserror::Error;

/// External collaborator a failed call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the raw transcript.
    Transcript,
    /// Generating embeddings.
    Embedding,
    /// Reading from or writing to the vector index.
    VectorIndex,
    /// Calling the completion model.
    Completion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transcript => write!(f, "transcript"),
            Stage::Embedding => write!(f, "embedding"),
            Stage::VectorIndex => write!(f, "vector-index"),
            Stage::Completion => write!(f, "completion"),
        }
    }
}

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    EmptyResult,
    ExternalService,
    DataIntegrity,
    Internal,
}

/// Library-level error type for tubequery operations.
#[derive(Error, Debug)]
pub enum TubeQueryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid chunk configuration: {0}")]
    InvalidChunkConfig(String),

    #[error("Unknown video: {0}. Ingest it first with 'tubequery ingest'.")]
    UnknownVideo(String),

    #[error("Transcript for {0} has no segments")]
    EmptyTranscript(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error(
        "Collection {collection} was built with embedding model '{stored}' but '{requested}' is configured. Re-ingest with --force."
    )]
    IncompatibleIndex {
        collection: String,
        stored: String,
        requested: String,
    },

    #[error("{stage} service failed: {message}")]
    ExternalService { stage: Stage, message: String },

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TubeQueryError {
    /// Wrap a failure from an external collaborator.
    pub fn external(stage: Stage, message: impl fmt::Display) -> Self {
        TubeQueryError::ExternalService {
            stage,
            message: message.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TubeQueryError::Config(_)
            | TubeQueryError::InvalidInput(_)
            | TubeQueryError::InvalidChunkConfig(_) => ErrorKind::InvalidInput,
            TubeQueryError::UnknownVideo(_) => ErrorKind::NotFound,
            TubeQueryError::EmptyTranscript(_) => ErrorKind::EmptyResult,
            TubeQueryError::ExternalService { .. }
            | TubeQueryError::ToolNotFound(_)
            | TubeQueryError::Database(_) => ErrorKind::ExternalService,
            TubeQueryError::DataIntegrity(_) | TubeQueryError::IncompatibleIndex { .. } => {
                ErrorKind::DataIntegrity
            }
            TubeQueryError::Io(_) | TubeQueryError::Json(_) | TubeQueryError::TomlParse(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The external stage that failed, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TubeQueryError::ExternalService { stage, .. } => Some(*stage),
            TubeQueryError::ToolNotFound(_) => Some(Stage::Transcript),
            TubeQueryError::Database(_) => Some(Stage::VectorIndex),
            _ => None,
        }
    }
}

/// Result type alias for tubequery operations.
pub type Result<T> = std::result::Result<T, TubeQueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_error_carries_stage() {
        let err = TubeQueryError::external(Stage::Completion, "rate limited");
        assert_eq!(err.stage(), Some(Stage::Completion));
        assert_eq!(err.kind(), ErrorKind::ExternalService);
        assert_eq!(err.to_string(), "completion service failed: rate limited");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            TubeQueryError::InvalidChunkConfig("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(TubeQueryError::UnknownVideo("abc".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            TubeQueryError::EmptyTranscript("abc".into()).kind(),
            ErrorKind::EmptyResult
        );
        assert_eq!(TubeQueryError::UnknownVideo("abc".into()).stage(), None);
    }
}
