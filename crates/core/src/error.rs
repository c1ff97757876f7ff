use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("nothing to index: corpus has no chunks")]
    EmptyCorpus,

    #[error("chunk/embedding count mismatch: {chunks} chunks vs {embeddings} embeddings")]
    LengthMismatch { chunks: usize, embeddings: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corpus not found at {0}")]
    CorpusNotFound(PathBuf),

    #[error("corpus corrupt: {0}")]
    CorpusCorrupt(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query failed: {0}")]
    ModelUnavailable(#[source] IngestError),

    #[error("query failed: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
