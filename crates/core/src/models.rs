use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The unit of retrieval. Its index in the stored chunk sequence is the
/// join key with the vector index; `position` is its order within the
/// source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub source_document_id: String,
    pub position: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub model_id: String,
    pub file_pattern: String,
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            chunk_overlap: 200,
            model_id: crate::embeddings::DEFAULT_MODEL_ID.to_string(),
            file_pattern: "*.pdf".to_string(),
            top_k: 5,
        }
    }
}

/// Build-time parameters persisted with the chunk sequence so a query
/// session can reconstruct the embedder the corpus was built with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub model_id: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

impl CorpusManifest {
    // dimensions and chunk_count are finalized by the store at build time.
    pub fn new(model_id: &str, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            model_id: model_id.to_string(),
            dimensions: 0,
            chunk_size,
            chunk_overlap,
            chunk_count: 0,
            built_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct IngestReport {
    pub files_processed: usize,
    pub failures: Vec<IngestFailure>,
    pub chunk_count: usize,
    pub corpus_path: PathBuf,
}

/// Score is `1.0 - squared_l2_distance`: rank-preserving but unbounded
/// below, not a probability.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk: Chunk,
    pub score: f32,
}
