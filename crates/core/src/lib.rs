pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod matcher;
pub mod models;
pub mod store;

pub use chunking::{split_text, validate_window};
pub use embeddings::{load_embedder, CharacterNgramEmbedder, Embedder, DEFAULT_MODEL_ID};
pub use error::{IngestError, QueryError, StoreError};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use index::FlatIndex;
pub use ingest::{discover_matching_files, ingest, ingest_folder};
pub use matcher::QueryMatcher;
pub use models::{
    Chunk, ChunkMatch, CorpusManifest, IngestFailure, IngestReport, PipelineConfig,
};
pub use store::Corpus;
