use crate::embeddings::{load_embedder, CharacterNgramEmbedder, Embedder};
use crate::error::QueryError;
use crate::models::ChunkMatch;
use crate::store::{self, Corpus};
use std::path::Path;
use tracing::debug;

/// Embeds a query and retrieves the closest chunks. The embedder must be
/// the model the corpus was built with; a mismatched embedder passed to
/// `new` is not detected and yields meaningless rankings.
pub struct QueryMatcher<E: Embedder> {
    embedder: E,
}

impl QueryMatcher<CharacterNgramEmbedder> {
    /// Rebuilds the embedder the corpus was built with.
    pub fn for_corpus(corpus: &Corpus) -> Result<Self, QueryError> {
        let embedder =
            load_embedder(&corpus.manifest.model_id).map_err(QueryError::ModelUnavailable)?;
        Ok(Self { embedder })
    }
}

impl<E: Embedder> QueryMatcher<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Up to `min(k, corpus size)` chunks by descending similarity. Index
    /// positions without a chunk (corruption only) are skipped.
    pub fn top_matches(&self, query: &str, corpus: &Corpus, k: usize) -> Vec<ChunkMatch> {
        if k == 0 || corpus.is_empty() {
            return Vec::new();
        }

        let query_vector = self.embedder.embed_one(query);
        let neighbors = corpus.index.search(&query_vector, k);
        debug!(hits = neighbors.len(), k, "nearest-neighbor search done");

        neighbors
            .into_iter()
            .filter_map(|(position, distance)| {
                corpus.chunks.get(position).map(|chunk| ChunkMatch {
                    chunk: chunk.clone(),
                    score: 1.0 - distance,
                })
            })
            .collect()
    }

    pub fn match_at(
        &self,
        query: &str,
        corpus_path: &Path,
        k: usize,
    ) -> Result<Vec<ChunkMatch>, QueryError> {
        let corpus = store::load(corpus_path)?;
        Ok(self.top_matches(query, &corpus, k))
    }
}
