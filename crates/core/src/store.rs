use crate::error::StoreError;
use crate::index::FlatIndex;
use crate::models::{Chunk, CorpusManifest};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const INDEX_FILE: &str = "index.bin";
pub const CHUNKS_FILE: &str = "chunks.json";

#[derive(Debug, Serialize, Deserialize)]
struct ChunkArtifact {
    manifest: CorpusManifest,
    chunks: Vec<Chunk>,
}

/// A loaded corpus: the similarity index and its parallel chunk sequence.
/// Read-only; a new ingestion run replaces it wholesale.
#[derive(Debug)]
pub struct Corpus {
    pub index: FlatIndex,
    pub chunks: Vec<Chunk>,
    pub manifest: CorpusManifest,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Replaces whatever lives at `destination`. Artifacts are staged in a
/// temporary sibling directory first; a crash mid-swap leaves the
/// destination absent, never half-overwritten.
pub fn build(
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    mut manifest: CorpusManifest,
    destination: &Path,
) -> Result<(), StoreError> {
    if chunks.len() != embeddings.len() {
        return Err(StoreError::LengthMismatch {
            chunks: chunks.len(),
            embeddings: embeddings.len(),
        });
    }

    if chunks.is_empty() {
        return Err(StoreError::EmptyCorpus);
    }

    let mut index = FlatIndex::new(embeddings[0].len());
    index.add(embeddings)?;

    manifest.dimensions = index.dimensions();
    manifest.chunk_count = chunks.len();

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(destination)?;
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let mut index_bytes = Vec::new();
    index.write_to(&mut index_bytes)?;
    fs::write(staging.join(INDEX_FILE), index_bytes)?;

    let artifact = ChunkArtifact {
        manifest,
        chunks: chunks.to_vec(),
    };
    fs::write(staging.join(CHUNKS_FILE), serde_json::to_vec(&artifact)?)?;
    debug!(staging = %staging.display(), "corpus artifacts staged");

    if destination.exists() {
        fs::remove_dir_all(destination)?;
    }
    fs::rename(&staging, destination)?;

    info!(
        destination = %destination.display(),
        chunk_count = chunks.len(),
        dimensions = index.dimensions(),
        "corpus written"
    );
    Ok(())
}

/// A missing directory or artifact is `CorpusNotFound`; artifacts that
/// disagree on counts or dimensionality are `CorpusCorrupt`, checked here
/// rather than tolerated as out-of-range lookups later.
pub fn load(source: &Path) -> Result<Corpus, StoreError> {
    let index_path = source.join(INDEX_FILE);
    let chunks_path = source.join(CHUNKS_FILE);

    if !index_path.is_file() || !chunks_path.is_file() {
        return Err(StoreError::CorpusNotFound(source.to_path_buf()));
    }

    let mut reader = BufReader::new(File::open(&index_path)?);
    let index = FlatIndex::read_from(&mut reader)?;

    let raw = fs::read(&chunks_path)?;
    let artifact: ChunkArtifact = serde_json::from_slice(&raw)
        .map_err(|error| StoreError::CorpusCorrupt(format!("chunk artifact unreadable: {error}")))?;

    if artifact.chunks.len() != index.len() {
        return Err(StoreError::CorpusCorrupt(format!(
            "index holds {} vectors but chunk store holds {} chunks",
            index.len(),
            artifact.chunks.len()
        )));
    }

    if artifact.manifest.chunk_count != artifact.chunks.len() {
        return Err(StoreError::CorpusCorrupt(format!(
            "manifest records {} chunks but chunk store holds {}",
            artifact.manifest.chunk_count,
            artifact.chunks.len()
        )));
    }

    if artifact.manifest.dimensions != index.dimensions() {
        return Err(StoreError::CorpusCorrupt(format!(
            "manifest records {} dimensions but index holds {}",
            artifact.manifest.dimensions,
            index.dimensions()
        )));
    }

    Ok(Corpus {
        index,
        chunks: artifact.chunks,
        manifest: artifact.manifest,
    })
}

fn staging_path(destination: &Path) -> Result<PathBuf, StoreError> {
    if destination.file_name().is_none() {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination has no directory name: {}", destination.display()),
        )));
    }

    let mut staged = destination.as_os_str().to_owned();
    staged.push(".tmp");
    Ok(PathBuf::from(staged))
}

#[cfg(test)]
mod tests {
    use super::{build, load, CHUNKS_FILE, INDEX_FILE};
    use crate::error::StoreError;
    use crate::index::FlatIndex;
    use crate::models::{Chunk, CorpusManifest};
    use std::fs;
    use tempfile::tempdir;

    fn chunk(content: &str, position: u64) -> Chunk {
        Chunk {
            content: content.to_string(),
            source_document_id: "doc.pdf".to_string(),
            position,
        }
    }

    fn manifest() -> CorpusManifest {
        CorpusManifest::new("ngram-64", 100, 10)
    }

    fn sample_embeddings() -> Vec<Vec<f32>> {
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]]
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![chunk("alpha", 0), chunk("beta", 1), chunk("gamma", 2)]
    }

    #[test]
    fn build_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        build(&sample_chunks(), &sample_embeddings(), manifest(), &destination).unwrap();
        let corpus = load(&destination).unwrap();

        assert_eq!(corpus.chunks, sample_chunks());
        assert_eq!(corpus.manifest.chunk_count, 3);
        assert_eq!(corpus.manifest.dimensions, 2);
        assert_eq!(corpus.manifest.model_id, "ngram-64");

        let mut direct = FlatIndex::new(2);
        direct.add(&sample_embeddings()).unwrap();
        assert_eq!(
            corpus.index.search(&[1.0, 0.0], 3),
            direct.search(&[1.0, 0.0], 3)
        );
    }

    #[test]
    fn mismatched_lengths_fail_before_touching_storage() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        let result = build(
            &sample_chunks(),
            &sample_embeddings()[..2],
            manifest(),
            &destination,
        );

        assert!(matches!(
            result,
            Err(StoreError::LengthMismatch {
                chunks: 3,
                embeddings: 2
            })
        ));
        assert!(!destination.exists());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        let result = build(&[], &[], manifest(), &destination);
        assert!(matches!(result, Err(StoreError::EmptyCorpus)));
        assert!(!destination.exists());
    }

    #[test]
    fn rebuild_fully_replaces_previous_corpus() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        build(&sample_chunks(), &sample_embeddings(), manifest(), &destination).unwrap();
        build(
            &[chunk("only survivor", 0)],
            &[vec![0.5, 0.5, 0.5]],
            manifest(),
            &destination,
        )
        .unwrap();

        let corpus = load(&destination).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.chunks[0].content, "only survivor");
        assert_eq!(corpus.index.len(), 1);
        assert_eq!(corpus.manifest.dimensions, 3);
    }

    #[test]
    fn missing_location_is_not_found() {
        let dir = tempdir().unwrap();
        let result = load(&dir.path().join("nowhere"));
        assert!(matches!(result, Err(StoreError::CorpusNotFound(_))));
    }

    #[test]
    fn missing_chunk_artifact_is_not_found() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        build(&sample_chunks(), &sample_embeddings(), manifest(), &destination).unwrap();
        fs::remove_file(destination.join(CHUNKS_FILE)).unwrap();

        let result = load(&destination);
        assert!(matches!(result, Err(StoreError::CorpusNotFound(_))));
    }

    #[test]
    fn artifact_count_disagreement_is_corrupt() {
        let dir = tempdir().unwrap();
        let small = dir.path().join("small");
        let large = dir.path().join("large");

        build(
            &sample_chunks()[..2],
            &sample_embeddings()[..2],
            manifest(),
            &small,
        )
        .unwrap();
        build(&sample_chunks(), &sample_embeddings(), manifest(), &large).unwrap();

        // Simulate a torn corpus: index from one build, chunks from another.
        fs::copy(large.join(INDEX_FILE), small.join(INDEX_FILE)).unwrap();

        let result = load(&small);
        assert!(matches!(result, Err(StoreError::CorpusCorrupt(_))));
    }

    #[test]
    fn garbled_chunk_artifact_is_corrupt() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("corpus");

        build(&sample_chunks(), &sample_embeddings(), manifest(), &destination).unwrap();
        fs::write(destination.join(CHUNKS_FILE), b"not json").unwrap();

        let result = load(&destination);
        assert!(matches!(result, Err(StoreError::CorpusCorrupt(_))));
    }
}
