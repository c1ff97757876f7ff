use crate::chunking;
use crate::embeddings::{load_embedder, Embedder};
use crate::error::{IngestError, StoreError};
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::models::{Chunk, CorpusManifest, IngestFailure, IngestReport, PipelineConfig};
use crate::store;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Non-recursive, case-insensitive glob match over file names. Paths are
/// sorted so chunk positions are reproducible across reruns.
pub fn discover_matching_files(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>, IngestError> {
    let matcher = Pattern::new(pattern)?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let name_matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| matcher.matches_with(name, options));

        if name_matches {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

/// Full pipeline run: enumerate, extract, chunk, embed in one batch,
/// replace the corpus. A file that fails extraction is recorded in the
/// report and skipped; zero chunks overall is `EmptyCorpus` and nothing
/// is written.
pub fn ingest<X: PdfExtractor>(
    folder: &Path,
    config: &PipelineConfig,
    destination: &Path,
    extractor: &X,
) -> Result<IngestReport, IngestError> {
    chunking::validate_window(config.chunk_size, config.chunk_overlap)?;
    let embedder = load_embedder(&config.model_id)?;

    let files = discover_matching_files(folder, &config.file_pattern)?;
    info!(
        folder = %folder.display(),
        pattern = %config.file_pattern,
        file_count = files.len(),
        "ingestion started"
    );

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut failures = Vec::new();
    let mut files_processed = 0usize;

    for path in files {
        let file_result = (|| {
            let document_id = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?
                .to_string();

            let mut file_chunks = Vec::new();
            let mut position = 0u64;

            for page in extractor.extract_pages(&path)? {
                for piece in
                    chunking::split_text(&page.text, config.chunk_size, config.chunk_overlap)?
                {
                    file_chunks.push(Chunk {
                        content: piece,
                        source_document_id: document_id.clone(),
                        position,
                    });
                    position += 1;
                }
            }

            Ok::<_, IngestError>(file_chunks)
        })();

        match file_result {
            Ok(file_chunks) => {
                debug!(path = %path.display(), chunks = file_chunks.len(), "file processed");
                files_processed += 1;
                chunks.extend(file_chunks);
            }
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "file skipped");
                failures.push(IngestFailure {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    if chunks.is_empty() {
        return Err(StoreError::EmptyCorpus.into());
    }

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
    let embeddings = embedder.embed(&texts);

    let manifest = CorpusManifest::new(&config.model_id, config.chunk_size, config.chunk_overlap);
    store::build(&chunks, &embeddings, manifest, destination)?;

    info!(
        files_processed,
        files_skipped = failures.len(),
        chunk_count = chunks.len(),
        destination = %destination.display(),
        "ingestion finished"
    );

    Ok(IngestReport {
        files_processed,
        failures,
        chunk_count: chunks.len(),
        corpus_path: destination.to_path_buf(),
    })
}

/// [`ingest`] with the default lopdf-backed extractor.
pub fn ingest_folder(
    folder: &Path,
    config: &PipelineConfig,
    destination: &Path,
) -> Result<IngestReport, IngestError> {
    ingest(folder, config, destination, &LopdfExtractor)
}
