use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_retrieval_core::{ingest_folder, store, PipelineConfig, QueryMatcher};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-retrieval", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Corpus location (directory holding the index and chunk artifacts)
    #[arg(long, global = true, default_value = "database/corpus")]
    corpus: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a folder of PDFs and (re)build the corpus.
    Ingest {
        /// Folder containing the PDF files (not searched recursively).
        #[arg(long)]
        folder: PathBuf,
        /// Chunk window size in characters.
        #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(100..=2_000))]
        chunk_size: u64,
        /// Overlap between neighboring chunks in characters.
        #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(0..=500))]
        chunk_overlap: u64,
        /// Embedding model identifier, e.g. "ngram-384".
        #[arg(long, default_value = pdf_retrieval_core::DEFAULT_MODEL_ID)]
        model: String,
        /// Glob pattern for the files to ingest.
        #[arg(long, default_value = "*.pdf")]
        pattern: String,
    },
    /// Retrieve the chunks closest to a query from the corpus.
    Query {
        /// Natural-language query text.
        #[arg(long)]
        query: String,
        /// Number of matches to return.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Ingest {
            folder,
            chunk_size,
            chunk_overlap,
            model,
            pattern,
        } => {
            let config = PipelineConfig {
                chunk_size: chunk_size as usize,
                chunk_overlap: chunk_overlap as usize,
                model_id: model,
                file_pattern: pattern,
                ..PipelineConfig::default()
            };

            let report = ingest_folder(&folder, &config, &cli.corpus)
                .with_context(|| format!("ingestion failed for {}", folder.display()))?;

            if !report.failures.is_empty() {
                warn!(
                    "skipped_files={} for folder={}",
                    report.failures.len(),
                    folder.display()
                );
                for failure in &report.failures {
                    warn!(path = %failure.path.display(), reason = %failure.reason, "skipped file");
                }
            }

            println!(
                "{} chunks from {} file(s) written to {} at {}",
                report.chunk_count,
                report.files_processed,
                report.corpus_path.display(),
                Utc::now().to_rfc3339()
            );
            if !report.failures.is_empty() {
                println!(
                    "{} file(s) skipped; re-run with RUST_LOG=warn for reasons",
                    report.failures.len()
                );
            }
        }
        Command::Query { query, top_k } => {
            let corpus = store::load(&cli.corpus)
                .with_context(|| format!("cannot load corpus at {}", cli.corpus.display()))?;
            info!(
                model = %corpus.manifest.model_id,
                chunk_count = corpus.len(),
                "corpus loaded"
            );

            let matcher = QueryMatcher::for_corpus(&corpus)?;
            let matches = matcher.top_matches(&query, &corpus, top_k);

            println!("query: {query}");
            if matches.is_empty() {
                println!("no matches");
            }
            for (rank, hit) in matches.iter().enumerate() {
                println!(
                    "[{}] score={:.4} source={} chunk={}",
                    rank + 1,
                    hit.score,
                    hit.chunk.source_document_id,
                    hit.chunk.position
                );
                println!("  {}", hit.chunk.content.trim());
            }
        }
    }

    Ok(())
}
