use crate::error::IngestError;

pub const DEFAULT_MODEL_ID: &str = "ngram-384";

const MIN_DIMENSIONS: usize = 64;
const MAX_DIMENSIONS: usize = 4096;

/// Maps text to fixed-dimension vectors. Infallible per call: anything
/// that can fail happens at construction time.
pub trait Embedder {
    fn dimensions(&self) -> usize;

    fn embed_one(&self, text: &str) -> Vec<f32>;

    fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }
}

/// Deterministic hashed character-trigram embedder; trigram counts are
/// FNV-1a bucketed and L2-normalized.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    dimensions: usize,
}

impl CharacterNgramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

/// Resolves a model identifier of the form `ngram-<dims>`; anything else
/// is `ModelUnavailable`.
pub fn load_embedder(model_id: &str) -> Result<CharacterNgramEmbedder, IngestError> {
    let dimensions = model_id
        .strip_prefix("ngram-")
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|dims| (MIN_DIMENSIONS..=MAX_DIMENSIONS).contains(dims))
        .ok_or_else(|| {
            IngestError::ModelUnavailable(format!(
                "unknown model {model_id:?}; expected \"ngram-<dims>\" with dims between {MIN_DIMENSIONS} and {MAX_DIMENSIONS}"
            ))
        })?;

    Ok(CharacterNgramEmbedder::new(dimensions))
}
