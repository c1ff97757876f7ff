use crate::error::IngestError;

pub fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<(), IngestError> {
    if chunk_size == 0 {
        return Err(IngestError::InvalidChunkConfig(
            "chunk_size must be positive".to_string(),
        ));
    }

    if chunk_overlap >= chunk_size {
        return Err(IngestError::InvalidChunkConfig(format!(
            "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }

    Ok(())
}

/// Splits text into overlapping windows; each window after the first
/// starts `chunk_size - chunk_overlap` characters after the previous one.
/// Empty or whitespace-only input yields an empty sequence.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<String>, IngestError> {
    validate_window(chunk_size, chunk_overlap)?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - chunk_overlap;

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
