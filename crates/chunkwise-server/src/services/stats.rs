use crate::utils::ApiError;
use crate::workflow::ChunkStatistics;

use super::compute::Chunk;

/// Derives the statistics shown next to a visualization from the chunk list.
///
/// An empty list or a chunk without text means the chunking service answered
/// with something nonsensical for a non-empty document, which is a schema
/// problem with the upstream response, not a user error.
pub fn calculate_chunk_stats(chunks: &[Chunk]) -> Result<ChunkStatistics, ApiError> {
    if chunks.is_empty() {
        return Err(ApiError::Schema(
            "Chunking service returned no chunks".to_string(),
        ));
    }

    let mut total_chars = 0usize;
    let mut largest: Option<&Chunk> = None;
    let mut smallest: Option<&Chunk> = None;

    for (index, chunk) in chunks.iter().enumerate() {
        let chars = chunk.text.chars().count();
        if chars == 0 {
            return Err(ApiError::Schema(format!(
                "Chunk at index {} has empty text",
                index
            )));
        }
        total_chars += chars;

        if largest.is_none_or(|c| chars > c.text.chars().count()) {
            largest = Some(chunk);
        }
        if smallest.is_none_or(|c| chars < c.text.chars().count()) {
            smallest = Some(chunk);
        }
    }

    let largest = largest.ok_or_else(|| ApiError::Internal("no largest chunk".to_string()))?;
    let smallest = smallest.ok_or_else(|| ApiError::Internal("no smallest chunk".to_string()))?;

    Ok(ChunkStatistics {
        total_chunks: chunks.len(),
        avg_chars: total_chars as f64 / chunks.len() as f64,
        largest_chunk_chars: largest.text.chars().count(),
        largest_text: largest.text.clone(),
        smallest_chunk_chars: smallest.text.chars().count(),
        smallest_text: smallest.text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            start_index: 0,
            end_index: text.len(),
            token_count: None,
        }
    }

    #[test]
    fn tracks_totals_and_extremes() {
        let chunks = vec![chunk("abcd"), chunk("ab"), chunk("abcdef")];
        let stats = calculate_chunk_stats(&chunks).unwrap();

        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.avg_chars, 4.0);
        assert_eq!(stats.largest_chunk_chars, 6);
        assert_eq!(stats.largest_text, "abcdef");
        assert_eq!(stats.smallest_chunk_chars, 2);
        assert_eq!(stats.smallest_text, "ab");
    }

    #[test]
    fn single_chunk_is_both_largest_and_smallest() {
        let stats = calculate_chunk_stats(&[chunk("only")]).unwrap();
        assert_eq!(stats.largest_text, "only");
        assert_eq!(stats.smallest_text, "only");
        assert_eq!(stats.avg_chars, 4.0);
    }

    #[test]
    fn empty_or_textless_chunks_are_schema_errors() {
        assert!(matches!(
            calculate_chunk_stats(&[]),
            Err(ApiError::Schema(_))
        ));
        assert!(matches!(
            calculate_chunk_stats(&[chunk("ok"), chunk("")]),
            Err(ApiError::Schema(_))
        ));
    }
}
