use async_trait::async_trait;

use crate::utils::ApiError;
use crate::workflow::{ChunkingStrategy, EvaluationMetrics};

use super::compute::{Chunk, ComputeBackend, EvaluationResponse};

const DEFAULT_CHUNK_SIZE: usize = 512;

/// In-process compute backend for local development: deterministic
/// character-window chunking, a bare-bones highlight rendering, and canned
/// evaluation metrics. Lets the gateway run end to end with none of the
/// compute services up.
#[derive(Default)]
pub struct LocalComputeBackend;

impl LocalComputeBackend {
    pub fn new() -> Self {
        Self
    }
}

fn option_as_usize(strategy: &ChunkingStrategy, key: &str) -> Option<usize> {
    strategy
        .options
        .get(key)
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as usize)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl ComputeBackend for LocalComputeBackend {
    async fn fetch_chunks(
        &self,
        strategy: &ChunkingStrategy,
        text: &str,
    ) -> Result<Vec<Chunk>, ApiError> {
        let chunk_size = option_as_usize(strategy, "chunk_size")
            .unwrap_or(DEFAULT_CHUNK_SIZE)
            .max(1);
        let overlap = option_as_usize(strategy, "chunk_overlap")
            .unwrap_or(0)
            .min(chunk_size - 1);

        let chars: Vec<char> = text.chars().collect();
        let total_len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total_len {
            let end = std::cmp::min(start + chunk_size, total_len);
            chunks.push(Chunk {
                text: chars[start..end].iter().collect(),
                start_index: start,
                end_index: end,
                token_count: None,
            });
            if end >= total_len {
                break;
            }
            start += chunk_size - overlap;
        }

        Ok(chunks)
    }

    async fn render_visualization(&self, chunks: &[Chunk]) -> Result<String, ApiError> {
        let mut html = String::from("<div class=\"chunk-visualization\">");
        for (index, chunk) in chunks.iter().enumerate() {
            html.push_str(&format!(
                "<span class=\"chunk chunk-{}\">{}</span>",
                index % 2,
                escape_html(&chunk.text)
            ));
        }
        html.push_str("</div>");
        Ok(html)
    }

    async fn run_evaluation(
        &self,
        strategy: &ChunkingStrategy,
        _document_id: &str,
    ) -> Result<EvaluationResponse, ApiError> {
        Ok(EvaluationResponse {
            chunkers_evaluated: vec![format!(
                "{} {}",
                strategy.provider, strategy.chunker_type
            )],
            results: vec![EvaluationMetrics {
                precision_mean: 0.708,
                recall_mean: 0.715,
                iou_mean: 0.65,
                precision_omega_mean: 0.725,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn strategy(options: &[(&str, f64)]) -> ChunkingStrategy {
        ChunkingStrategy {
            provider: "chonkie".to_string(),
            chunker_type: "token".to_string(),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn windows_cover_the_whole_text() {
        let backend = LocalComputeBackend::new();
        let chunks = backend
            .fetch_chunks(&strategy(&[("chunk_size", 4.0)]), "abcdefghij")
            .await
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "abcd");
        assert_eq!(chunks[2].text, "ij");
        assert_eq!(chunks[2].end_index, 10);
    }

    #[tokio::test]
    async fn overlap_repeats_the_window_tail() {
        let backend = LocalComputeBackend::new();
        let chunks = backend
            .fetch_chunks(
                &strategy(&[("chunk_size", 4.0), ("chunk_overlap", 2.0)]),
                "abcdefgh",
            )
            .await
            .unwrap();

        assert_eq!(chunks[0].text, "abcd");
        assert_eq!(chunks[1].text, "cdef");
        assert_eq!(chunks[1].start_index, 2);
    }

    #[tokio::test]
    async fn empty_text_produces_no_chunks() {
        let backend = LocalComputeBackend::new();
        let chunks = backend
            .fetch_chunks(&strategy(&[]), "")
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn visualization_escapes_markup() {
        let backend = LocalComputeBackend::new();
        let html = backend
            .render_visualization(&[Chunk {
                text: "<b>bold</b>".to_string(),
                start_index: 0,
                end_index: 11,
                token_count: None,
            }])
            .await
            .unwrap();

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold"));
    }
}
