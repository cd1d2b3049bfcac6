use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::ApiError;
use crate::workflow::{ChunkingStrategy, EvaluationMetrics};

/// One text segment produced by the chunking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

/// Evaluation service response; only the per-strategy results matter to the
/// gateway, the rest of the payload is bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(default)]
    pub chunkers_evaluated: Vec<String>,
    pub results: Vec<EvaluationMetrics>,
}

/// The compute backends behind the gateway: chunking, visualization and
/// evaluation. Two implementations exist (the real HTTP client and an
/// in-process one for local development), picked by configuration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    async fn fetch_chunks(
        &self,
        strategy: &ChunkingStrategy,
        text: &str,
    ) -> Result<Vec<Chunk>, ApiError>;

    async fn render_visualization(&self, chunks: &[Chunk]) -> Result<String, ApiError>;

    async fn run_evaluation(
        &self,
        strategy: &ChunkingStrategy,
        document_id: &str,
    ) -> Result<EvaluationResponse, ApiError>;
}
