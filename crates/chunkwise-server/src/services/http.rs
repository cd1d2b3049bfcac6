use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::ComputeConfig;
use crate::utils::ApiError;
use crate::workflow::ChunkingStrategy;

use super::compute::{Chunk, ComputeBackend, EvaluationResponse};

/// Real compute backend: forwards requests to the chunking, visualization
/// and evaluation services over HTTP.
pub struct HttpComputeBackend {
    client: Client,
    config: ComputeConfig,
}

impl HttpComputeBackend {
    pub fn new(config: ComputeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.config.chunk_timeout_seconds)
    }

    fn evaluation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.evaluation_timeout_seconds)
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() {
        ApiError::Unreachable(format!("{} service: {}", operation, err))
    } else {
        ApiError::Service(format!("{} service: {}", operation, err))
    }
}

async fn reject_failure(
    operation: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Service(format!(
        "{} service returned {}: {}",
        operation, status, body
    )))
}

#[async_trait]
impl ComputeBackend for HttpComputeBackend {
    async fn fetch_chunks(
        &self,
        strategy: &ChunkingStrategy,
        text: &str,
    ) -> Result<Vec<Chunk>, ApiError> {
        debug!("Requesting chunks for {} chars", text.len());

        let response = self
            .client
            .post(format!("{}/chunks", self.config.chunking_url))
            .timeout(self.chunk_timeout())
            .json(&json!({ "chunker_config": strategy, "text": text }))
            .send()
            .await
            .map_err(|e| transport_error("chunking", e))?;

        reject_failure("chunking", response)
            .await?
            .json::<Vec<Chunk>>()
            .await
            .map_err(|e| ApiError::Schema(format!("chunking service: {}", e)))
    }

    async fn render_visualization(&self, chunks: &[Chunk]) -> Result<String, ApiError> {
        debug!("Requesting visualization for {} chunks", chunks.len());

        let response = self
            .client
            .post(format!("{}/visualization", self.config.visualization_url))
            .timeout(self.chunk_timeout())
            .json(&chunks)
            .send()
            .await
            .map_err(|e| transport_error("visualization", e))?;

        // The visualization service answers with raw HTML, not JSON.
        reject_failure("visualization", response)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Service(format!("visualization service: {}", e)))
    }

    async fn run_evaluation(
        &self,
        strategy: &ChunkingStrategy,
        document_id: &str,
    ) -> Result<EvaluationResponse, ApiError> {
        debug!("Requesting evaluation for document {}", document_id);

        let response = self
            .client
            .post(format!("{}/evaluate", self.config.evaluation_url))
            .timeout(self.evaluation_timeout())
            .json(&json!({
                "chunking_configs": [strategy],
                "document_id": document_id,
            }))
            .send()
            .await
            .map_err(|e| transport_error("evaluation", e))?;

        reject_failure("evaluation", response)
            .await?
            .json::<EvaluationResponse>()
            .await
            .map_err(|e| ApiError::Schema(format!("evaluation service: {}", e)))
    }
}
