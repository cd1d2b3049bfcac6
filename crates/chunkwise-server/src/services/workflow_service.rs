use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::ChunkerCatalog;
use crate::document::{DocumentStore, StoredDocument};
use crate::utils::ApiError;
use crate::workflow::constraints;
use crate::workflow::{
    ChunkStatistics, ChunkingStrategy, EvaluationMetrics, Patch, WorkflowPatch, WorkflowStore,
};
use uuid::Uuid;

use super::compute::ComputeBackend;
use super::stats::calculate_chunk_stats;

#[derive(Debug, Clone, Serialize)]
pub struct VisualizeResponse {
    pub stats: ChunkStatistics,
    pub html: String,
}

/// Result of a visualization run. `applied` is false when a newer run
/// superseded this one, in which case the store was left alone.
#[derive(Debug, Clone)]
pub struct VisualizeOutcome {
    pub response: VisualizeResponse,
    pub applied: bool,
}

/// Orchestrates the visualization and evaluation pipelines: resolve the
/// workflow's document and strategy, call the compute backend, and merge the
/// result back into the store. Results are applied only after the remote
/// call succeeds, so a failure leaves earlier results untouched.
pub struct WorkflowService {
    store: Arc<WorkflowStore>,
    documents: Arc<DocumentStore>,
    catalog: Arc<ChunkerCatalog>,
    backend: Arc<dyn ComputeBackend>,
}

impl WorkflowService {
    pub fn new(
        store: Arc<WorkflowStore>,
        documents: Arc<DocumentStore>,
        catalog: Arc<ChunkerCatalog>,
        backend: Arc<dyn ComputeBackend>,
    ) -> Self {
        Self {
            store,
            documents,
            catalog,
            backend,
        }
    }

    pub fn store(&self) -> &Arc<WorkflowStore> {
        &self.store
    }

    /// Resolves everything a compute call needs from a workflow id. The
    /// strategy is clamped through the constraint rules so the services
    /// never receive an overlap that contradicts the chunk size.
    fn prepared(&self, id: Uuid) -> Result<(ChunkingStrategy, StoredDocument), ApiError> {
        let workflow = self
            .store
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("No workflow with id {}", id)))?;
        let strategy = workflow.chunking_strategy.ok_or_else(|| {
            ApiError::Validation("Select a chunker for this workflow first".to_string())
        })?;
        let document_title = workflow.document_title.ok_or_else(|| {
            ApiError::Validation("Attach a document to this workflow first".to_string())
        })?;
        let document = self.documents.find_by_title(&document_title).ok_or_else(|| {
            ApiError::NotFound(format!("No document titled {}", document_title))
        })?;

        let strategy = match self
            .catalog
            .find_by_strategy(&strategy.provider, &strategy.chunker_type)
        {
            Some(chunker) => constraints::sanitize(chunker, &strategy),
            None => strategy,
        };

        Ok((strategy, document))
    }

    pub async fn visualize(&self, id: Uuid) -> Result<VisualizeResponse, ApiError> {
        self.visualize_if(id, || true)
            .await
            .map(|outcome| outcome.response)
    }

    /// Runs the visualization pipeline; `still_current` is consulted after
    /// the compute calls finish, and a stale run's results are discarded
    /// instead of merged into the store.
    pub async fn visualize_if<F>(
        &self,
        id: Uuid,
        still_current: F,
    ) -> Result<VisualizeOutcome, ApiError>
    where
        F: Fn() -> bool + Send,
    {
        let (strategy, document) = self.prepared(id)?;

        let chunks = self.backend.fetch_chunks(&strategy, &document.content).await?;
        let stats = calculate_chunk_stats(&chunks)?;
        let html = self.backend.render_visualization(&chunks).await?;
        let response = VisualizeResponse { stats, html };

        if !still_current() {
            debug!("Discarding superseded visualization for workflow {}", id);
            return Ok(VisualizeOutcome {
                response,
                applied: false,
            });
        }

        self.store.patch(
            id,
            WorkflowPatch {
                chunks_stats: Patch::Set(response.stats.clone()),
                visualization_html: Patch::Set(response.html.clone()),
                ..Default::default()
            },
        )?;

        info!(
            "Visualized workflow {}: {} chunks",
            id, response.stats.total_chunks
        );
        Ok(VisualizeOutcome {
            response,
            applied: true,
        })
    }

    pub async fn evaluate(&self, id: Uuid) -> Result<EvaluationMetrics, ApiError> {
        let (strategy, document) = self.prepared(id)?;

        let response = self.backend.run_evaluation(&strategy, &document.id).await?;
        let metrics = response
            .results
            .first()
            .cloned()
            .ok_or_else(|| {
                ApiError::Schema("Evaluation response contained no results".to_string())
            })?;

        self.store.patch(
            id,
            WorkflowPatch {
                evaluation_metrics: Patch::Set(metrics.clone()),
                ..Default::default()
            },
        )?;

        info!("Evaluated workflow {}", id);
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::compute::{Chunk, EvaluationResponse, MockComputeBackend};
    use crate::workflow::Stage;
    use std::collections::BTreeMap;

    fn strategy() -> ChunkingStrategy {
        ChunkingStrategy {
            provider: "chonkie".to_string(),
            chunker_type: "token".to_string(),
            options: BTreeMap::from([
                ("chunk_size".to_string(), 8.0),
                ("chunk_overlap".to_string(), 0.0),
            ]),
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            start_index: 0,
            end_index: text.len(),
            token_count: None,
        }
    }

    struct Fixture {
        service: WorkflowService,
        workflow_id: Uuid,
    }

    fn fixture(backend: MockComputeBackend, attach: bool) -> Fixture {
        let store = Arc::new(WorkflowStore::new());
        let documents = Arc::new(DocumentStore::new(50 * 1024));
        let workflow = store.create("Demo").unwrap();

        if attach {
            documents.add("demo.txt", "some document text").unwrap();
            store
                .patch(
                    workflow.id,
                    WorkflowPatch {
                        document_title: Patch::Set("demo.txt".to_string()),
                        chunking_strategy: Patch::Set(strategy()),
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        Fixture {
            service: WorkflowService::new(
                store,
                documents,
                Arc::new(ChunkerCatalog::builtin()),
                Arc::new(backend),
            ),
            workflow_id: workflow.id,
        }
    }

    #[tokio::test]
    async fn visualize_patches_stats_and_html() {
        let mut backend = MockComputeBackend::new();
        backend
            .expect_fetch_chunks()
            .returning(|_, _| Ok(vec![chunk("some dog"), chunk("text")]));
        backend
            .expect_render_visualization()
            .returning(|_| Ok("<div>chunks</div>".to_string()));

        let fx = fixture(backend, true);
        let response = fx.service.visualize(fx.workflow_id).await.unwrap();
        assert_eq!(response.stats.total_chunks, 2);

        let workflow = fx.service.store().get(fx.workflow_id).unwrap();
        assert_eq!(workflow.chunks_stats, Some(response.stats));
        assert_eq!(
            workflow.visualization_html,
            Some("<div>chunks</div>".to_string())
        );
    }

    #[tokio::test]
    async fn failed_visualize_leaves_previous_results_untouched() {
        let mut backend = MockComputeBackend::new();
        let mut call = 0;
        backend.expect_fetch_chunks().returning_st(move |_, _| {
            call += 1;
            if call == 1 {
                Ok(vec![chunk("first run")])
            } else {
                Err(ApiError::Service("chunking service down".to_string()))
            }
        });
        backend
            .expect_render_visualization()
            .returning(|_| Ok("<div>first</div>".to_string()));

        let fx = fixture(backend, true);
        fx.service.visualize(fx.workflow_id).await.unwrap();
        let before = fx.service.store().get(fx.workflow_id).unwrap();

        let err = fx.service.visualize(fx.workflow_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Service(_)));

        let after = fx.service.store().get(fx.workflow_id).unwrap();
        assert_eq!(after.chunks_stats, before.chunks_stats);
        assert_eq!(after.visualization_html, before.visualization_html);
    }

    #[tokio::test]
    async fn superseded_visualize_is_discarded_not_merged() {
        let mut backend = MockComputeBackend::new();
        backend
            .expect_fetch_chunks()
            .returning(|_, _| Ok(vec![chunk("stale run")]));
        backend
            .expect_render_visualization()
            .returning(|_| Ok("<div>stale</div>".to_string()));

        let fx = fixture(backend, true);
        let outcome = fx
            .service
            .visualize_if(fx.workflow_id, || false)
            .await
            .unwrap();
        assert!(!outcome.applied);
        assert_eq!(outcome.response.stats.total_chunks, 1);

        let workflow = fx.service.store().get(fx.workflow_id).unwrap();
        assert_eq!(workflow.chunks_stats, None);
        assert_eq!(workflow.visualization_html, None);
    }

    #[tokio::test]
    async fn evaluate_extracts_the_first_result_and_advances_the_stage() {
        let mut backend = MockComputeBackend::new();
        backend.expect_run_evaluation().returning(|_, _| {
            Ok(EvaluationResponse {
                chunkers_evaluated: vec!["chonkie token".to_string()],
                results: vec![EvaluationMetrics {
                    precision_mean: 0.708,
                    recall_mean: 0.715,
                    iou_mean: 0.65,
                    precision_omega_mean: 0.725,
                }],
            })
        });

        let fx = fixture(backend, true);
        let metrics = fx.service.evaluate(fx.workflow_id).await.unwrap();
        assert_eq!(metrics.precision_mean, 0.708);

        let workflow = fx.service.store().get(fx.workflow_id).unwrap();
        assert_eq!(workflow.stage, Stage::Evaluated);
        assert_eq!(workflow.evaluation_metrics, Some(metrics));
    }

    #[tokio::test]
    async fn evaluation_without_results_is_a_schema_error() {
        let mut backend = MockComputeBackend::new();
        backend.expect_run_evaluation().returning(|_, _| {
            Ok(EvaluationResponse {
                chunkers_evaluated: Vec::new(),
                results: Vec::new(),
            })
        });

        let fx = fixture(backend, true);
        let err = fx.service.evaluate(fx.workflow_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));

        let workflow = fx.service.store().get(fx.workflow_id).unwrap();
        assert_eq!(workflow.evaluation_metrics, None);
        assert_eq!(workflow.stage, Stage::Configured);
    }

    #[tokio::test]
    async fn pipelines_demand_a_configured_workflow() {
        let fx = fixture(MockComputeBackend::new(), false);

        let err = fx.service.visualize(fx.workflow_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = fx.service.evaluate(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
