use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::services::VisualizeScheduler;
use crate::utils::ApiError;
use crate::workflow::{Workflow, WorkflowPatch, WorkflowStore};

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub title: String,
}

pub async fn list_workflows_handler(
    Extension(store): Extension<Arc<WorkflowStore>>,
) -> Json<Vec<Workflow>> {
    Json(store.list())
}

pub async fn create_workflow_handler(
    Extension(store): Extension<Arc<WorkflowStore>>,
    Json(request): Json<CreateWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = store.create(&request.title)?;
    info!("Created workflow {} ({})", workflow.title, workflow.id);
    Ok(Json(workflow))
}

pub async fn update_workflow_handler(
    Extension(store): Extension<Arc<WorkflowStore>>,
    Extension(scheduler): Extension<Arc<VisualizeScheduler>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WorkflowPatch>,
) -> Result<Json<Workflow>, ApiError> {
    let strategy_changed = patch.chunking_strategy.is_set();
    let workflow = store.patch(id, patch)?;

    // Configuration edits refresh the visualization downstream, debounced so
    // a burst of slider changes sends only the final configuration.
    if strategy_changed && workflow.document_title.is_some() {
        scheduler.schedule(id);
    }

    Ok(Json(workflow))
}

pub async fn delete_workflow_handler(
    Extension(store): Extension<Arc<WorkflowStore>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    store.delete(id)?;
    info!("Deleted workflow {}", id);
    Ok(StatusCode::NO_CONTENT)
}
