use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use uuid::Uuid;

use crate::services::{VisualizeResponse, VisualizeScheduler, WorkflowService};
use crate::utils::ApiError;

pub async fn visualize_handler(
    Extension(service): Extension<Arc<WorkflowService>>,
    Extension(scheduler): Extension<Arc<VisualizeScheduler>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisualizeResponse>, ApiError> {
    // A manual run supersedes any pending debounced refresh; if an even
    // newer configuration edit lands while this run is in flight, its result
    // is returned to the caller but not merged into the workflow.
    let generation = scheduler.begin(id);
    let outcome = service
        .visualize_if(id, || scheduler.is_current(id, generation))
        .await?;
    Ok(Json(outcome.response))
}
