use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::services::{DeployRequest, DeployService};
use crate::utils::ApiError;
use crate::workflow::WorkflowStore;

pub async fn deploy_handler(
    Extension(store): Extension<Arc<WorkflowStore>>,
    Extension(deploy_service): Extension<Arc<DeployService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<DeployRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let workflow = store
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No workflow with id {}", id)))?;
    if workflow.chunking_strategy.is_none() {
        return Err(ApiError::Validation(
            "Configure a chunker before deploying this workflow".to_string(),
        ));
    }

    let stream = deploy_service
        .start(workflow, request)
        .map(|event| Ok(event.into_sse()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
