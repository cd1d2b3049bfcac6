use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use uuid::Uuid;

use crate::services::WorkflowService;
use crate::utils::ApiError;
use crate::workflow::EvaluationMetrics;

pub async fn evaluation_handler(
    Extension(service): Extension<Arc<WorkflowService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationMetrics>, ApiError> {
    let metrics = service.evaluate(id).await?;
    Ok(Json(metrics))
}
