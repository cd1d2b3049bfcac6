pub mod configs;
pub mod deploy;
pub mod documents;
pub mod evaluation;
pub mod health;
pub mod visualization;
pub mod workflows;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::catalog::ChunkerCatalog;
use crate::document::DocumentStore;
use crate::services::{DeployService, VisualizeScheduler, WorkflowService};
use crate::workflow::WorkflowStore;

pub fn build_router(
    store: Arc<WorkflowStore>,
    documents: Arc<DocumentStore>,
    catalog: Arc<ChunkerCatalog>,
    workflow_service: Arc<WorkflowService>,
    scheduler: Arc<VisualizeScheduler>,
    deploy_service: Arc<DeployService>,
) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/workflows",
            get(workflows::list_workflows_handler).post(workflows::create_workflow_handler),
        )
        .route(
            "/workflows/{id}",
            put(workflows::update_workflow_handler).delete(workflows::delete_workflow_handler),
        )
        .route("/configs", get(configs::list_configs_handler))
        .route(
            "/documents",
            get(documents::list_documents_handler).post(documents::upload_document_handler),
        )
        .route(
            "/workflows/{id}/visualization",
            post(visualization::visualize_handler),
        )
        .route(
            "/workflows/{id}/evaluation",
            get(evaluation::evaluation_handler).post(evaluation::evaluation_handler),
        )
        .route("/workflows/{id}/deploy", post(deploy::deploy_handler));

    Router::new()
        .nest("/api", api_routes)
        .layer(Extension(store))
        .layer(Extension(documents))
        .layer(Extension(catalog))
        .layer(Extension(workflow_service))
        .layer(Extension(scheduler))
        .layer(Extension(deploy_service))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CatchPanicLayer::new())
}
