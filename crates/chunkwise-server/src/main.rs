use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use chunkwise_server::catalog::ChunkerCatalog;
use chunkwise_server::config::{ComputeMode, Settings};
use chunkwise_server::document::DocumentStore;
use chunkwise_server::handlers;
use chunkwise_server::services::{
    ComputeBackend, DeployService, HttpComputeBackend, LocalComputeBackend, VisualizeScheduler,
    WorkflowService,
};
use chunkwise_server::workflow::WorkflowStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,chunkwise_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("🚀 Starting chunkwise gateway...");

    // Load configuration
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // In-memory state
    let store = Arc::new(WorkflowStore::new());
    let documents = Arc::new(DocumentStore::new(settings.documents.max_bytes));
    let catalog = Arc::new(ChunkerCatalog::builtin());

    // Compute backend, picked by configuration
    let backend: Arc<dyn ComputeBackend> = match settings.compute.mode {
        ComputeMode::Http => Arc::new(HttpComputeBackend::new(settings.compute.clone())),
        ComputeMode::Local => Arc::new(LocalComputeBackend::new()),
    };
    info!("✅ Compute backend ready ({:?})", settings.compute.mode);

    // Services
    let workflow_service = Arc::new(WorkflowService::new(
        store.clone(),
        documents.clone(),
        catalog.clone(),
        backend,
    ));
    let scheduler = Arc::new(VisualizeScheduler::new(
        workflow_service.clone(),
        Duration::from_millis(settings.pipeline.visualize_debounce_ms),
    ));
    let deploy_service = Arc::new(DeployService::new(settings.deploy.clone()));

    // Build router
    let app = handlers::build_router(
        store,
        documents,
        catalog,
        workflow_service,
        scheduler,
        deploy_service,
    );

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
