use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::catalog::{Chunker, ChunkerCatalog};

pub async fn list_configs_handler(
    Extension(catalog): Extension<Arc<ChunkerCatalog>>,
) -> Json<Vec<Chunker>> {
    Json(catalog.list().to_vec())
}
