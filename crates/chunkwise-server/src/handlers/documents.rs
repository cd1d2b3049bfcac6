use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::DocumentStore;
use crate::utils::ApiError;

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub document_id: String,
    pub title: String,
}

pub async fn upload_document_handler(
    Extension(documents): Extension<Arc<DocumentStore>>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>, ApiError> {
    let document = documents.add(&request.title, &request.content)?;
    info!(
        "Stored document {} ({} bytes)",
        document.title,
        document.content.len()
    );
    Ok(Json(UploadDocumentResponse {
        document_id: document.id,
        title: document.title,
    }))
}

pub async fn list_documents_handler(
    Extension(documents): Extension<Arc<DocumentStore>>,
) -> Json<Vec<String>> {
    Json(documents.titles())
}
