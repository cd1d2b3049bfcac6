use parking_lot::RwLock;
use rand::Rng;

use crate::utils::{normalize_document, ApiError};

/// A text document held in memory for chunking and evaluation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// In-memory document collection. Uploads are normalized and validated
/// (plain `.txt` only, bounded size); re-uploading a title replaces the
/// earlier document.
pub struct DocumentStore {
    max_bytes: usize,
    documents: RwLock<Vec<StoredDocument>>,
}

impl DocumentStore {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, title: &str, content: &str) -> Result<StoredDocument, ApiError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation(
                "Document title must not be empty".to_string(),
            ));
        }
        if !title.to_ascii_lowercase().ends_with(".txt") {
            return Err(ApiError::Validation(
                "Only plain .txt documents are supported".to_string(),
            ));
        }
        if content.len() > self.max_bytes {
            return Err(ApiError::Validation(format!(
                "Document exceeds the {}KB limit",
                self.max_bytes / 1024
            )));
        }
        if content.trim().is_empty() {
            return Err(ApiError::Validation(
                "Document has no text content".to_string(),
            ));
        }
        if content.contains('\u{0}') {
            return Err(ApiError::Validation(
                "Document does not look like plain text".to_string(),
            ));
        }

        let document = StoredDocument {
            id: format!("{:08x}.txt", rand::rng().random::<u32>()),
            title: title.to_string(),
            content: normalize_document(content),
        };

        let mut documents = self.documents.write();
        documents.retain(|d| d.title != document.title);
        documents.push(document.clone());
        Ok(document)
    }

    pub fn titles(&self) -> Vec<String> {
        self.documents.read().iter().map(|d| d.title.clone()).collect()
    }

    pub fn find_by_title(&self, title: &str) -> Option<StoredDocument> {
        self.documents
            .read()
            .iter()
            .find(|d| d.title == title)
            .cloned()
    }
}
