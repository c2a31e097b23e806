//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::contact::ContactEntry;
use crate::file::{BatchUpload, Document, Folder, UploadFailure};
use crate::news::{stored_value, NewsArticle};
use crate::web::error::ApiError;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Document metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Name the file was uploaded with.
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub category: Option<String>,
    pub folder_id: Option<i64>,
    /// Empty when the document is not filed.
    pub folder_name: String,
    pub download_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            download_url: format!("/api/documents/{}/download", doc.id),
            id: doc.id,
            title: doc.title,
            description: doc.description,
            file_name: doc.file_name,
            file_size: doc.file_size,
            file_type: doc.file_type,
            category: doc.category,
            folder_id: doc.folder_id,
            folder_name: doc.folder_name,
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

/// A file in a batch upload that was not stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadErrorResponse {
    pub file_name: String,
    pub message: String,
}

impl From<UploadFailure> for UploadErrorResponse {
    fn from(failure: UploadFailure) -> Self {
        let error = ApiError::from(failure.error);
        Self {
            file_name: failure.file_name,
            message: error.message().to_string(),
        }
    }
}

/// Result of a (possibly partial) batch upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchUploadResponse {
    /// Number of files stored.
    pub success: usize,
    /// Number of files rejected.
    pub failed: usize,
    pub documents: Vec<DocumentResponse>,
    pub errors: Vec<UploadErrorResponse>,
}

impl From<BatchUpload> for BatchUploadResponse {
    fn from(batch: BatchUpload) -> Self {
        Self {
            success: batch.documents.len(),
            failed: batch.failures.len(),
            documents: batch.documents.into_iter().map(Into::into).collect(),
            errors: batch.failures.into_iter().map(Into::into).collect(),
        }
    }
}

/// Folder with its document count.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub document_count: i64,
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            description: folder.description,
            icon: folder.icon,
            document_count: folder.document_count,
            created_at: folder.created_at.to_rfc3339(),
        }
    }
}

/// News article.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewsResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// `/uploads/...` for uploaded images, the URL as given otherwise,
    /// empty when there is no image.
    pub image_url: String,
    pub created_at: String,
}

impl From<NewsArticle> for NewsResponse {
    fn from(article: NewsArticle) -> Self {
        Self {
            image_url: stored_value(article.image.as_ref()),
            id: article.id,
            title: article.title,
            content: article.content,
            created_at: article.created_at.to_rfc3339(),
        }
    }
}

/// Contact form submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: String,
}

impl From<ContactEntry> for ContactResponse {
    fn from(entry: ContactEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            phone: entry.phone,
            message: entry.message,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Admin session info returned on login.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub username: String,
    /// Session expiry (RFC 3339).
    pub expires_at: String,
}
