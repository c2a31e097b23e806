//! Document handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::{BatchOutcome, FolderRepository, UploadMeta};
use crate::web::dto::{
    ApiResponse, BatchUploadResponse, DocumentListQuery, DocumentResponse, UpdateDocumentRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::form::FormData;
use crate::web::handlers::AppState;

/// Multipart field carrying the uploaded files.
pub const DOCUMENT_FIELD: &str = "document";

/// Build a Content-Disposition value for a download.
///
/// Control characters are dropped and quotes/backslashes replaced in the
/// plain `filename`; non-ASCII names also get an RFC 5987 `filename*`.
pub fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

async fn ensure_folder(state: &AppState, folder_id: Option<i64>) -> Result<(), ApiError> {
    if let Some(id) = folder_id {
        if FolderRepository::new(state.db.pool())
            .get_by_id(id)
            .await?
            .is_none()
        {
            return Err(ApiError::unprocessable(format!("folder {id} does not exist")));
        }
    }
    Ok(())
}

/// GET /api/documents - List documents, newest first.
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<DocumentResponse>)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponse>>>, ApiError> {
    let docs = state
        .document_service()
        .list(query.category.as_deref())
        .await?;

    tracing::debug!("Listing {} documents", docs.len());
    Ok(Json(ApiResponse::new(
        docs.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/documents/:id - Get document metadata.
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document metadata", body = DocumentResponse),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let doc = state.document_service().get(id).await?;
    Ok(Json(ApiResponse::new(doc.into())))
}

/// GET /api/documents/:id/download - Download a document.
///
/// Content-Length comes from the catalog record.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    tag = "documents",
    params(
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let download = state.document_service().download(id).await?;

    let body = Body::from_stream(ReaderStream::new(download.file));

    Response::builder()
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.file_name),
        )
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to send file")
        })
}

/// POST /admin/api/documents - Upload one or more documents.
///
/// Multipart fields: `document` (one or more files), `title`,
/// `description`, `category`, `folder_id`.
#[utoipa::path(
    post,
    path = "/admin/api/documents",
    tag = "documents",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "All files stored", body = BatchUploadResponse),
        (status = 207, description = "Some files stored", body = BatchUploadResponse),
        (status = 401, description = "Not logged in"),
        (status = 413, description = "Upload too large"),
        (status = 422, description = "No file stored", body = BatchUploadResponse)
    )
)]
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<BatchUploadResponse>>), ApiError> {
    let mut form = FormData::read(multipart).await?;

    let folder_id = form.optional_id("folder_id")?;
    let files = form.take_files(DOCUMENT_FIELD);
    if files.is_empty() {
        return Err(ApiError::unprocessable("No file uploaded"));
    }
    ensure_folder(&state, folder_id).await?;

    let meta = UploadMeta::new(form.text("title"))
        .with_description(form.text("description"))
        .with_category(form.text("category"))
        .with_folder(folder_id);
    let sources = files.into_iter().map(|f| f.into_source()).collect();

    let batch = state.document_service().upload_many(&meta, sources).await?;

    let status = match batch.outcome() {
        BatchOutcome::AllSucceeded => StatusCode::CREATED,
        BatchOutcome::Partial => StatusCode::MULTI_STATUS,
        BatchOutcome::AllFailed => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok((status, Json(ApiResponse::new(batch.into()))))
}

/// PATCH /admin/api/documents/:id - Update document metadata.
#[utoipa::path(
    patch,
    path = "/admin/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = i64, Path, description = "Document ID")
    ),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Updated document", body = DocumentResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateDocumentRequest>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    if let Some(folder_id) = req.folder_id {
        ensure_folder(&state, folder_id).await?;
    }

    let doc = state
        .document_service()
        .update_metadata(id, &req.into_update())
        .await?;

    Ok(Json(ApiResponse::new(doc.into())))
}

/// DELETE /admin/api/documents/:id - Delete a document and its file.
#[utoipa::path(
    delete,
    path = "/admin/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.document_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
