//! Folder handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{FolderRepository, NewFolder};
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, DocumentResponse, FolderResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/folders - List folders with their document counts.
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Folders by name", body = Vec<FolderResponse>)
    )
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = FolderRepository::new(state.db.pool()).list().await?;
    Ok(Json(ApiResponse::new(
        folders.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/folders/:id/documents - List the documents in a folder.
#[utoipa::path(
    get,
    path = "/api/folders/{id}/documents",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<DocumentResponse>),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn list_folder_documents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<DocumentResponse>>>, ApiError> {
    FolderRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("folder not found"))?;

    let docs = state.document_service().list_by_folder(id).await?;
    Ok(Json(ApiResponse::new(
        docs.into_iter().map(Into::into).collect(),
    )))
}

/// POST /admin/api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/admin/api/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 401, description = "Not logged in"),
        (status = 422, description = "Invalid or duplicate name")
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let mut folder = NewFolder::new(req.name);
    if let Some(description) = req.description.filter(|d| !d.trim().is_empty()) {
        folder = folder.with_description(description);
    }
    if let Some(icon) = req.icon {
        folder = folder.with_icon(icon);
    }

    let folder = FolderRepository::new(state.db.pool()).create(&folder).await?;
    tracing::info!("Created folder {} ({})", folder.id, folder.name);

    Ok((StatusCode::CREATED, Json(ApiResponse::new(folder.into()))))
}

/// DELETE /admin/api/folders/:id - Delete a folder.
///
/// Its documents are kept and become unfiled.
#[utoipa::path(
    delete,
    path = "/admin/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 204, description = "Folder deleted"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !FolderRepository::new(state.db.pool()).delete(id).await? {
        return Err(ApiError::not_found("folder not found"));
    }

    tracing::info!("Deleted folder {}", id);
    Ok(StatusCode::NO_CONTENT)
}
