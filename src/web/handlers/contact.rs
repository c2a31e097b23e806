//! Contact form handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::contact::ContactRepository;
use crate::web::dto::{ApiResponse, ContactRequest, ContactResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/contact - Submit the contact form.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactResponse),
        (status = 422, description = "Validation error")
    )
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContactResponse>>), ApiError> {
    let entry = ContactRepository::new(state.db.pool())
        .create(&req.into_contact())
        .await?;

    tracing::info!("Contact message {} received", entry.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::new(entry.into()))))
}

/// GET /admin/api/contacts - List contact messages.
#[utoipa::path(
    get,
    path = "/admin/api/contacts",
    tag = "contact",
    responses(
        (status = 200, description = "Messages, newest first", body = Vec<ContactResponse>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ContactResponse>>>, ApiError> {
    let entries = ContactRepository::new(state.db.pool()).list().await?;
    Ok(Json(ApiResponse::new(
        entries.into_iter().map(Into::into).collect(),
    )))
}
