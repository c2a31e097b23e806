//! Admin login and logout.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::web::dto::{ApiResponse, LoginRequest, SessionResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AdminSession, SessionState};

/// POST /login - Start an admin session.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    if !state.session.check_credentials(&req.username, &req.password) {
        tracing::warn!(username = %req.username, "Failed admin login");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let (token, claims) = state.session.issue(&req.username)?;
    tracing::info!(username = %claims.sub, "Admin logged in");

    let response = SessionResponse {
        username: claims.sub.clone(),
        expires_at: claims.expires_at().to_rfc3339(),
    };

    Ok((
        jar.add(SessionState::session_cookie(token)),
        Json(ApiResponse::new(response)),
    ))
}

/// POST /admin/logout - End the admin session.
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session cookie cleared"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn logout(AdminSession(claims): AdminSession, jar: CookieJar) -> (CookieJar, StatusCode) {
    tracing::info!(username = %claims.sub, "Admin logged out");
    (jar.remove(SessionState::removal_cookie()), StatusCode::NO_CONTENT)
}
