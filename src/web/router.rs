//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    create_folder, create_news, delete_document, delete_folder, delete_news, download_document,
    get_document, get_news, list_contacts, list_documents, list_folder_documents, list_folders,
    list_news, login, logout, submit_contact, update_document, update_news, upload_documents,
    AppState,
};
use super::middleware::{create_cors_layer, session_layer, AdminSession};
use super::openapi::ApiDoc;

/// Room for the text fields of a news form on top of the image limit.
const NEWS_FORM_TEXT_BYTES: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_bytes = app_state.max_upload_bytes;
    let news_bytes = app_state.max_image_bytes.saturating_add(NEWS_FORM_TEXT_BYTES);

    let public_api = Router::new()
        .route("/news", get(list_news))
        .route("/news/:id", get(get_news))
        .route("/contact", post(submit_contact))
        .route("/documents", get(list_documents))
        .route("/documents/:id", get(get_document))
        .route("/documents/:id/download", get(download_document))
        .route("/folders", get(list_folders))
        .route("/folders/:id/documents", get(list_folder_documents))
        .route("/openapi.json", get(openapi_json));

    let admin_api = Router::new()
        .route("/contacts", get(list_contacts))
        .route(
            "/news",
            post(create_news).layer(DefaultBodyLimit::max(news_bytes)),
        )
        .route(
            "/news/:id",
            get(get_news)
                .put(update_news)
                .delete(delete_news)
                .layer(DefaultBodyLimit::max(news_bytes)),
        )
        .route(
            "/documents",
            get(list_documents)
                .post(upload_documents)
                .layer(DefaultBodyLimit::max(upload_bytes)),
        )
        .route(
            "/documents/:id",
            get(get_document)
                .patch(update_document)
                .delete(delete_document),
        )
        .route("/folders", get(list_folders).post(create_folder))
        .route("/folders/:id", delete(delete_folder))
        .route("/folders/:id/documents", get(list_folder_documents));

    // Every admin route requires a valid session cookie.
    let admin = Router::new()
        .route("/logout", post(logout))
        .nest("/api", admin_api)
        .route_layer(middleware::from_extractor::<AdminSession>());

    let session = app_state.session.clone();
    let uploads = ServeDir::new(&app_state.upload_dir);

    Router::new()
        .route("/login", post(login))
        .route("/health", get(health_check))
        .nest("/api", public_api)
        .nest("/admin", admin)
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = session.clone();
                    session_layer(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
