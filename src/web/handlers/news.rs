//! News handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::fs::File;

use crate::file::UploadSource;
use crate::news::ArticleForm;
use crate::web::dto::{ApiResponse, NewsResponse};
use crate::web::error::ApiError;
use crate::web::handlers::form::FormData;
use crate::web::handlers::AppState;

/// Multipart field carrying an uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Split a news form into its text part and the uploaded image, if any.
async fn read_article(
    multipart: Multipart,
) -> Result<(ArticleForm, Option<UploadSource<File>>), ApiError> {
    let mut form = FormData::read(multipart).await?;

    let image = form.take_files(IMAGE_FIELD).into_iter().next();
    let article = ArticleForm::new(form.text("title"), form.text("content"))
        .with_image_url(form.text("image_url"));

    Ok((article, image.map(|f| f.into_source())))
}

/// GET /api/news - List articles, newest first.
#[utoipa::path(
    get,
    path = "/api/news",
    tag = "news",
    responses(
        (status = 200, description = "Articles, newest first", body = Vec<NewsResponse>)
    )
)]
pub async fn list_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NewsResponse>>>, ApiError> {
    let articles = state.news_service().list().await?;
    Ok(Json(ApiResponse::new(
        articles.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/news/:id - Get one article.
#[utoipa::path(
    get,
    path = "/api/news/{id}",
    tag = "news",
    params(
        ("id" = i64, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article", body = NewsResponse),
        (status = 404, description = "Article not found")
    )
)]
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NewsResponse>>, ApiError> {
    let article = state.news_service().get(id).await?;
    Ok(Json(ApiResponse::new(article.into())))
}

/// POST /admin/api/news - Publish an article.
///
/// Multipart fields: `title`, `content`, `image_url`, and an optional
/// `image` file that takes precedence over `image_url`.
#[utoipa::path(
    post,
    path = "/admin/api/news",
    tag = "news",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Article created", body = NewsResponse),
        (status = 401, description = "Not logged in"),
        (status = 413, description = "Image too large"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_news(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<NewsResponse>>), ApiError> {
    let (form, image) = read_article(multipart).await?;
    let article = state.news_service().create(&form, image).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(article.into()))))
}

/// PUT /admin/api/news/:id - Edit an article.
///
/// A new `image` file replaces the image. Otherwise an `image_url` that
/// differs from the stored one replaces it, and an empty one clears it.
#[utoipa::path(
    put,
    path = "/admin/api/news/{id}",
    tag = "news",
    params(
        ("id" = i64, Path, description = "Article ID")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Article updated", body = NewsResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Article not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_news(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<NewsResponse>>, ApiError> {
    let (form, image) = read_article(multipart).await?;
    let article = state.news_service().update(id, &form, image).await?;

    Ok(Json(ApiResponse::new(article.into())))
}

/// DELETE /admin/api/news/:id - Delete an article.
#[utoipa::path(
    delete,
    path = "/admin/api/news/{id}",
    tag = "news",
    params(
        ("id" = i64, Path, description = "Article ID")
    ),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Article not found")
    )
)]
pub async fn delete_news(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.news_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
