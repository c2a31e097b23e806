//! Web API News Tests
//!
//! Integration tests for news articles and their images.

mod common;

use axum::http::header::COOKIE;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{admin_cookie, create_test_app, TestApp};
use serde_json::Value;

fn png(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
        .file_name(name.to_string())
        .mime_type("image/png")
}

fn article_form(title: &str, content: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("content", content.to_string())
}

async fn create_article(app: &TestApp, cookie: &str, form: MultipartForm) -> Value {
    let response = app
        .server
        .post("/admin/api/news")
        .add_header(COOKIE, cookie.to_string())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["data"].clone()
}

async fn update_article(app: &TestApp, cookie: &str, id: i64, form: MultipartForm) -> Value {
    let response = app
        .server
        .put(&format!("/admin/api/news/{}", id))
        .add_header(COOKIE, cookie.to_string())
        .multipart(form)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["data"].clone()
}

fn local_file(app: &TestApp, image_url: &str) -> std::path::PathBuf {
    app.upload_dir()
        .join(image_url.strip_prefix("/uploads/").unwrap())
}

#[tokio::test]
async fn test_create_with_uploaded_image() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Sports day", "Results are in")
            .add_text("image_url", "https://example.org/ignored.png")
            .add_part("image", png("track photo.png")),
    )
    .await;

    let image_url = article["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with("_track_photo.png"));
    assert!(local_file(&app, image_url).exists());

    let response = app.server.get(image_url).await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_with_external_url() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Concert", "Tonight")
            .add_text("image_url", "https://example.org/choir.jpg"),
    )
    .await;

    assert_eq!(article["image_url"], "https://example.org/choir.jpg");
}

#[tokio::test]
async fn test_create_without_image() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(&app, &cookie, article_form("Holiday", "Closed")).await;

    assert_eq!(article["image_url"], "");
}

#[tokio::test]
async fn test_create_rejects_bad_image_type() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .post("/admin/api/news")
        .add_header(COOKIE, cookie)
        .multipart(
            article_form("Title", "Body").add_part(
                "image",
                Part::bytes(b"MZ".to_vec()).file_name("virus.exe"),
            ),
        )
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(std::fs::read_dir(app.upload_dir()).unwrap().count(), 0);

    let body: Value = app.server.get("/api/news").await.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_requires_title_and_content() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .post("/admin/api/news")
        .add_header(COOKIE, cookie)
        .multipart(article_form("", "Body").add_part("image", png("a.png")))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(std::fs::read_dir(app.upload_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_update_same_url_keeps_image() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Old", "Body").add_part("image", png("a.png")),
    )
    .await;
    let id = article["id"].as_i64().unwrap();
    let image_url = article["image_url"].as_str().unwrap().to_string();

    let updated = update_article(
        &app,
        &cookie,
        id,
        article_form("New", "Body").add_text("image_url", image_url.clone()),
    )
    .await;

    assert_eq!(updated["title"], "New");
    assert_eq!(updated["image_url"], image_url);
}

#[tokio::test]
async fn test_update_empty_url_clears_image() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Old", "Body").add_text("image_url", "https://example.org/a.png"),
    )
    .await;
    let id = article["id"].as_i64().unwrap();

    let updated = update_article(
        &app,
        &cookie,
        id,
        article_form("Old", "Body").add_text("image_url", ""),
    )
    .await;

    assert_eq!(updated["image_url"], "");
}

#[tokio::test]
async fn test_update_new_upload_wins() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Old", "Body").add_text("image_url", "https://example.org/a.png"),
    )
    .await;
    let id = article["id"].as_i64().unwrap();

    let updated = update_article(
        &app,
        &cookie,
        id,
        article_form("Old", "Body")
            .add_text("image_url", "https://example.org/b.png")
            .add_part("image", png("new.png")),
    )
    .await;

    let image_url = updated["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with("_new.png"));
    assert!(local_file(&app, image_url).exists());
}

#[tokio::test]
async fn test_update_unknown_article() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .put("/admin/api/news/999")
        .add_header(COOKIE, cookie)
        .multipart(article_form("Title", "Body").add_part("image", png("a.png")))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(std::fs::read_dir(app.upload_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_delete_removes_uploaded_image() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let article = create_article(
        &app,
        &cookie,
        article_form("Bye", "Body").add_part("image", png("a.png")),
    )
    .await;
    let id = article["id"].as_i64().unwrap();
    let path = local_file(&app, article["image_url"].as_str().unwrap());
    assert!(path.exists());

    let response = app
        .server
        .delete(&format!("/admin/api/news/{}", id))
        .add_header(COOKIE, cookie.clone())
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(!path.exists());

    let response = app.server.get(&format!("/api/news/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_and_get_news() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let first = create_article(&app, &cookie, article_form("One", "1")).await;
    let second = create_article(&app, &cookie, article_form("Two", "2")).await;

    let body: Value = app.server.get("/api/news").await.json();
    let articles = body["data"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["id"], second["id"]);
    assert_eq!(articles[1]["id"], first["id"]);

    let response = app
        .server
        .get(&format!("/api/news/{}", first["id"]))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "One");
}
