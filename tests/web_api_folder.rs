//! Web API Folder Tests
//!
//! Integration tests for folder endpoints.

mod common;

use axum::http::header::COOKIE;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{admin_cookie, create_test_app};
use school_site::file::{FolderRepository, NewFolder};
use serde_json::{json, Value};

#[tokio::test]
async fn test_list_folders_empty() {
    let app = create_test_app().await;

    let response = app.server.get("/api/folders").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].is_array());
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_folder() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .post("/admin/api/folders")
        .add_header(COOKIE, cookie)
        .json(&json!({
            "name": "  Forms  ",
            "description": "Enrolment and permission forms",
            "icon": "file-text"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Forms");
    assert_eq!(body["data"]["icon"], "file-text");
    assert_eq!(body["data"]["document_count"], 0);
}

#[tokio::test]
async fn test_create_folder_default_icon() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .post("/admin/api/folders")
        .add_header(COOKIE, cookie)
        .json(&json!({ "name": "Reports" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["icon"], "folder");
    assert_eq!(body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn test_create_folder_duplicate_name() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    for expected in [StatusCode::CREATED, StatusCode::UNPROCESSABLE_ENTITY] {
        let response = app
            .server
            .post("/admin/api/folders")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "name": "Forms" }))
            .await;
        response.assert_status(expected);
    }
}

#[tokio::test]
async fn test_create_folder_blank_name() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let response = app
        .server
        .post("/admin/api/folders")
        .add_header(COOKIE, cookie)
        .json(&json!({ "name": "   " }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["name"].is_array());
}

#[tokio::test]
async fn test_folder_documents_and_counts() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let folder = FolderRepository::new(app.db.pool())
        .create(&NewFolder::new("Timetables"))
        .await
        .unwrap();

    let form = MultipartForm::new()
        .add_text("folder_id", folder.id.to_string())
        .add_part(
            "document",
            Part::bytes(b"year 7".to_vec()).file_name("year7.pdf"),
        );
    app.server
        .post("/admin/api/documents")
        .add_header(COOKIE, cookie.clone())
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.get("/api/folders").await;
    let body: Value = response.json();
    assert_eq!(body["data"][0]["document_count"], 1);

    let response = app
        .server
        .get(&format!("/api/folders/{}/documents", folder.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["folder_name"], "Timetables");

    let response = app.server.get("/api/folders/999/documents").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_folder_keeps_documents() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.server).await;

    let folder = FolderRepository::new(app.db.pool())
        .create(&NewFolder::new("Old"))
        .await
        .unwrap();

    let form = MultipartForm::new()
        .add_text("folder_id", folder.id.to_string())
        .add_part("document", Part::bytes(b"kept".to_vec()).file_name("kept.txt"));
    app.server
        .post("/admin/api/documents")
        .add_header(COOKIE, cookie.clone())
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .delete(&format!("/admin/api/folders/{}", folder.id))
        .add_header(COOKIE, cookie.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get("/api/documents").await;
    let body: Value = response.json();
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["folder_id"], Value::Null);
    assert_eq!(docs[0]["folder_name"], "");

    let response = app
        .server
        .delete(&format!("/admin/api/folders/{}", folder.id))
        .add_header(COOKIE, cookie)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
