//! Shared helpers for the HTTP API tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::http::header::SET_COOKIE;
use axum_test::TestServer;
use school_site::web::handlers::AppState;
use school_site::web::router::create_router;
use school_site::{Config, Database};
use serde_json::json;
use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// A running test app with its own upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub dir: TempDir,
}

impl TestApp {
    /// Directory served under `/uploads`.
    pub fn upload_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding uploaded documents.
    pub fn documents_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("documents")
    }
}

/// Configuration pointing at a temporary upload directory.
pub fn test_config(upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.files.upload_dir = upload_dir.to_string_lossy().into_owned();
    config.files.max_upload_size_mb = 1;
    config.files.max_image_size_mb = 1;
    config.admin.username = ADMIN_USERNAME.to_string();
    config.admin.password = ADMIN_PASSWORD.to_string();
    config.admin.session_secret = "test-secret-key-for-testing-only".to_string();
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(dir.path());
    create_test_app_with(dir, config).await
}

/// Create a test server from an adjusted configuration.
pub async fn create_test_app_with(dir: TempDir, config: Config) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(
        AppState::new(db.clone(), &config.files, &config.admin)
            .expect("Failed to create app state"),
    );
    let router = create_router(app_state, &config.server.cors_origins);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, dir }
}

/// Log in as admin and return the `Cookie` header value.
pub async fn admin_cookie(server: &TestServer) -> String {
    let response = server
        .post("/login")
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        }))
        .await;

    response.assert_status_ok();

    let set_cookie = response.header(SET_COOKIE);
    set_cookie
        .to_str()
        .expect("Set-Cookie is not ASCII")
        .split(';')
        .next()
        .expect("empty Set-Cookie")
        .to_string()
}
