//! API handlers.

pub mod auth;
pub mod contact;
pub mod document;
pub mod folder;
pub mod form;
pub mod news;

pub use auth::*;
pub use contact::*;
pub use document::*;
pub use folder::*;
pub use news::*;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AdminConfig, FilesConfig};
use crate::file::{BlobStore, DocumentService};
use crate::news::NewsService;
use crate::{Database, Result};

use super::middleware::SessionState;

/// Shared state for all handlers.
pub struct AppState {
    /// Database.
    pub db: Database,
    /// Store for uploaded documents.
    pub documents: BlobStore,
    /// Store for news images, served under `/uploads`.
    pub images: BlobStore,
    /// Admin session keys and credentials.
    pub session: Arc<SessionState>,
    /// Directory served under `/uploads`.
    pub upload_dir: PathBuf,
    /// Largest accepted document upload request, in bytes.
    pub max_upload_bytes: usize,
    /// Largest accepted news image, in bytes.
    pub max_image_bytes: usize,
}

impl AppState {
    /// Create the application state.
    pub fn new(db: Database, files: &FilesConfig, admin: &AdminConfig) -> Result<Self> {
        Ok(Self {
            db,
            documents: BlobStore::new(files.documents_dir()),
            images: BlobStore::new(files.images_dir()),
            session: Arc::new(SessionState::from_config(admin)?),
            upload_dir: PathBuf::from(&files.upload_dir),
            max_upload_bytes: files.max_upload_bytes(),
            max_image_bytes: files.max_image_bytes(),
        })
    }

    /// Upload coordinator over the document store.
    pub fn document_service(&self) -> DocumentService<'_> {
        DocumentService::new(&self.db, &self.documents)
    }

    /// News service over the image store.
    pub fn news_service(&self) -> NewsService<'_> {
        NewsService::new(&self.db, &self.images)
    }
}
