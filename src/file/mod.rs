//! Document management for the school site.
//!
//! This module provides the document library:
//! - Storage naming rules (`naming`)
//! - Blob storage on the local filesystem (`storage`)
//! - Document catalog and folder taxonomy
//! - Upload, download and delete coordination (`service`)

mod document;
mod folder;
pub mod naming;
mod service;
mod storage;

pub use document::{Document, DocumentRepository, DocumentUpdate, NewDocument};
pub use folder::{Folder, FolderRepository, NewFolder, DEFAULT_FOLDER_ICON};
pub use service::{
    BatchOutcome, BatchUpload, DocumentService, Download, UploadFailure, UploadMeta,
    UploadSource,
};
pub use storage::{BlobStore, StoredBlob};

/// Maximum length for a document title (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for document/folder descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length for folder names (in characters).
pub const MAX_FOLDER_NAME_LENGTH: usize = 100;

/// Maximum length of the sanitized part of a stored name (in bytes).
pub const MAX_STORED_NAME_BYTES: usize = 200;

/// Content type used when neither the client nor the extension tells us.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
