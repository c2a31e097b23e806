//! Error types for the school site backend.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Common error type for the site.
#[derive(Error, Debug)]
pub enum SiteError {
    /// Database error.
    ///
    /// Errors from sqlx are automatically converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error outside of the blob store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing, opening or removing a managed blob failed.
    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        /// Path the blob store was operating on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SiteError {
    /// Create a storage error for the given path.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Path a storage error refers to.
    pub fn storage_path(&self) -> Option<&Path> {
        match self {
            SiteError::Storage { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// Whether this error is an exclusive-create collision on a blob name.
    pub fn is_name_collision(&self) -> bool {
        matches!(
            self,
            SiteError::Storage { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists
        )
    }
}

impl From<sqlx::Error> for SiteError {
    fn from(e: sqlx::Error) -> Self {
        SiteError::Database(e.to_string())
    }
}

/// Result type alias for site operations.
pub type Result<T> = std::result::Result<T, SiteError>;
