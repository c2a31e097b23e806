//! Folder taxonomy for documents.
//!
//! Folders are a flat list of named groups. Deleting a folder never deletes
//! its documents; their `folder_id` is cleared by the foreign key.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MAX_DESCRIPTION_LENGTH, MAX_FOLDER_NAME_LENGTH};
use crate::db::DbPool;
use crate::{Result, SiteError};

/// Icon used when none is given.
pub const DEFAULT_FOLDER_ICON: &str = "folder";

/// A document folder.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name (unique).
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Icon identifier shown by the frontend.
    pub icon: String,
    /// Number of documents currently filed here.
    pub document_count: i64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Icon identifier.
    pub icon: String,
}

impl NewFolder {
    /// Create a new folder with the default icon.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: DEFAULT_FOLDER_ICON.to_string(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the icon. An empty icon keeps the default.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        if !icon.trim().is_empty() {
            self.icon = icon;
        }
        self
    }

    /// Check the caller-supplied fields.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SiteError::Validation("folder name is required".to_string()));
        }
        if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
            return Err(SiteError::Validation(format!(
                "folder name must be at most {MAX_FOLDER_NAME_LENGTH} characters"
            )));
        }
        if let Some(ref desc) = self.description {
            if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(SiteError::Validation(format!(
                    "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }
}

const SELECT_FOLDER: &str = "SELECT f.id, f.name, f.description, f.icon, f.created_at,
        (SELECT COUNT(*) FROM documents d WHERE d.folder_id = f.id) AS document_count
 FROM folders f";

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    ///
    /// A duplicate name is reported as a validation error.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        folder.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO folders (name, description, icon, created_at)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(folder.name.trim())
        .bind(&folder.description)
        .bind(&folder.icon)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => SiteError::Validation(
                format!("folder '{}' already exists", folder.name.trim()),
            ),
            e => SiteError::Database(e.to_string()),
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let sql = format!("{SELECT_FOLDER} WHERE f.id = ?");
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List all folders ordered by name.
    pub async fn list(&self) -> Result<Vec<Folder>> {
        let sql = format!("{SELECT_FOLDER} ORDER BY f.name COLLATE NOCASE, f.id");
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Delete a folder. Its documents become unfiled.
    ///
    /// Returns `false` if the folder did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
