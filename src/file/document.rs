//! Document catalog types and repository.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::QueryBuilder;

use super::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use crate::db::DbPool;
use crate::{Result, SiteError};

/// A catalogued document.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Document {
    /// Unique document ID.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Original upload name, offered as the download name.
    pub file_name: String,
    /// Where the blob is stored.
    pub file_path: String,
    /// Size of the stored blob in bytes.
    pub file_size: i64,
    /// Content type declared at upload.
    pub file_type: String,
    /// Free-form category.
    pub category: Option<String>,
    /// Folder this document is filed under.
    pub folder_id: Option<i64>,
    /// Name of the folder, empty when unfiled.
    pub folder_name: String,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the metadata last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Storage path of the blob.
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.file_path)
    }
}

/// Data for creating a new catalog entry.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Original upload name.
    pub file_name: String,
    /// Where the blob was stored.
    pub file_path: String,
    /// Bytes actually written.
    pub file_size: i64,
    /// Declared content type.
    pub file_type: String,
    /// Free-form category.
    pub category: Option<String>,
    /// Folder to file under.
    pub folder_id: Option<i64>,
}

impl NewDocument {
    /// Create a new NewDocument.
    pub fn new(
        title: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_size: i64,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size,
            file_type: file_type.into(),
            category: None,
            folder_id: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Set the folder.
    pub fn with_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// Check the fields every catalog entry must have.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        if self.file_path.trim().is_empty() {
            return Err(SiteError::Validation("file path is required".to_string()));
        }
        if self.file_type.trim().is_empty() {
            return Err(SiteError::Validation("file type is required".to_string()));
        }
        if self.file_size <= 0 {
            return Err(SiteError::Validation("file is empty".to_string()));
        }
        Ok(())
    }
}

/// Metadata changes for an existing document. Blob content never changes.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New category.
    pub category: Option<Option<String>>,
    /// New folder.
    pub folder_id: Option<Option<i64>>,
}

impl DocumentUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear the category.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    /// Move to a folder, or unfile with `None`.
    pub fn folder_id(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.folder_id.is_none()
    }

    /// Check the fields that are set.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description.as_deref())?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(SiteError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(SiteError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(desc) if desc.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(SiteError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )))
        }
        _ => Ok(()),
    }
}

const SELECT_DOCUMENT: &str = "SELECT d.id, d.title, d.description, d.file_name, d.file_path,
        d.file_size, d.file_type, d.category, d.folder_id,
        COALESCE(f.name, '') AS folder_name, d.created_at, d.updated_at
 FROM documents d
 LEFT JOIN folders f ON f.id = d.folder_id";

const NEWEST_FIRST: &str = "ORDER BY d.created_at DESC, d.id DESC";

/// Repository for the document catalog.
pub struct DocumentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> DocumentRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a catalog entry.
    pub async fn create(&self, doc: &NewDocument) -> Result<Document> {
        doc.validate()?;

        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO documents (title, description, file_name, file_path, file_size,
                                    file_type, category, folder_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(doc.title.trim())
        .bind(&doc.description)
        .bind(&doc.file_name)
        .bind(&doc.file_path)
        .bind(doc.file_size)
        .bind(&doc.file_type)
        .bind(&doc.category)
        .bind(doc.folder_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| SiteError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("document".to_string()))
    }

    /// Get a document by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE d.id = ?");
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(doc)
    }

    /// List all documents, newest first.
    pub async fn list_all(&self) -> Result<Vec<Document>> {
        let sql = format!("{SELECT_DOCUMENT} {NEWEST_FIRST}");
        let docs = sqlx::query_as::<_, Document>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(docs)
    }

    /// List documents in a category, newest first.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE d.category = ? {NEWEST_FIRST}");
        let docs = sqlx::query_as::<_, Document>(&sql)
            .bind(category)
            .fetch_all(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(docs)
    }

    /// List documents filed under a folder, newest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE d.folder_id = ? {NEWEST_FIRST}");
        let docs = sqlx::query_as::<_, Document>(&sql)
            .bind(folder_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(docs)
    }

    /// Update document metadata.
    ///
    /// Returns the updated document, or None if not found.
    pub async fn update(&self, id: i64, update: &DocumentUpdate) -> Result<Option<Document>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }
        update.validate()?;

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE documents SET ");
        let mut separated = query.separated(", ");

        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.trim().to_string());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(ref category) = update.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category.clone());
        }
        if let Some(folder_id) = update.folder_id {
            separated.push("folder_id = ");
            separated.push_bind_unseparated(folder_id);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a catalog entry.
    ///
    /// Returns `false` if the row did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
