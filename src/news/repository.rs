//! News article types and repository.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::image::{stored_value, ImageRef};
use super::{MAX_CONTENT_LENGTH, MAX_NEWS_TITLE_LENGTH};
use crate::db::DbPool;
use crate::{Result, SiteError};

/// A news article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    /// Unique article ID.
    pub id: i64,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Attached image.
    #[serde(rename = "image_url", serialize_with = "serialize_image")]
    pub image: Option<ImageRef>,
    /// When the article was published.
    pub created_at: DateTime<Utc>,
}

fn serialize_image<S: Serializer>(image: &Option<ImageRef>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&stored_value(image.as_ref()))
}

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: i64,
    title: String,
    content: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl From<NewsRow> for NewsArticle {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            image: ImageRef::from_stored(&row.image_url),
            created_at: row.created_at,
        }
    }
}

/// Article fields written on create and update.
#[derive(Debug, Clone)]
pub struct ArticleData {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Attached image.
    pub image: Option<ImageRef>,
}

impl ArticleData {
    /// Create article data without an image.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
        }
    }

    /// Set the image.
    pub fn with_image(mut self, image: Option<ImageRef>) -> Self {
        self.image = image;
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        validate_text(&self.title, &self.content)
    }
}

/// Check the title and body of an article.
pub fn validate_text(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(SiteError::Validation(
            "title and content are required".to_string(),
        ));
    }
    if title.chars().count() > MAX_NEWS_TITLE_LENGTH {
        return Err(SiteError::Validation(format!(
            "title must be at most {MAX_NEWS_TITLE_LENGTH} characters"
        )));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(SiteError::Validation(format!(
            "content must be at most {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

const SELECT_NEWS: &str =
    "SELECT id, title, content, COALESCE(image_url, '') AS image_url, created_at FROM news";

/// Repository for news articles.
pub struct NewsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> NewsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert an article.
    pub async fn create(&self, data: &ArticleData) -> Result<NewsArticle> {
        data.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO news (title, content, image_url, created_at)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(data.title.trim())
        .bind(data.content.trim())
        .bind(stored_value(data.image.as_ref()))
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| SiteError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("news article".to_string()))
    }

    /// Get an article by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<NewsArticle>> {
        let sql = format!("{SELECT_NEWS} WHERE id = ?");
        let row = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(row.map(NewsArticle::from))
    }

    /// List articles, newest first.
    pub async fn list(&self) -> Result<Vec<NewsArticle>> {
        let sql = format!("{SELECT_NEWS} ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(NewsArticle::from).collect())
    }

    /// Replace an article's title, content and image.
    ///
    /// Returns the updated article, or None if not found.
    pub async fn update(&self, id: i64, data: &ArticleData) -> Result<Option<NewsArticle>> {
        data.validate()?;

        let result = sqlx::query("UPDATE news SET title = ?, content = ?, image_url = ? WHERE id = ?")
            .bind(data.title.trim())
            .bind(data.content.trim())
            .bind(stored_value(data.image.as_ref()))
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete an article.
    ///
    /// Returns `false` if it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
