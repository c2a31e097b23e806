//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbPool;
use crate::{Result, SiteError};

/// Maximum length for a contact message (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// A stored contact form submission.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ContactEntry {
    /// Unique entry ID.
    pub id: i64,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone (empty when not given).
    pub phone: String,
    /// Message text.
    pub message: String,
    /// When the form was submitted.
    pub created_at: DateTime<Utc>,
}

/// A new contact form submission.
#[derive(Debug, Clone)]
pub struct NewContact {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone.
    pub phone: Option<String>,
    /// Message text.
    pub message: String,
}

impl NewContact {
    /// Create a new submission.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            message: message.into(),
        }
    }

    /// Set the phone number. Blank text means none.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        let phone = phone.into();
        self.phone = if phone.trim().is_empty() {
            None
        } else {
            Some(phone.trim().to_string())
        };
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(SiteError::Validation(
                "name, email and message are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(SiteError::Validation("invalid email address".to_string()));
        }
        if self.message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(SiteError::Validation(format!(
                "message must be at most {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Repository for contact submissions.
pub struct ContactRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a submission.
    pub async fn create(&self, contact: &NewContact) -> Result<ContactEntry> {
        contact.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO contacts (name, email, phone, message, created_at)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(contact.name.trim())
        .bind(contact.email.trim())
        .bind(&contact.phone)
        .bind(contact.message.trim())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| SiteError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("contact entry".to_string()))
    }

    /// Get a submission by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ContactEntry>> {
        let entry = sqlx::query_as::<_, ContactEntry>(
            "SELECT id, name, email, COALESCE(phone, '') AS phone, message, created_at
             FROM contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(entry)
    }

    /// List submissions, newest first.
    pub async fn list(&self) -> Result<Vec<ContactEntry>> {
        let entries = sqlx::query_as::<_, ContactEntry>(
            "SELECT id, name, email, COALESCE(phone, '') AS phone, message, created_at
             FROM contacts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| SiteError::Database(e.to_string()))?;

        Ok(entries)
    }
}
