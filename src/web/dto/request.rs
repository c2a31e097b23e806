//! Request DTOs for Web API.

use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::contact::NewContact;
use crate::file::DocumentUpdate;

/// Admin login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Admin username.
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    /// Admin password.
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Contact form submission.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    /// Sender name.
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Sender email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Sender phone.
    #[serde(default)]
    #[validate(length(max = 40, message = "Phone must be at most 40 characters"))]
    pub phone: Option<String>,
    /// Message text.
    #[validate(
        length(min = 1, max = 5000, message = "Message is required"),
        custom(function = "no_control_chars")
    )]
    pub message: String,
}

impl ContactRequest {
    /// Convert into a submission for the repository.
    pub fn into_contact(self) -> NewContact {
        let contact = NewContact::new(self.name, self.email, self.message);
        match self.phone {
            Some(phone) => contact.with_phone(phone),
            None => contact,
        }
    }
}

/// Create folder request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(
        length(max = 100, message = "Name is too long"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Description.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Icon tag.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub icon: Option<String>,
}

/// Document metadata update.
///
/// Omitted fields are left unchanged. `null` or an empty string clears
/// `description` and `category`; `null` unfiles the document.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentRequest {
    /// New title.
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New category.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    /// New folder.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub folder_id: Option<Option<i64>>,
}

impl UpdateDocumentRequest {
    /// Convert into a catalog update.
    pub fn into_update(self) -> DocumentUpdate {
        let mut update = DocumentUpdate::new();
        if let Some(title) = self.title {
            update = update.title(title.trim());
        }
        if let Some(description) = self.description {
            update = update.description(blank_to_none(description));
        }
        if let Some(category) = self.category {
            update = update.category(blank_to_none(category));
        }
        if let Some(folder_id) = self.folder_id {
            update = update.folder_id(folder_id);
        }
        update
    }
}

/// Query parameters for document lists.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentListQuery {
    /// Only documents in this category.
    pub category: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Distinguish a missing field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
