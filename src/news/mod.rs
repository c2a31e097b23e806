//! News articles with optional images.

mod image;
mod repository;
mod service;

pub use image::{
    check_image_name, resolve_create, resolve_update, stored_value, ImageRef,
    ALLOWED_IMAGE_EXTENSIONS, UPLOADS_PREFIX,
};
pub use repository::{ArticleData, NewsArticle, NewsRepository};
pub use service::{ArticleForm, NewsService};

/// Maximum length for a news title (in characters).
pub const MAX_NEWS_TITLE_LENGTH: usize = 200;

/// Maximum length for news content (in characters).
pub const MAX_CONTENT_LENGTH: usize = 50_000;
