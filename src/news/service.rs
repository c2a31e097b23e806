//! News service: article CRUD with image attachments.

use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;
use tracing::{info, warn};

use crate::db::Database;
use crate::file::naming::Resolution;
use crate::file::{BlobStore, StoredBlob, UploadSource};
use crate::{Result, SiteError};

use super::image::{check_image_name, resolve_create, resolve_update, ImageRef};
use super::repository::{validate_text, ArticleData, NewsArticle, NewsRepository};

/// Text fields of the article form.
#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Image URL text as submitted (may be empty).
    pub image_url: String,
}

impl ArticleForm {
    /// Create a form without image URL text.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url: String::new(),
        }
    }

    /// Set the image URL text.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }
}

/// Service for news articles.
pub struct NewsService<'a> {
    db: &'a Database,
    images: &'a BlobStore,
    clock: fn() -> DateTime<Utc>,
}

impl<'a> NewsService<'a> {
    /// Create a new NewsService storing images in `images`.
    pub fn new(db: &'a Database, images: &'a BlobStore) -> Self {
        Self {
            db,
            images,
            clock: Utc::now,
        }
    }

    /// Use a different clock for naming images.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn repo(&self) -> NewsRepository<'_> {
        NewsRepository::new(self.db.pool())
    }

    /// List articles, newest first.
    pub async fn list(&self) -> Result<Vec<NewsArticle>> {
        self.repo().list().await
    }

    /// Get an article.
    pub async fn get(&self, id: i64) -> Result<NewsArticle> {
        self.repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("news article".to_string()))
    }

    /// Publish an article.
    ///
    /// An uploaded image takes precedence over the URL text.
    pub async fn create<R>(
        &self,
        form: &ArticleForm,
        image: Option<UploadSource<R>>,
    ) -> Result<NewsArticle>
    where
        R: AsyncRead + Unpin,
    {
        validate_text(&form.title, &form.content)?;

        let blob = self.store_image(image).await?;
        let uploaded = blob.as_ref().map(|b| ImageRef::local(&b.name));
        let data = ArticleData::new(&form.title, &form.content)
            .with_image(resolve_create(uploaded, &form.image_url));

        match self.repo().create(&data).await {
            Ok(article) => {
                info!("Created news article {}", article.id);
                Ok(article)
            }
            Err(e) => {
                self.discard_image(blob).await;
                Err(e)
            }
        }
    }

    /// Edit an article.
    ///
    /// A replaced uploaded image is left on disk.
    pub async fn update<R>(
        &self,
        id: i64,
        form: &ArticleForm,
        image: Option<UploadSource<R>>,
    ) -> Result<NewsArticle>
    where
        R: AsyncRead + Unpin,
    {
        validate_text(&form.title, &form.content)?;
        let current = self.get(id).await?;

        let blob = self.store_image(image).await?;
        let uploaded = blob.as_ref().map(|b| ImageRef::local(&b.name));
        let data = ArticleData::new(&form.title, &form.content).with_image(resolve_update(
            current.image.as_ref(),
            uploaded,
            &form.image_url,
        ));

        match self.repo().update(id, &data).await {
            Ok(Some(article)) => {
                info!("Updated news article {}", article.id);
                Ok(article)
            }
            Ok(None) => {
                self.discard_image(blob).await;
                Err(SiteError::NotFound("news article".to_string()))
            }
            Err(e) => {
                self.discard_image(blob).await;
                Err(e)
            }
        }
    }

    /// Delete an article and its uploaded image, if any.
    ///
    /// External images are left alone. Failing to remove the local file is
    /// only logged.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let article = self.get(id).await?;

        if let Some(name) = article.image.as_ref().and_then(ImageRef::local_name) {
            if let Err(e) = self.images.delete(&self.images.path_for(name)).await {
                warn!("Orphaned image for news article {}: {}", id, e);
            }
        }

        if !self.repo().delete(id).await? {
            return Err(SiteError::NotFound("news article".to_string()));
        }

        info!("Deleted news article {}", id);
        Ok(())
    }

    async fn store_image<R>(&self, image: Option<UploadSource<R>>) -> Result<Option<StoredBlob>>
    where
        R: AsyncRead + Unpin,
    {
        let Some(UploadSource {
            file_name,
            mut reader,
            ..
        }) = image
        else {
            return Ok(None);
        };

        check_image_name(&file_name)?;
        let time = Resolution::Nanos.component((self.clock)());
        let blob = self.images.write_unique(&file_name, time, &mut reader).await?;
        info!("Stored news image {:?} ({} bytes)", blob.path, blob.size);

        Ok(Some(blob))
    }

    async fn discard_image(&self, blob: Option<StoredBlob>) {
        if let Some(blob) = blob {
            warn!("Removing news image {:?} after failed save", blob.path);
            self.images.discard(&blob.path).await;
        }
    }
}
