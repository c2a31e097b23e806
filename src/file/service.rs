//! Document service.
//!
//! This module coordinates the blob store and the catalog:
//! - Upload: write the blob first, then record it; remove the blob again if
//!   recording fails
//! - Batch upload with per-file failure isolation
//! - Download and delete

use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::AsyncRead;
use tracing::{info, warn};

use crate::db::Database;
use crate::{Result, SiteError};

use super::document::{Document, DocumentRepository, DocumentUpdate, NewDocument};
use super::naming::{derive_title, Resolution};
use super::storage::BlobStore;
use super::{DEFAULT_CONTENT_TYPE, MAX_TITLE_LENGTH};

/// Metadata shared by every file of an upload request.
#[derive(Debug, Clone, Default)]
pub struct UploadMeta {
    /// Title; derived from each file name when empty.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Folder to file under.
    pub folder_id: Option<i64>,
}

impl UploadMeta {
    /// Create upload metadata with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description. Blank text means none.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    /// Set the category. Blank text means none.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(category.into());
        self
    }

    /// Set the folder.
    pub fn with_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// One uploaded file.
#[derive(Debug)]
pub struct UploadSource<R> {
    /// File name as sent by the client.
    pub file_name: String,
    /// Content type as sent by the client.
    pub content_type: Option<String>,
    /// File content.
    pub reader: R,
}

impl<R> UploadSource<R> {
    /// Create a new upload source.
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, reader: R) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            reader,
        }
    }
}

/// A file of a batch that could not be stored.
#[derive(Debug)]
pub struct UploadFailure {
    /// File name as sent by the client.
    pub file_name: String,
    /// Why it failed.
    pub error: SiteError,
}

/// Overall result of a batch upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every file was stored.
    AllSucceeded,
    /// Some files were stored.
    Partial,
    /// No file was stored.
    AllFailed,
}

/// Result of a batch upload.
#[derive(Debug, Default)]
pub struct BatchUpload {
    /// Stored documents, in request order.
    pub documents: Vec<Document>,
    /// Files that failed, in request order.
    pub failures: Vec<UploadFailure>,
}

impl BatchUpload {
    /// Classify the batch.
    pub fn outcome(&self) -> BatchOutcome {
        match (self.documents.is_empty(), self.failures.is_empty()) {
            (_, true) => BatchOutcome::AllSucceeded,
            (true, false) => BatchOutcome::AllFailed,
            (false, false) => BatchOutcome::Partial,
        }
    }
}

/// An opened document ready to be streamed.
#[derive(Debug)]
pub struct Download {
    /// Open blob.
    pub file: File,
    /// Name offered to the client.
    pub file_name: String,
    /// Content type.
    pub content_type: String,
    /// Size recorded at upload.
    pub size: u64,
}

/// Service for document uploads, downloads and deletion.
pub struct DocumentService<'a> {
    db: &'a Database,
    store: &'a BlobStore,
    clock: fn() -> DateTime<Utc>,
}

impl<'a> DocumentService<'a> {
    /// Create a new DocumentService.
    pub fn new(db: &'a Database, store: &'a BlobStore) -> Self {
        Self {
            db,
            store,
            clock: Utc::now,
        }
    }

    /// Use a different clock for naming blobs.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn repo(&self) -> DocumentRepository<'_> {
        DocumentRepository::new(self.db.pool())
    }

    /// Store one file and record it in the catalog.
    pub async fn upload<R>(&self, meta: &UploadMeta, source: UploadSource<R>) -> Result<Document>
    where
        R: AsyncRead + Unpin,
    {
        let UploadSource {
            file_name,
            content_type,
            mut reader,
        } = source;

        let title = if meta.title.trim().is_empty() {
            let derived: String = derive_title(&file_name)
                .chars()
                .take(MAX_TITLE_LENGTH)
                .collect();
            derived.trim_end().to_string()
        } else {
            meta.title.trim().to_string()
        };
        if title.is_empty() {
            return Err(SiteError::Validation("title is required".to_string()));
        }
        let content_type = resolve_content_type(content_type.as_deref(), &file_name);

        let time = Resolution::Seconds.component((self.clock)());
        let blob = self.store.write_unique(&file_name, time, &mut reader).await?;

        let new_doc = NewDocument::new(
            title,
            file_name,
            blob.path.to_string_lossy(),
            i64::try_from(blob.size).unwrap_or(i64::MAX),
            content_type,
        )
        .with_description(meta.description.clone())
        .with_category(meta.category.clone())
        .with_folder(meta.folder_id);

        match self.repo().create(&new_doc).await {
            Ok(doc) => {
                info!(
                    "Uploaded document {} ({:?}, {} bytes)",
                    doc.id, doc.file_path, doc.file_size
                );
                Ok(doc)
            }
            Err(e) => {
                warn!("Recording {:?} failed, removing blob: {}", blob.path, e);
                self.store.discard(&blob.path).await;
                Err(e)
            }
        }
    }

    /// Store several files independently.
    ///
    /// A failing file does not stop the others. With an empty shared title
    /// each document is titled after its own file.
    pub async fn upload_many<R>(
        &self,
        meta: &UploadMeta,
        sources: Vec<UploadSource<R>>,
    ) -> Result<BatchUpload>
    where
        R: AsyncRead + Unpin,
    {
        if sources.is_empty() {
            return Err(SiteError::Validation("no files uploaded".to_string()));
        }

        let mut batch = BatchUpload::default();
        for source in sources {
            let file_name = source.file_name.clone();
            match self.upload(meta, source).await {
                Ok(doc) => batch.documents.push(doc),
                Err(error) => {
                    warn!("Upload of {:?} failed: {}", file_name, error);
                    batch.failures.push(UploadFailure { file_name, error });
                }
            }
        }

        Ok(batch)
    }

    /// Get a document.
    pub async fn get(&self, id: i64) -> Result<Document> {
        self.repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| SiteError::NotFound("document".to_string()))
    }

    /// List documents, newest first, optionally limited to a category.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Document>> {
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => self.repo().list_by_category(category).await,
            None => self.repo().list_all().await,
        }
    }

    /// List documents filed under a folder, newest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<Document>> {
        self.repo().list_by_folder(folder_id).await
    }

    /// Change a document's metadata.
    pub async fn update_metadata(&self, id: i64, update: &DocumentUpdate) -> Result<Document> {
        let doc = self
            .repo()
            .update(id, update)
            .await?
            .ok_or_else(|| SiteError::NotFound("document".to_string()))?;

        info!("Updated document {}", doc.id);
        Ok(doc)
    }

    /// Open a document for download.
    ///
    /// The size comes from the catalog, not from the file on disk.
    pub async fn download(&self, id: i64) -> Result<Download> {
        let doc = self.get(id).await?;
        let file = self.store.open(&doc.storage_path()).await?;

        Ok(Download {
            file,
            file_name: doc.file_name,
            content_type: doc.file_type,
            size: u64::try_from(doc.file_size).unwrap_or(0),
        })
    }

    /// Delete a document and its blob.
    ///
    /// A blob that cannot be removed is logged and left behind; the catalog
    /// row is removed regardless.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let doc = self.get(id).await?;

        if let Err(e) = self.store.delete(&doc.storage_path()).await {
            warn!("Orphaned blob for document {}: {}", id, e);
        }

        if !self.repo().delete(id).await? {
            return Err(SiteError::NotFound("document".to_string()));
        }

        info!("Deleted document {} ({:?})", id, doc.file_path);
        Ok(())
    }
}

/// Content type for an upload: the declared one, else a guess from the name.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FolderRepository, NewFolder};
    use chrono::TimeZone;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    async fn setup() -> (TempDir, Database, BlobStore) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let store = BlobStore::new(temp_dir.path().join("documents"));
        (temp_dir, db, store)
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn source<'b>(name: &str, content: &'b [u8]) -> UploadSource<&'b [u8]> {
        UploadSource::new(name, Some("application/pdf".to_string()), content)
    }

    fn blob_count(store: &BlobStore) -> usize {
        match std::fs::read_dir(store.root()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[tokio::test]
    async fn test_upload_records_written_size() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let content = b"%PDF-1.4 school handbook";

        let doc = service
            .upload(
                &UploadMeta::new("Handbook")
                    .with_description("For students")
                    .with_category("policies"),
                source("handbook.pdf", content),
            )
            .await
            .unwrap();

        assert_eq!(doc.title, "Handbook");
        assert_eq!(doc.description.as_deref(), Some("For students"));
        assert_eq!(doc.category.as_deref(), Some("policies"));
        assert_eq!(doc.file_name, "handbook.pdf");
        assert_eq!(doc.file_type, "application/pdf");
        assert_eq!(doc.file_size, content.len() as i64);
        assert!(doc.storage_path().starts_with(store.root()));
        assert_eq!(std::fs::read(doc.storage_path()).unwrap(), content);
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trip() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

        let doc = service
            .upload(&UploadMeta::new("Data"), source("data.bin", &content))
            .await
            .unwrap();
        let mut download = service.download(doc.id).await.unwrap();

        let mut read_back = Vec::new();
        download.file.read_to_end(&mut read_back).await.unwrap();

        assert_eq!(read_back, content);
        assert_eq!(download.size, content.len() as u64);
        assert_eq!(download.file_name, "data.bin");
        assert_eq!(download.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_upload_derives_title_from_file_name() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let doc = service
            .upload(&UploadMeta::new("   "), source("Exam Schedule.xlsx", b"x"))
            .await
            .unwrap();

        assert_eq!(doc.title, "Exam Schedule");
    }

    #[tokio::test]
    async fn test_upload_long_file_name_truncates_derived_title() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let file_name = format!("{}.pdf", "\u{0430}".repeat(MAX_TITLE_LENGTH + 10));

        let doc = service
            .upload(&UploadMeta::default(), source(&file_name, b"content"))
            .await
            .unwrap();

        assert_eq!(doc.title.chars().count(), MAX_TITLE_LENGTH);
        assert!(doc.title.chars().all(|c| c == '\u{0430}'));
        assert_eq!(doc.file_name, file_name);
        assert_eq!(blob_count(&store), 1);
    }

    #[tokio::test]
    async fn test_upload_many_long_file_name_succeeds() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let long_name = format!("{}.pdf", "a".repeat(210));

        let batch = service
            .upload_many(
                &UploadMeta::default(),
                vec![source(&long_name, b"one"), source("short.pdf", b"two")],
            )
            .await
            .unwrap();

        assert_eq!(batch.outcome(), BatchOutcome::AllSucceeded);
        assert_eq!(batch.documents[0].title, "a".repeat(MAX_TITLE_LENGTH));
    }

    #[tokio::test]
    async fn test_upload_without_any_title_has_no_side_effects() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let result = service
            .upload(&UploadMeta::default(), source("", b"content"))
            .await;

        assert!(matches!(result, Err(SiteError::Validation(_))));
        assert_eq!(blob_count(&store), 0);
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_sanitizes_storage_name() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store).with_clock(fixed_clock);

        let doc = service
            .upload(&UploadMeta::default(), source("../../my report.pdf", b"x"))
            .await
            .unwrap();

        assert_eq!(doc.storage_path(), store.path_for("1700000000_my_report.pdf"));
        assert_eq!(doc.file_name, "../../my report.pdf");
    }

    #[tokio::test]
    async fn test_upload_guesses_missing_content_type() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let doc = service
            .upload(
                &UploadMeta::default(),
                UploadSource::new("notes.txt", None, &b"hello"[..]),
            )
            .await
            .unwrap();

        assert_eq!(doc.file_type, "text/plain");
    }

    #[tokio::test]
    async fn test_upload_catalog_failure_removes_blob() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store).with_clock(fixed_clock);

        // No folder 999 exists, so the insert violates the foreign key.
        let result = service
            .upload(
                &UploadMeta::new("Orphan").with_folder(Some(999)),
                source("orphan.pdf", b"content"),
            )
            .await;

        assert!(matches!(result, Err(SiteError::Database(_))));
        assert_eq!(blob_count(&store), 0);
        assert!(service.list(None).await.unwrap().is_empty());

        // The same target name is free again.
        store
            .write("1700000000_orphan.pdf", &mut &b"again"[..])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_empty_file_is_rejected_and_cleaned_up() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let result = service
            .upload(&UploadMeta::new("Empty"), source("empty.pdf", b""))
            .await;

        assert!(matches!(result, Err(SiteError::Validation(_))));
        assert_eq!(blob_count(&store), 0);
    }

    #[tokio::test]
    async fn test_upload_write_failure_creates_no_row() {
        let (tmp, db, _store) = setup().await;
        // A regular file where the root directory should be.
        let blocked = tmp.path().join("blocked");
        std::fs::write(&blocked, b"not a directory").unwrap();
        let store = BlobStore::new(blocked.join("documents"));
        let service = DocumentService::new(&db, &store);

        let result = service
            .upload(&UploadMeta::new("Doc"), source("doc.pdf", b"content"))
            .await;

        assert!(matches!(result, Err(SiteError::Storage { .. })));
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_many_same_names_same_second() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store).with_clock(fixed_clock);

        let batch = service
            .upload_many(
                &UploadMeta::default(),
                vec![source("a.pdf", b"first"), source("a.pdf", b"second")],
            )
            .await
            .unwrap();

        assert_eq!(batch.outcome(), BatchOutcome::AllSucceeded);
        assert_eq!(batch.documents.len(), 2);
        assert_ne!(batch.documents[0].file_path, batch.documents[1].file_path);
        assert!(batch.documents.iter().all(|d| d.title == "a"));
        assert_eq!(service.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_many_titles_each_file() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let batch = service
            .upload_many(
                &UploadMeta::default(),
                vec![source("minutes.pdf", b"1"), source("agenda.docx", b"2")],
            )
            .await
            .unwrap();

        let titles: Vec<&str> = batch.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["minutes", "agenda"]);
    }

    #[tokio::test]
    async fn test_upload_many_partial() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let batch = service
            .upload_many(
                &UploadMeta::new("Shared"),
                vec![
                    source("one.pdf", b"1"),
                    source("empty.pdf", b""),
                    source("three.pdf", b"3"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(batch.outcome(), BatchOutcome::Partial);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].file_name, "empty.pdf");

        for doc in &batch.documents {
            assert_eq!(service.get(doc.id).await.unwrap().id, doc.id);
        }
    }

    #[tokio::test]
    async fn test_upload_many_all_failed() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let batch = service
            .upload_many(
                &UploadMeta::new("Shared"),
                vec![source("a.pdf", b""), source("b.pdf", b"")],
            )
            .await
            .unwrap();

        assert_eq!(batch.outcome(), BatchOutcome::AllFailed);
        assert!(batch.documents.is_empty());
        assert_eq!(batch.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_many_requires_files() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let result = service
            .upload_many::<&[u8]>(&UploadMeta::new("Nothing"), Vec::new())
            .await;

        assert!(matches!(result, Err(SiteError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_with_category_filter() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        service
            .upload(&UploadMeta::new("A").with_category("forms"), source("a.pdf", b"a"))
            .await
            .unwrap();
        service
            .upload(&UploadMeta::new("B"), source("b.pdf", b"b"))
            .await
            .unwrap();

        assert_eq!(service.list(Some("forms")).await.unwrap().len(), 1);
        assert_eq!(service.list(Some("")).await.unwrap().len(), 2);
        assert_eq!(service.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_folder() {
        let (_tmp, db, store) = setup().await;
        let folder = FolderRepository::new(db.pool())
            .create(&NewFolder::new("Forms"))
            .await
            .unwrap();
        let service = DocumentService::new(&db, &store);

        service
            .upload(
                &UploadMeta::new("Filed").with_folder(Some(folder.id)),
                source("filed.pdf", b"f"),
            )
            .await
            .unwrap();
        service
            .upload(&UploadMeta::new("Loose"), source("loose.pdf", b"l"))
            .await
            .unwrap();

        let filed = service.list_by_folder(folder.id).await.unwrap();
        assert_eq!(filed.len(), 1);
        assert_eq!(filed[0].folder_name, "Forms");
    }

    #[tokio::test]
    async fn test_update_metadata() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let doc = service
            .upload(&UploadMeta::new("Old"), source("old.pdf", b"o"))
            .await
            .unwrap();

        let updated = service
            .update_metadata(doc.id, &DocumentUpdate::new().title("New"))
            .await
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.file_path, doc.file_path);

        let missing = service
            .update_metadata(9999, &DocumentUpdate::new().title("x"))
            .await;
        assert!(matches!(missing, Err(SiteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        let result = service.download(42).await;
        assert!(matches!(result, Err(SiteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_missing_blob_is_storage_error() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let doc = service
            .upload(&UploadMeta::new("Gone"), source("gone.pdf", b"g"))
            .await
            .unwrap();
        std::fs::remove_file(doc.storage_path()).unwrap();

        let result = service.download(doc.id).await;
        assert!(matches!(result, Err(SiteError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_row() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let doc = service
            .upload(&UploadMeta::new("Bye"), source("bye.pdf", b"b"))
            .await
            .unwrap();

        service.delete(doc.id).await.unwrap();

        assert!(!doc.storage_path().exists());
        assert!(matches!(
            service.get(doc.id).await,
            Err(SiteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_with_missing_blob_still_removes_row() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);
        let doc = service
            .upload(&UploadMeta::new("Lost"), source("lost.pdf", b"l"))
            .await
            .unwrap();
        std::fs::remove_file(doc.storage_path()).unwrap();

        service.delete(doc.id).await.unwrap();

        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let (_tmp, db, store) = setup().await;
        let service = DocumentService::new(&db, &store);

        assert!(matches!(
            service.delete(7).await,
            Err(SiteError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_content_type() {
        assert_eq!(
            resolve_content_type(Some("application/pdf"), "x.bin"),
            "application/pdf"
        );
        assert_eq!(resolve_content_type(Some("  "), "photo.png"), "image/png");
        assert_eq!(resolve_content_type(None, "notes.txt"), "text/plain");
        assert_eq!(resolve_content_type(None, "unknown.zzz"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_batch_outcome() {
        let empty = BatchUpload::default();
        assert_eq!(empty.outcome(), BatchOutcome::AllSucceeded);

        let failed = BatchUpload {
            documents: Vec::new(),
            failures: vec![UploadFailure {
                file_name: "a.pdf".to_string(),
                error: SiteError::Validation("file is empty".to_string()),
            }],
        };
        assert_eq!(failed.outcome(), BatchOutcome::AllFailed);
    }
}
