//! Blob storage for uploaded files.
//!
//! Blobs live flat under a single root directory:
//! ```text
//! {root}/
//! ├── 1700000000_annual_report.pdf
//! ├── 1700000004_timetable.xlsx
//! └── ...
//! ```
//! Names come from [`super::naming`] and are never reused while a file with
//! that name exists: writes use exclusive create.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use super::naming::{is_flat_name, stored_name};
use crate::{Result, SiteError};

/// How many successive time components are tried before giving up on a name.
pub const MAX_NAME_ATTEMPTS: i64 = 8;

/// Location and size of a blob that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Name of the blob inside the store root.
    pub name: String,
    /// Full path of the blob.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}

/// Filesystem store for uploaded blobs.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`.
    ///
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path for a target name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Stream `reader` into a new blob called `name`.
    ///
    /// Fails with a storage error whose kind is `AlreadyExists` when the name
    /// is taken. If copying fails midway the partial file is removed before
    /// the error is returned.
    pub async fn write<R>(&self, name: &str, reader: &mut R) -> Result<StoredBlob>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if !is_flat_name(name) {
            return Err(SiteError::Validation(format!(
                "invalid storage name: {name:?}"
            )));
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SiteError::storage(&self.root, e))?;

        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| SiteError::storage(&path, e))?;

        let copied = match tokio::io::copy(reader, &mut file).await {
            Ok(n) => file.flush().await.map(|()| n),
            Err(e) => Err(e),
        };
        drop(file);

        match copied {
            Ok(size) => {
                debug!("Stored blob {:?} ({} bytes)", path, size);
                Ok(StoredBlob {
                    name: name.to_string(),
                    path,
                    size,
                })
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path).await {
                    warn!("Failed to remove partial blob {:?}: {}", path, cleanup);
                }
                Err(SiteError::storage(path, e))
            }
        }
    }

    /// Stream `reader` into a new blob named after `original` and `time`.
    ///
    /// When the name is taken the next time component is tried, up to
    /// [`MAX_NAME_ATTEMPTS`] times. The reader is not consumed by a failed
    /// exclusive create, so it can be reused for the next attempt.
    pub async fn write_unique<R>(
        &self,
        original: &str,
        time: i64,
        reader: &mut R,
    ) -> Result<StoredBlob>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut last_err = None;
        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = stored_name(original, time.saturating_add(offset));
            let target = self.path_for(&name);
            match self.write(&name, &mut *reader).await {
                Err(e) if e.is_name_collision() && e.storage_path() == Some(target.as_path()) => {
                    debug!("Blob name {} is taken, trying the next one", name);
                    last_err = Some(e);
                }
                result => return result,
            }
        }

        Err(last_err.unwrap_or_else(|| {
            SiteError::storage(
                self.path_for(&stored_name(original, time)),
                io::Error::new(io::ErrorKind::AlreadyExists, "no free blob name"),
            )
        }))
    }

    /// Open a blob for reading.
    pub async fn open(&self, path: &Path) -> Result<File> {
        File::open(path)
            .await
            .map_err(|e| SiteError::storage(path, e))
    }

    /// Remove a blob.
    ///
    /// Returns `false` (and logs a warning) when the file is already gone.
    pub async fn delete(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed blob {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Blob {:?} was already missing", path);
                Ok(false)
            }
            Err(e) => Err(SiteError::storage(path, e)),
        }
    }

    /// Remove a blob, logging instead of returning failures.
    ///
    /// Used to compensate after a later step of an upload fails.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = self.delete(path).await {
            warn!("Orphaned blob left at {:?}: {}", path, e);
        }
    }
}
