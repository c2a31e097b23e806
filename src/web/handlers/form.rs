//! Multipart form decoding shared by the upload handlers.

use std::collections::HashMap;
use std::io::SeekFrom;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::file::UploadSource;
use crate::web::error::ApiError;
use crate::SiteError;

/// A file part read from a multipart body.
///
/// The contents are spooled to an anonymous temporary file, which the OS
/// removes once the handle is dropped.
#[derive(Debug)]
pub struct FormFile {
    /// Client-side file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Spooled contents, positioned at the start.
    pub file: File,
}

impl FormFile {
    /// Turn the part into an upload source.
    pub fn into_source(self) -> UploadSource<File> {
        UploadSource::new(self.file_name, self.content_type, self.file)
    }
}

/// Text fields and file parts of a multipart body.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<(String, FormFile)>,
}

impl FormData {
    /// Read the whole body.
    ///
    /// File parts are streamed to disk chunk by chunk, so text fields may
    /// come before or after the files without holding the files in memory.
    /// File parts without a file name (an empty file input) are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) if file_name.is_empty() => continue,
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let file = spool(field, &file_name).await?;
                    form.files.push((
                        name,
                        FormFile {
                            file_name,
                            content_type,
                            file,
                        },
                    ));
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, or an empty string when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Remove and return all files sent under a field name.
    pub fn take_files(&mut self, name: &str) -> Vec<FormFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }

    /// An optional numeric field. Blank means none.
    pub fn optional_id(&self, name: &str) -> Result<Option<i64>, ApiError> {
        let value = self.text(name).trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::unprocessable(format!("{name} must be a number")))
    }
}

/// Copy a file part into an anonymous temporary file.
async fn spool(mut field: Field<'_>, file_name: &str) -> Result<File, ApiError> {
    let mut file = File::from_std(tempfile::tempfile().map_err(spool_error)?);
    let mut size = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.map_err(spool_error)?;
        size += chunk.len() as u64;
    }

    file.flush().await.map_err(spool_error)?;
    file.seek(SeekFrom::Start(0)).await.map_err(spool_error)?;
    tracing::debug!(file = %file_name, bytes = size, "Spooled upload part");
    Ok(file)
}

fn spool_error(err: std::io::Error) -> ApiError {
    SiteError::Io(err).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header::CONTENT_TYPE, Request};
    use tokio::io::AsyncReadExt;

    fn spooled(name: &str) -> FormFile {
        FormFile {
            file_name: name.to_string(),
            content_type: None,
            file: File::from_std(tempfile::tempfile().unwrap()),
        }
    }

    fn form(fields: &[(&str, &str)], files: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files
                .iter()
                .map(|(field, name)| (field.to_string(), spooled(name)))
                .collect(),
        }
    }

    async fn multipart(body: &'static str) -> Multipart {
        let request = Request::builder()
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_text_defaults_to_empty() {
        let form = form(&[("title", "Menu")], &[]);
        assert_eq!(form.text("title"), "Menu");
        assert_eq!(form.text("description"), "");
    }

    #[tokio::test]
    async fn test_take_files_by_field() {
        let mut form = form(&[], &[("document", "a.pdf"), ("image", "b.png"), ("document", "c.pdf")]);

        let docs = form.take_files("document");
        let names: Vec<&str> = docs.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);

        assert_eq!(form.take_files("image").len(), 1);
        assert!(form.take_files("document").is_empty());
    }

    #[tokio::test]
    async fn test_optional_id() {
        let form = form(&[("folder_id", " 3 "), ("blank", ""), ("bad", "x")], &[]);
        assert_eq!(form.optional_id("folder_id").unwrap(), Some(3));
        assert_eq!(form.optional_id("blank").unwrap(), None);
        assert_eq!(form.optional_id("missing").unwrap(), None);
        assert!(form.optional_id("bad").is_err());
    }

    #[tokio::test]
    async fn test_read_spools_file_parts() {
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"document\"; filename=\"menu.pdf\"\r\n\
            Content-Type: application/pdf\r\n\
            \r\n\
            %PDF-lunch-menu\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"document\"; filename=\"\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            \r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\
            \r\n\
            Lunch menu\r\n\
            --XBOUNDARY--\r\n";

        let mut form = FormData::read(multipart(body).await).await.unwrap();

        assert_eq!(form.text("title"), "Lunch menu");
        let mut files = form.take_files("document");
        assert_eq!(files.len(), 1);

        let file = &mut files[0];
        assert_eq!(file.file_name, "menu.pdf");
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));

        let mut contents = String::new();
        file.file.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "%PDF-lunch-menu");
    }
}
