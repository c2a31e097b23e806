//! News image references.
//!
//! The `news.image_url` column holds either `/uploads/<name>` for an image
//! uploaded through this site, any other text for an external image, or
//! nothing. [`ImageRef`] is the parsed form; the string convention is only
//! produced and parsed here.

use crate::file::naming::{extension, is_flat_name};
use crate::{Result, SiteError};

/// URL prefix under which uploaded images are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Extensions accepted for uploaded images.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Where an article's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// An image stored by this site under the upload root.
    Local {
        /// File name inside the upload root.
        name: String,
    },
    /// Anything else the editor typed in.
    External {
        /// URL as submitted.
        url: String,
    },
}

impl ImageRef {
    /// Reference to an uploaded image.
    pub fn local(name: impl Into<String>) -> Self {
        ImageRef::Local { name: name.into() }
    }

    /// Parse a stored column value. Empty text means no image.
    ///
    /// Only a flat file name after the prefix counts as local, so a value
    /// like `/uploads/../config.toml` is treated as external and never
    /// touches the filesystem.
    pub fn from_stored(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match value.strip_prefix(UPLOADS_PREFIX) {
            Some(name) if is_flat_name(name) => Some(ImageRef::local(name)),
            _ => Some(ImageRef::External {
                url: value.to_string(),
            }),
        }
    }

    /// Column value for this reference.
    pub fn to_stored(&self) -> String {
        match self {
            ImageRef::Local { name } => format!("{UPLOADS_PREFIX}{name}"),
            ImageRef::External { url } => url.clone(),
        }
    }

    /// Name of the local file, if this image was uploaded here.
    pub fn local_name(&self) -> Option<&str> {
        match self {
            ImageRef::Local { name } => Some(name),
            ImageRef::External { .. } => None,
        }
    }
}

/// Column value for an optional reference (empty when there is none).
pub fn stored_value(image: Option<&ImageRef>) -> String {
    image.map(ImageRef::to_stored).unwrap_or_default()
}

/// Image for a new article: an upload wins over submitted URL text.
pub fn resolve_create(uploaded: Option<ImageRef>, submitted: &str) -> Option<ImageRef> {
    uploaded.or_else(|| ImageRef::from_stored(submitted))
}

/// Image for an edited article.
///
/// 1. A new upload always wins.
/// 2. Otherwise submitted text that differs from the current value replaces
///    it; empty text clears the image.
/// 3. Otherwise the current image stays.
pub fn resolve_update(
    current: Option<&ImageRef>,
    uploaded: Option<ImageRef>,
    submitted: &str,
) -> Option<ImageRef> {
    if uploaded.is_some() {
        return uploaded;
    }

    let submitted = submitted.trim();
    if submitted != stored_value(current) {
        return ImageRef::from_stored(submitted);
    }

    current.cloned()
}

/// Reject uploads whose extension is not an accepted image type.
pub fn check_image_name(file_name: &str) -> Result<()> {
    match extension(file_name) {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(SiteError::Validation(format!(
            "invalid image type: .{ext}"
        ))),
        None => Err(SiteError::Validation(
            "image file must have an extension".to_string(),
        )),
    }
}
