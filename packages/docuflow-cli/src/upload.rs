//! Turning a local file or remote URL into a trigger request.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::api::TriggerRequest;

/// Media types accepted for upload
pub const ALLOWED_MEDIA_TYPES: [&str; 5] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/webp",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type {media_type}: please upload a PDF, JPG, PNG, TIFF or WEBP file.")]
    UnsupportedType { media_type: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A document ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Local file, inlined as a `data:` URI
    Inline {
        data_uri: String,
        media_type: String,
        file_name: String,
    },
    Remote { url: String, content_type: String },
}

impl Document {
    pub fn file_name(&self) -> &str {
        match self {
            Document::Inline { file_name, .. } => file_name,
            Document::Remote { url, .. } => url
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or(url.as_str()),
        }
    }

    /// Build the trigger body. `fields` is sent only when non-empty.
    pub fn into_request(self, description: Option<String>, fields: Vec<String>) -> TriggerRequest {
        let fields = (!fields.is_empty()).then_some(fields);
        let file_name = Some(self.file_name().to_string());

        match self {
            Document::Inline { data_uri, .. } => TriggerRequest {
                document_data_uri: data_uri,
                description,
                content_type: None,
                file_name,
                fields,
            },
            Document::Remote { url, content_type } => TriggerRequest {
                document_data_uri: url,
                description,
                content_type: Some(content_type),
                file_name,
                fields,
            },
        }
    }
}

/// Read `path` and encode it as a `data:<media-type>;base64,...` document.
pub async fn encode_file(path: &Path) -> Result<Document, UploadError> {
    let media_type = guess_media_type(path)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document::Inline {
        data_uri: format!("data:{};base64,{}", media_type, STANDARD.encode(&bytes)),
        media_type,
        file_name,
    })
}

/// Remote document; the server downloads it, so only the type is checked here.
pub fn remote_document(url: &str, content_type: &str) -> Result<Document, UploadError> {
    let content_type = content_type.trim().to_ascii_lowercase();
    ensure_allowed(&content_type)?;

    Ok(Document::Remote {
        url: url.trim().to_string(),
        content_type,
    })
}

fn guess_media_type(path: &Path) -> Result<String, UploadError> {
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    ensure_allowed(&media_type)?;
    Ok(media_type)
}

fn ensure_allowed(media_type: &str) -> Result<(), UploadError> {
    if ALLOWED_MEDIA_TYPES.contains(&media_type) {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType {
            media_type: media_type.to_string(),
        })
    }
}
