//! Scanned document uploads.

use std::path::Path;

use super::ApiError;

/// A scanned claim document ready to be posted to the OCR endpoint.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Build an upload from in-memory bytes, checking the file type
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name)
            .ok_or_else(|| ApiError::UnsupportedDocument(file_name.clone()))?;
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Read a document from disk
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scan".to_string());
        // Check the type before touching the file
        if mime_for(&file_name).is_none() {
            return Err(ApiError::UnsupportedDocument(file_name));
        }
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file_name, bytes)
    }
}

/// Content type for accepted documents: images and PDF
fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "tif" | "tiff" => Some("image/tiff"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
