use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the atlas backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported document type: {0} (expected an image or PDF)")]
    UnsupportedDocument(String),
}
