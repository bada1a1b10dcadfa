//! HTTP client for the atlas backend endpoints.

mod client;
mod error;
mod upload;

pub use client::AtlasClient;
pub use error::ApiError;
pub use upload::DocumentUpload;
