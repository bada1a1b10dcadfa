//! Typed wrapper over the WFS, OCR, NER and DSS endpoints.

use std::time::Duration;

use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, DocumentUpload};
use crate::models::{Entities, GeoPayload, Recommendation};

const WFS_PATH: &str = "api/wfs";
const OCR_PATH: &str = "api/ocr";
const NER_PATH: &str = "api/ner";
const DSS_PATH: &str = "api/dss/recommend";

/// Multipart field carrying the scanned document
const SCAN_FIELD: &str = "scan";

#[derive(Debug, Deserialize)]
struct OcrResponse {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    entities: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendRequest<'a> {
    village_id: &'a str,
    state: &'a str,
}

/// Client for the atlas backend
#[derive(Clone)]
pub struct AtlasClient {
    client: Client,
    base_url: Url,
}

impl AtlasClient {
    /// Create a client rooted at `base_url`. No timeout unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut builder = Client::builder().user_agent("fra-atlas/0.1");
        // Local dev servers are never reached through a proxy
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetch a published layer as GeoJSON
    pub async fn fetch_layer(&self, layer: &str) -> Result<GeoPayload, ApiError> {
        let url = self.endpoint(WFS_PATH)?;
        debug!("Fetching WFS layer {}", layer);

        let response = self
            .client
            .get(url)
            .query(&[("layer", layer)])
            .send()
            .await?;

        decode(WFS_PATH, response).await
    }

    /// Upload a scanned document and return the recognised text
    pub async fn scan_document(&self, upload: &DocumentUpload) -> Result<String, ApiError> {
        let url = self.endpoint(OCR_PATH)?;
        debug!(
            "Uploading {} ({} bytes) for OCR",
            upload.file_name,
            upload.bytes.len()
        );

        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime)?;
        let form = multipart::Form::new().part(SCAN_FIELD, part);

        let response = self.client.post(url).multipart(form).send().await?;
        let body: OcrResponse = decode(OCR_PATH, response).await?;

        Ok(body.text.unwrap_or_default())
    }

    /// Run entity extraction over recognised text
    pub async fn extract_entities(&self, text: &str) -> Result<Entities, ApiError> {
        let url = self.endpoint(NER_PATH)?;

        let response = self
            .client
            .post(url)
            .json(&NerRequest { text })
            .send()
            .await?;
        let body: NerResponse = decode(NER_PATH, response).await?;

        Entities::from_value(body.entities).map_err(|source| ApiError::Decode {
            endpoint: NER_PATH.to_string(),
            source,
        })
    }

    /// Request decision-support recommendations for a village
    pub async fn recommend(
        &self,
        village_id: &str,
        state: &str,
    ) -> Result<Recommendation, ApiError> {
        let url = self.endpoint(DSS_PATH)?;
        debug!("Requesting recommendations for village {} in {}", village_id, state);

        let response = self
            .client
            .post(url)
            .json(&RecommendRequest { village_id, state })
            .send()
            .await?;

        decode(DSS_PATH, response).await
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
        Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

/// Check the status and decode a JSON body
async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        warn!(
            "{} responded with status {}: {:?}",
            endpoint,
            status,
            response.text().await.ok()
        );
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
