//! Two-stage document pipeline: OCR, then NER over the recognised text.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiError, AtlasClient, DocumentUpload};
use crate::models::Entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ocr,
    Ner,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ocr => write!(f, "OCR"),
            Stage::Ner => write!(f, "NER"),
        }
    }
}

/// A pipeline failure, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("OCR stage failed: {0}")]
    Ocr(#[source] ApiError),

    /// NER failed after OCR succeeded; the recognised text is kept
    #[error("NER stage failed: {source}")]
    Ner {
        text: String,
        #[source]
        source: ApiError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Ocr(_) => Stage::Ocr,
            PipelineError::Ner { .. } => Stage::Ner,
        }
    }

    /// Text recognised before the failure, if any
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            PipelineError::Ocr(_) => None,
            PipelineError::Ner { text, .. } => Some(text),
        }
    }
}

/// Output of a completed pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub entities: Entities,
}

pub struct DocumentPipeline<'a> {
    client: &'a AtlasClient,
}

impl<'a> DocumentPipeline<'a> {
    pub fn new(client: &'a AtlasClient) -> Self {
        Self { client }
    }

    /// Run OCR then NER. `on_text` sees the recognised text as soon as the
    /// OCR stage succeeds, before NER is attempted.
    pub async fn run<F>(&self, upload: &DocumentUpload, on_text: F) -> Result<Extraction, PipelineError>
    where
        F: FnOnce(&str),
    {
        let text = self
            .client
            .scan_document(upload)
            .await
            .map_err(PipelineError::Ocr)?;
        debug!("OCR returned {} characters for {}", text.len(), upload.file_name);
        on_text(&text);

        let entities = match self.client.extract_entities(&text).await {
            Ok(entities) => entities,
            Err(source) => return Err(PipelineError::Ner { text, source }),
        };

        info!(
            "Extracted {} village names from {}",
            entities.villages.as_ref().map_or(0, Vec::len),
            upload.file_name
        );

        Ok(Extraction { text, entities })
    }
}
