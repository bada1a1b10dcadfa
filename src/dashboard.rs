//! Request dispatchers and form controls over the shared view state.
//!
//! Each dispatcher claims an in-flight token for its action, performs its
//! request(s), writes only the fields it owns, and releases the token on
//! every exit path. Failures are logged and surfaced as a single alert.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, AtlasClient, DocumentUpload};
use crate::models::{LayerKey, Level, Selection};
use crate::pipeline::{DocumentPipeline, Extraction, PipelineError};
use crate::state::{Action, ViewState};

/// The WFS loader always fetches this layer
pub const WFS_LAYER: LayerKey = LayerKey::Ifr;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load WFS layer.";
pub const DOCUMENT_FAILED_MESSAGE: &str = "OCR/NER failed.";
pub const DSS_FAILED_MESSAGE: &str = "DSS request failed.";
pub const MISSING_VILLAGE_MESSAGE: &str = "Enter village ID";
pub const IN_PROGRESS_MESSAGE: &str = "Request already in progress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    LoadFailed,
    RequestFailed,
    MissingInput,
    InProgress,
}

/// A blocking, user-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn new(kind: AlertKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Where alerts are shown
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Prints alerts to stderr
pub struct StderrAlerts;

impl AlertSink for StderrAlerts {
    fn alert(&self, alert: Alert) {
        eprintln!("! {}", alert.message);
    }
}

/// Keeps alerts in memory until taken
#[derive(Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn take(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, alert: Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert);
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0} already in progress")]
    InFlight(Action),

    #[error("village identifier is required")]
    MissingVillage,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases an action's in-flight slot when dropped
struct InFlight<'a> {
    state: &'a Mutex<ViewState>,
    action: Action,
    token: Uuid,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).finish(self.action, self.token);
    }
}

pub struct Dashboard {
    client: AtlasClient,
    state: Arc<Mutex<ViewState>>,
    alerts: Arc<dyn AlertSink>,
}

impl Dashboard {
    pub fn new(client: AtlasClient, selection: Selection, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(ViewState::new(selection))),
            alerts,
        }
    }

    pub fn client(&self) -> &AtlasClient {
        &self.client
    }

    /// Copy of the current view state for rendering
    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    pub fn select_state(&self, state: &str) {
        self.with_state(|s| s.set_state(state));
    }

    pub fn select_level(&self, level: Level) {
        self.with_state(|s| s.set_level(level));
    }

    pub fn toggle_layer(&self, key: LayerKey) -> bool {
        self.with_state(|s| s.toggle_layer(key))
    }

    pub fn set_village(&self, village: &str) {
        self.with_state(|s| s.set_selected_village(village));
    }

    fn begin(&self, action: Action) -> Result<InFlight<'_>, DispatchError> {
        match self.with_state(|s| s.try_begin(action)) {
            Some(token) => Ok(InFlight {
                state: &self.state,
                action,
                token,
            }),
            None => {
                warn!("Rejected {} request: one is already in flight", action);
                self.alerts
                    .alert(Alert::new(AlertKind::InProgress, IN_PROGRESS_MESSAGE));
                Err(DispatchError::InFlight(action))
            }
        }
    }

    fn fail(&self, kind: AlertKind, message: &str, err: DispatchError) -> DispatchError {
        error!("{}", err);
        self.alerts.alert(Alert::new(kind, message));
        err
    }

    /// Fetch the IFR layer for the current selection and replace the overlay.
    ///
    /// On failure the previous overlay is kept.
    pub async fn load_layer(&self) -> Result<(), DispatchError> {
        let _in_flight = self.begin(Action::LoadLayer)?;
        let layer_name = self.with_state(|s| s.selection().layer_name(WFS_LAYER));
        info!("Loading WFS layer {}", layer_name);

        match self.client.fetch_layer(&layer_name).await {
            Ok(payload) => {
                self.with_state(|s| s.replace_geo_payload(payload));
                Ok(())
            }
            Err(err) => Err(self.fail(AlertKind::LoadFailed, LOAD_FAILED_MESSAGE, err.into())),
        }
    }

    /// Scan a document and extract entities from it.
    ///
    /// With no file selected this does nothing. The recognised text is stored
    /// as soon as OCR succeeds, so a NER failure keeps it while leaving the
    /// previous entities in place.
    pub async fn upload_document(
        &self,
        path: Option<&Path>,
    ) -> Result<Option<Extraction>, DispatchError> {
        let Some(path) = path else {
            return Ok(None);
        };
        let _in_flight = self.begin(Action::ScanDocument)?;

        let upload = match DocumentUpload::from_path(path).await {
            Ok(upload) => upload,
            Err(err) => {
                return Err(self.fail(
                    AlertKind::RequestFailed,
                    DOCUMENT_FAILED_MESSAGE,
                    err.into(),
                ))
            }
        };

        let pipeline = DocumentPipeline::new(&self.client);
        let result = pipeline
            .run(&upload, |text| {
                self.with_state(|s| s.set_extracted_text(text.to_string()))
            })
            .await;

        match result {
            Ok(extraction) => {
                self.with_state(|s| s.set_entities(extraction.entities.clone()));
                Ok(Some(extraction))
            }
            Err(err) => Err(self.fail(
                AlertKind::RequestFailed,
                DOCUMENT_FAILED_MESSAGE,
                err.into(),
            )),
        }
    }

    /// Request recommendations for a village in the selected state.
    ///
    /// An empty identifier is rejected before any request is made.
    pub async fn request_recommendation(
        &self,
        village_id: Option<&str>,
    ) -> Result<(), DispatchError> {
        let village_id = match village_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                self.alerts
                    .alert(Alert::new(AlertKind::MissingInput, MISSING_VILLAGE_MESSAGE));
                return Err(DispatchError::MissingVillage);
            }
        };
        let _in_flight = self.begin(Action::Recommend)?;
        let state = self.with_state(|s| s.selection().state.clone());

        match self.client.recommend(village_id, &state).await {
            Ok(recommendation) => {
                self.with_state(|s| s.replace_recommendation(recommendation));
                Ok(())
            }
            Err(err) => Err(self.fail(AlertKind::RequestFailed, DSS_FAILED_MESSAGE, err.into())),
        }
    }
}
