//! In-process mock of the atlas backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Notify;

use fra_atlas::api::AtlasClient;
use fra_atlas::dashboard::{Dashboard, RecordingAlerts};
use fra_atlas::models::Selection;

#[derive(Default)]
pub struct Backend {
    pub wfs_calls: AtomicUsize,
    pub ocr_calls: AtomicUsize,
    pub ner_calls: AtomicUsize,
    pub dss_calls: AtomicUsize,

    pub fail_wfs: AtomicBool,
    pub fail_ocr: AtomicBool,
    pub fail_ner: AtomicBool,
    pub fail_dss: AtomicBool,
    /// Answer NER with a villages list holding a non-string
    pub malformed_ner: AtomicBool,

    /// Hold WFS responses until `release` is notified
    pub hold_wfs: AtomicBool,
    pub release: Notify,

    pub layers: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub ner_texts: Mutex<Vec<String>>,
    pub dss_bodies: Mutex<Vec<Value>>,
}

pub fn feature_collection(layer: &str) -> Value {
    json!({
        "type": "FeatureCollection",
        "name": layer,
        "features": [
            {
                "type": "Feature",
                "properties": {"claim_id": "IFR-001", "status": "granted"},
                "geometry": {"type": "Point", "coordinates": [78.65, 23.25]}
            },
            {
                "type": "Feature",
                "properties": {"claim_id": "IFR-002", "status": "pending"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[77.5, 22.0], [78.0, 22.0], [78.0, 22.5], [77.5, 22.0]]]
                }
            }
        ]
    })
}

async fn wfs(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    backend.wfs_calls.fetch_add(1, Ordering::SeqCst);
    let layer = params.get("layer").cloned().unwrap_or_default();
    backend.layers.lock().unwrap().push(layer.clone());

    if backend.hold_wfs.load(Ordering::SeqCst) {
        backend.release.notified().await;
    }
    if backend.fail_wfs.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(feature_collection(&layer)))
}

async fn ocr(
    State(backend): State<Arc<Backend>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    backend.ocr_calls.fetch_add(1, Ordering::SeqCst);
    if backend.fail_ocr.load(Ordering::SeqCst) {
        return Err(StatusCode::BAD_GATEWAY);
    }

    let mut size = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        size = bytes.len();
        backend.uploads.lock().unwrap().push((name, file_name, size));
    }

    Ok(Json(json!({
        "text": format!("Form A claim, village Khairi, {} bytes", size)
    })))
}

async fn ner(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.ner_calls.fetch_add(1, Ordering::SeqCst);
    let text = body["text"].as_str().unwrap_or_default().to_string();
    backend.ner_texts.lock().unwrap().push(text);

    if backend.fail_ner.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    if backend.malformed_ner.load(Ordering::SeqCst) {
        return Ok(Json(json!({
            "entities": {"villages": ["Khairi", 12], "claimants": ["R. Bai"]}
        })));
    }
    Ok(Json(json!({
        "entities": {"villages": ["Khairi", "Bhanpur"], "claimants": ["R. Bai"]}
    })))
}

async fn dss(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.dss_calls.fetch_add(1, Ordering::SeqCst);
    backend.dss_bodies.lock().unwrap().push(body.clone());

    if backend.fail_dss.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({
        "villageId": body["villageId"],
        "schemes": ["PM-KISAN", "Jal Jeevan Mission"],
        "priority": "high"
    })))
}

/// Serve the mock backend on an ephemeral port and return its base URL
pub async fn spawn_backend(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/api/wfs", get(wfs))
        .route("/api/ocr", post(ocr))
        .route("/api/ner", post(ner))
        .route("/api/dss/recommend", post(dss))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn dashboard() -> (Dashboard, Arc<Backend>, Arc<RecordingAlerts>) {
    let backend = Arc::new(Backend::default());
    let url = spawn_backend(backend.clone()).await;
    let alerts = Arc::new(RecordingAlerts::default());
    let client = AtlasClient::new(&url, None).unwrap();
    let dashboard = Dashboard::new(client, Selection::default(), alerts.clone());
    (dashboard, backend, alerts)
}

/// Write a fake scan with the given extension and size
pub fn scan_file(suffix: &str, size: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(&vec![0x42; size]).unwrap();
    file.flush().unwrap();
    file
}
