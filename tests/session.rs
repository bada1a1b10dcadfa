mod common;

use std::sync::atomic::Ordering;

use fra_atlas::map::MapViewport;
use fra_atlas::session::Session;

use common::{dashboard, scan_file};

async fn session() -> (Session, std::sync::Arc<common::Backend>) {
    let (dashboard, backend, _) = dashboard().await;
    (Session::new(dashboard, MapViewport::default()), backend)
}

#[tokio::test]
async fn selection_commands_drive_layer_name() {
    let (session, _) = session().await;

    assert_eq!(session.handle_line("state Tripura").await.output, "state: Tripura");
    assert_eq!(session.handle_line("level subdistrict").await.output, "level: subdistrict");
    assert_eq!(
        session.handle_line("layer").await.output,
        "fra:tripura_ifr_subdistrict"
    );
    assert_eq!(
        session.handle_line("state West Bengal").await.output,
        "state: West Bengal (not a focus state)"
    );
}

#[tokio::test]
async fn load_renders_overlay_summary() {
    let (session, backend) = session().await;

    let reply = session.handle_line("load").await;

    assert!(reply.output.contains("Overlay: 2 features"), "{}", reply.output);
    assert!(reply
        .output
        .contains("bounds [77.5000, 22.0000] - [78.6500, 23.2500]"));
    assert_eq!(backend.wfs_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scan_and_recommend_flow() {
    let (session, backend) = session().await;
    let scan = scan_file(".png", 12);

    let reply = session
        .handle_line(&format!("scan {}", scan.path().display()))
        .await;
    assert_eq!(
        reply.output,
        "OCR Text:\nForm A claim, village Khairi, 12 bytes\nNER Villages:\nKhairi, Bhanpur\n"
    );

    // No village yet: rejected without a request
    assert_eq!(session.handle_line("recommend").await.output, "");
    assert_eq!(backend.dss_calls.load(Ordering::SeqCst), 0);

    session.handle_line("village MP-0042").await;
    let reply = session.handle_line("recommend").await;
    assert!(reply.output.starts_with("Recommendations\n{"));
    assert!(reply.output.contains("\"villageId\": \"MP-0042\""));

    let show = session.handle_line("show").await.output;
    assert!(show.contains("Village ID: MP-0042"));
    assert!(show.contains("NER Villages:"));
    assert!(show.contains("Overlay: none"));
}

#[tokio::test]
async fn toggles_and_quit() {
    let (session, _) = session().await;

    assert_eq!(session.handle_line("toggle CR").await.output, "CR: off");
    assert_eq!(session.handle_line("toggle cr").await.output, "CR: on");
    assert!(session.handle_line("toggle roads").await.output.contains("unknown layer"));

    let state = session.dashboard().snapshot();
    assert!(state.layers().iter().all(|(_, active)| active));

    assert!(session.handle_line("quit").await.quit);
    assert!(!session.handle_line("help").await.quit);
}
