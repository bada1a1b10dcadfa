//! Text rendering of the dashboard panels.

use std::fmt::Write;

use crate::map::{MapViewport, Overlay};
use crate::models::LayerToggles;
use crate::state::ViewState;

/// Sidebar controls: selection, layer toggles and the busy indicator
pub fn controls_panel(state: &ViewState) -> String {
    let mut out = String::from("FRA Atlas Controls\n");
    let selection = state.selection();
    let _ = writeln!(out, "State (Focus): {}", selection.state);
    let _ = writeln!(out, "Level: {}", selection.level.label());
    let _ = writeln!(out, "Layers: {}", toggles_line(state.layers()));
    if let Some(village) = state.selected_village() {
        let _ = writeln!(out, "Village ID: {}", village);
    }
    if state.is_busy() {
        out.push_str("Loading...\n");
    }
    out
}

fn toggles_line(toggles: &LayerToggles) -> String {
    toggles
        .iter()
        .map(|(key, active)| format!("[{}] {}", if active { "x" } else { " " }, key))
        .collect::<Vec<_>>()
        .join("  ")
}

/// OCR text and NER villages. Each part is omitted when there is nothing to show.
pub fn documents_panel(state: &ViewState) -> String {
    let mut out = String::new();
    if !state.extracted_text().is_empty() {
        let _ = writeln!(out, "OCR Text:\n{}", state.extracted_text());
    }
    if let Some(villages) = &state.entities().villages {
        let _ = writeln!(out, "NER Villages:\n{}", villages.join(", "));
    }
    out
}

pub fn recommendation_panel(state: &ViewState) -> String {
    match state.recommendation() {
        Some(rec) => format!("Recommendations\n{}\n", rec.value.pretty()),
        None => String::new(),
    }
}

/// Base layer and overlay summary
pub fn map_panel(viewport: &MapViewport, state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Map: center {:.4}, {:.4} zoom {}",
        viewport.center[0], viewport.center[1], viewport.zoom
    );
    let _ = writeln!(out, "Base tile: {}", viewport.tile_url(viewport.center_tile()));

    match state.geo_payload() {
        Some(payload) => {
            let overlay = Overlay::from_payload(&payload.value);
            let _ = write!(
                out,
                "Overlay: {} features (loaded {})",
                overlay.feature_count,
                payload.received_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            if let Some(bounds) = overlay.bounds {
                let _ = write!(
                    out,
                    " bounds [{:.4}, {:.4}] - [{:.4}, {:.4}]",
                    bounds.min().x,
                    bounds.min().y,
                    bounds.max().x,
                    bounds.max().y
                );
            }
            out.push('\n');
        }
        None => out.push_str("Overlay: none\n"),
    }
    out
}

/// Every panel, sidebar first
pub fn dashboard(viewport: &MapViewport, state: &ViewState) -> String {
    [
        controls_panel(state),
        documents_panel(state),
        recommendation_panel(state),
        map_panel(viewport, state),
    ]
    .into_iter()
    .filter(|panel| !panel.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}
