//! View state store.
//!
//! One owned record holding everything the dashboard renders. Fields are
//! private: form controls go through the selection setters, and each
//! dispatcher only writes the fields it owns.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Entities, GeoPayload, LayerKey, LayerToggles, Level, Recommendation, Selection, Stamped,
};

/// Actions that issue network requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    LoadLayer,
    ScanDocument,
    Recommend,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::LoadLayer => write!(f, "layer load"),
            Action::ScanDocument => write!(f, "document scan"),
            Action::Recommend => write!(f, "recommendation"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    selection: Selection,
    layers: LayerToggles,
    geo_payload: Option<Stamped<GeoPayload>>,
    extracted_text: String,
    entities: Entities,
    recommendation: Option<Stamped<Recommendation>>,
    selected_village: Option<String>,
    in_flight: HashMap<Action, Uuid>,
}

impl ViewState {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn layers(&self) -> &LayerToggles {
        &self.layers
    }

    pub fn geo_payload(&self) -> Option<&Stamped<GeoPayload>> {
        self.geo_payload.as_ref()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn recommendation(&self) -> Option<&Stamped<Recommendation>> {
        self.recommendation.as_ref()
    }

    pub fn selected_village(&self) -> Option<&str> {
        self.selected_village.as_deref()
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.selection.state = state.into();
    }

    pub fn set_level(&mut self, level: Level) {
        self.selection.level = level;
    }

    /// Flip one layer's visibility; returns the new value
    pub fn toggle_layer(&mut self, key: LayerKey) -> bool {
        self.layers.toggle(key)
    }

    pub fn set_selected_village(&mut self, village: impl Into<String>) {
        self.selected_village = Some(village.into());
    }

    pub(crate) fn replace_geo_payload(&mut self, payload: GeoPayload) {
        self.geo_payload = Some(Stamped::now(payload));
    }

    pub(crate) fn set_extracted_text(&mut self, text: String) {
        self.extracted_text = text;
    }

    pub(crate) fn set_entities(&mut self, entities: Entities) {
        self.entities = entities;
    }

    pub(crate) fn replace_recommendation(&mut self, recommendation: Recommendation) {
        self.recommendation = Some(Stamped::now(recommendation));
    }

    /// True while any request is outstanding
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight.contains_key(&action)
    }

    /// Claim the in-flight slot for `action`.
    ///
    /// Returns `None` while another request for the same action is outstanding.
    pub(crate) fn try_begin(&mut self, action: Action) -> Option<Uuid> {
        if self.in_flight.contains_key(&action) {
            return None;
        }
        let token = Uuid::new_v4();
        self.in_flight.insert(action, token);
        Some(token)
    }

    /// Release the slot, but only if `token` still owns it
    pub(crate) fn finish(&mut self, action: Action, token: Uuid) {
        if self.in_flight.get(&action) == Some(&token) {
            self.in_flight.remove(&action);
        }
    }
}
