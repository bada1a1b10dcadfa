//! Core data models for the atlas.

pub mod documents;
pub mod selection;

pub use documents::{Entities, GeoPayload, Recommendation, Stamped};
pub use selection::{build_layer_name, LayerKey, LayerToggles, Level, Selection, FOCUS_STATES};
