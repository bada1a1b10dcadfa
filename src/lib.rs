//! FRA Atlas - client for the Forest Rights Act claims atlas
//!
//! This library holds the view state, the backend client and the renderers
//! shared by the `atlas` binary.

pub mod api;
pub mod dashboard;
pub mod map;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod state;

pub use dashboard::Dashboard;
pub use models::{build_layer_name, LayerKey, Level, Selection};
pub use state::ViewState;
