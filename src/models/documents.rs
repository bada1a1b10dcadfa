//! Documents returned by the backend services.
//!
//! The atlas treats these as opaque: they are stored and rendered as
//! received, never reshaped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON document served by the WFS endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoPayload(pub Value);

impl GeoPayload {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Entities extracted by the NER service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villages: Option<Vec<String>>,

    /// Any other entity kinds the service reports
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Entities {
    /// Interpret the `entities` field of a NER response.
    ///
    /// A missing or null field is an empty set; anything else must have the
    /// expected shape.
    pub fn from_value(value: Option<Value>) -> Result<Self, serde_json::Error> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v),
        }
    }
}

/// Decision-support recommendation document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendation(pub Value);

impl Recommendation {
    /// Pretty JSON with two-space indentation
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// A value together with the time it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    pub received_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    pub fn now(value: T) -> Self {
        Self {
            value,
            received_at: Utc::now(),
        }
    }
}
