//! `{type, payload}` wire representation shared by triggers, actions, and
//! effects.
//!
//! Built-in variants map to fixed SCREAMING_SNAKE tags; unknown tags
//! deserialize into each family's `Custom` variant so plugin content survives
//! a round trip untouched.

use serde::{Deserialize, Serialize};

/// Raw tagged payload as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "payload_is_empty")]
    pub payload: serde_json::Value,
}

fn payload_is_empty(value: &serde_json::Value) -> bool {
    value.is_null() || value.as_object().is_some_and(|o| o.is_empty())
}

impl Tagged {
    /// Tag with no payload.
    pub fn bare(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Tag with a serialized payload.
    ///
    /// Serialization of payload structs is infallible here; they are plain
    /// field records.
    pub fn with_payload<T: Serialize>(tag: impl Into<String>, payload: &T) -> Self {
        Self {
            tag: tag.into(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Parses the payload into a typed struct.
    pub fn parse_payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, WireError> {
        serde_json::from_value(self.payload.clone()).map_err(|source| WireError::BadPayload {
            tag: self.tag.clone(),
            message: source.to_string(),
        })
    }
}

/// Errors produced while decoding a tagged wire value.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("malformed payload for '{tag}': {message}")]
    BadPayload { tag: String, message: String },
}

impl crate::error::GameError for WireError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        // Wire decoding happens at load time; a bad payload is fatal there.
        crate::error::ErrorSeverity::Fatal
    }
}
