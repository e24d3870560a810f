//! JSON message envelopes.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A message of a given kind with an arbitrary JSON payload.
///
/// Serialized as `{"kind": ..., "payload": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: Value) -> Envelope {
        Envelope {
            kind: kind.into(),
            payload,
        }
    }

    /// The envelope reporting a failed request.
    pub fn error(message: impl Into<String>) -> Envelope {
        Envelope::new("error", json!({ "message": message.into() }))
    }

    /// Whether this is an error envelope.
    pub fn is_error(&self) -> bool {
        self.kind == "error"
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Envelope, serde_json::Error> {
        serde_json::from_str(json)
    }
}
