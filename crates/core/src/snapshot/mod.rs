//! Normalized HTTP response snapshots.
//!
//! A [`Snapshot`] is produced fresh on every probe and never mutated
//! afterwards. Two snapshots are data-equivalent when their bodies are
//! structurally equal; status, headers and latency are transport noise.

pub mod compare;
pub mod hash;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use compare::{bodies_equal, describe_pointer, equal, first_difference};
pub use hash::fingerprint;

/// Response body as observed on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Body {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that failed to parse as JSON, kept verbatim.
    Text(String),
}

impl Body {
    /// Parse a raw body: JSON first, falling back to (lossy) text.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Whether the body carries no usable data (`null`, `""`, or empty text).
    pub fn is_blank(&self) -> bool {
        match self {
            Body::Json(Value::Null) => true,
            Body::Json(Value::String(s)) | Body::Text(s) => s.is_empty(),
            Body::Json(_) => false,
        }
    }
}

/// A captured response from a single GET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub url: String,
    pub status: u16,
    pub body: Body,
    pub duration_ms: u64,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// SHA-256 fingerprint of the body, for logs and failure detail.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.body)
    }
}
