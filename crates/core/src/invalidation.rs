//! Invalidation endpoint response model.
//!
//! The endpoint is expected, but not required, to answer with
//! `{ "success": bool, "tags": [string], "deletedKeys": integer }`. Parsing is
//! lenient: unknown fields are kept, fields of the wrong type count as absent,
//! and a body that is not a JSON object becomes `{ "raw": <text> }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed body of an invalidation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvalidationBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Authoritative purge count when present.
    #[serde(default, rename = "deletedKeys", skip_serializing_if = "Option::is_none")]
    pub deleted_keys: Option<i64>,

    /// Every other field, verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvalidationBody {
    /// Parse raw response bytes.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self::from_map(map),
            _ => {
                let mut extra = Map::new();
                extra.insert("raw".into(), Value::String(String::from_utf8_lossy(bytes).into_owned()));
                Self { extra, ..Default::default() }
            }
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let success = match map.get("success") {
            Some(Value::Bool(b)) => {
                let b = *b;
                map.remove("success");
                Some(b)
            }
            _ => None,
        };

        let tags = match map.get("tags") {
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {
                let tags = items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
                map.remove("tags");
                Some(tags)
            }
            _ => None,
        };

        // Non-integral counts stay in `extra` and read as absent.
        let deleted_keys = match map.get("deletedKeys") {
            Some(Value::Number(n)) => {
                let count = integral(n);
                if count.is_some() {
                    map.remove("deletedKeys");
                }
                count
            }
            _ => None,
        };

        Self { success, tags, deleted_keys, extra: map }
    }
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(count) = n.as_i64() {
        return Some(count);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

/// Result of one call to the invalidation endpoint.
///
/// Non-200 responses are results too; the caller judges them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidationResult {
    pub status: u16,
    pub body: InvalidationBody,
    pub duration_ms: u64,
}

impl InvalidationResult {
    pub fn success(&self) -> bool {
        self.body.success == Some(true)
    }

    pub fn deleted_keys(&self) -> Option<i64> {
        self.body.deleted_keys
    }

    pub fn tags(&self) -> &[String] {
        self.body.tags.as_deref().unwrap_or_default()
    }

    /// Whether the service crashed on this input.
    pub fn is_server_crash(&self) -> bool {
        self.status == 500
    }
}
