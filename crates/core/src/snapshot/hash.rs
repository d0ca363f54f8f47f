//! Body fingerprints.
//!
//! Fingerprints identify a body version in logs without dumping the payload.
//! They are not an equivalence test: `1` and `1.0` compare equal but hash
//! differently.

use super::Body;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex fingerprint over the canonical form of a body.
pub fn fingerprint(body: &Body) -> String {
    let mut hasher = Sha256::new();
    match body {
        Body::Json(value) => {
            hasher.update(b"json\n");
            let mut out = String::new();
            write_canonical(value, &mut out);
            hasher.update(out.as_bytes());
        }
        Body::Text(text) => {
            hasher.update(b"text\n");
            hasher.update(text.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// Serialize with object keys sorted, independent of map ordering features.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
