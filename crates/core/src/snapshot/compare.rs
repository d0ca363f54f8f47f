//! Structural comparison of snapshot bodies.
//!
//! Key order inside objects is insignificant, element order inside arrays is
//! significant, and numbers compare by value (`1 == 1.0`). Status, headers
//! and latency never take part in the comparison.

use super::{Body, Snapshot};
use serde_json::{Number, Value};

/// Whether two snapshots are data-equivalent.
pub fn equal(a: &Snapshot, b: &Snapshot) -> bool {
    bodies_equal(&a.body, &b.body)
}

/// Whether two bodies are structurally equal.
pub fn bodies_equal(a: &Body, b: &Body) -> bool {
    body_difference(a, b).is_none()
}

/// JSON-pointer path of the first divergence between two snapshots' bodies.
///
/// Returns `None` when the bodies are equal and `Some("")` when they differ at
/// the root (including a JSON body compared against a text body).
pub fn first_difference(a: &Snapshot, b: &Snapshot) -> Option<String> {
    body_difference(&a.body, &b.body)
}

fn body_difference(a: &Body, b: &Body) -> Option<String> {
    match (a, b) {
        (Body::Json(x), Body::Json(y)) => value_difference(x, y, ""),
        (Body::Text(x), Body::Text(y)) if x == y => None,
        _ => Some(String::new()),
    }
}

fn value_difference(a: &Value, b: &Value, path: &str) -> Option<String> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            for (key, left) in x {
                let child = format!("{path}/{}", escape_token(key));
                match y.get(key) {
                    Some(right) => {
                        if let Some(diff) = value_difference(left, right, &child) {
                            return Some(diff);
                        }
                    }
                    None => return Some(child),
                }
            }
            y.keys()
                .find(|key| !x.contains_key(*key))
                .map(|key| format!("{path}/{}", escape_token(key)))
        }
        (Value::Array(x), Value::Array(y)) => {
            for (idx, (left, right)) in x.iter().zip(y).enumerate() {
                if let Some(diff) = value_difference(left, right, &format!("{path}/{idx}")) {
                    return Some(diff);
                }
            }
            if x.len() != y.len() { Some(format!("{path}/{}", x.len().min(y.len()))) } else { None }
        }
        (Value::Number(x), Value::Number(y)) => {
            if numbers_equal(x, y) {
                None
            } else {
                Some(path.to_string())
            }
        }
        _ => {
            if a == b {
                None
            } else {
                Some(path.to_string())
            }
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

/// Escape a key per RFC 6901.
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Human-readable form of a pointer returned by [`first_difference`].
pub fn describe_pointer(pointer: &str) -> String {
    if pointer.is_empty() { "<root>".to_string() } else { pointer.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn snap(body: Body) -> Snapshot {
        Snapshot { url: "https://example.com/v1/bank/index".into(), status: 200, body, duration_ms: 12, headers: BTreeMap::new() }
    }

    #[test]
    fn test_object_key_order_insignificant() {
        let a = snap(Body::Json(serde_json::from_str(r#"{"a":1,"b":{"c":2,"d":3}}"#).unwrap()));
        let b = snap(Body::Json(serde_json::from_str(r#"{"b":{"d":3,"c":2},"a":1}"#).unwrap()));
        assert!(equal(&a, &b));
    }

    #[test]
    fn test_array_order_significant() {
        let a = snap(Body::Json(json!({"items": [1, 2, 3]})));
        let b = snap(Body::Json(json!({"items": [1, 3, 2]})));
        assert!(!equal(&a, &b));
        assert_eq!(first_difference(&a, &b).as_deref(), Some("/items/1"));
    }

    #[test]
    fn test_transport_noise_ignored() {
        let a = snap(Body::Json(json!({"ok": true})));
        let mut b = a.clone();
        b.status = 503;
        b.duration_ms = 9_000;
        b.headers.insert("x-cache".into(), "MISS".into());
        assert!(equal(&a, &b));
    }

    #[test]
    fn test_numeric_value_equality() {
        let a = snap(Body::Json(serde_json::from_str(r#"{"price": 1}"#).unwrap()));
        let b = snap(Body::Json(serde_json::from_str(r#"{"price": 1.0}"#).unwrap()));
        assert!(equal(&a, &b));

        let c = snap(Body::Json(json!({"price": 2})));
        assert_eq!(first_difference(&a, &c).as_deref(), Some("/price"));
    }

    #[test]
    fn test_missing_and_extra_keys() {
        let a = snap(Body::Json(json!({"a": 1})));
        let b = snap(Body::Json(json!({"a": 1, "b": 2})));
        assert_eq!(first_difference(&a, &b).as_deref(), Some("/b"));
        assert_eq!(first_difference(&b, &a).as_deref(), Some("/b"));
    }

    #[test]
    fn test_array_length_mismatch() {
        let a = snap(Body::Json(json!([1, 2])));
        let b = snap(Body::Json(json!([1, 2, 3])));
        assert_eq!(first_difference(&a, &b).as_deref(), Some("/2"));
    }

    #[test]
    fn test_pointer_escaping() {
        let a = snap(Body::Json(json!({"a/b": {"c~d": 1}})));
        let b = snap(Body::Json(json!({"a/b": {"c~d": 2}})));
        assert_eq!(first_difference(&a, &b).as_deref(), Some("/a~1b/c~0d"));
    }

    #[test]
    fn test_text_and_json_never_equal() {
        let a = snap(Body::Text("1".into()));
        let b = snap(Body::Json(json!(1)));
        assert!(!equal(&a, &b));
        assert_eq!(first_difference(&a, &b).map(|p| describe_pointer(&p)).as_deref(), Some("<root>"));
    }

    #[test]
    fn test_text_equality() {
        assert!(bodies_equal(&Body::Text("same".into()), &Body::Text("same".into())));
        assert!(!bodies_equal(&Body::Text("same".into()), &Body::Text("other".into())));
    }
}
