//! Payload normalization.
//!
//! Upstream endpoints disagree on envelope and field names. Everything in
//! here is pure: it works on an already-decoded `serde_json::Value` and
//! never fails, it only drops rows or leaves fields empty.

mod history;
mod movers;
pub mod numeric;
mod options;

pub use history::normalize_history;
pub use movers::normalize_movers;
pub use options::normalize_options;

use serde_json::{Map, Value};

/// Envelope keys probed, in order, when the payload is an object.
pub const WRAPPER_KEYS: &[&str] = &["results", "movers", "quotes", "data", "body"];

/// Extracts the row list from a payload of unknown shape.
///
/// - bare array → the array itself
/// - object → the first wrapper key holding a non-empty array
/// - anything else → empty
pub fn unwrap_rows(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|k| {
                map.get(*k)
                    .and_then(Value::as_array)
                    .filter(|rows| !rows.is_empty())
            })
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// First candidate key whose value is present and not blank.
pub(crate) fn first_present<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !is_blank(v))
}

/// First present candidate coerced to a number. A malformed value does not
/// fall through to later candidates; it makes the field absent.
pub(crate) fn first_number(row: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first_present(row, keys).and_then(numeric::coerce_f64)
}

pub(crate) fn first_string(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_present(row, keys)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_sequence_is_used_as_is() {
        let payload = json!([{"symbol": "A"}, {"symbol": "B"}]);
        assert_eq!(unwrap_rows(&payload).len(), 2);
    }

    #[test]
    fn known_wrappers_are_unwrapped() {
        for key in ["results", "movers", "quotes", "data", "body"] {
            let payload = json!({ key: [{"symbol": "A"}] });
            assert_eq!(unwrap_rows(&payload).len(), 1, "wrapper {key}");
        }
    }

    #[test]
    fn empty_wrapper_falls_through_to_next_key() {
        let payload = json!({"results": [], "movers": [{"symbol": "A"}]});
        assert_eq!(unwrap_rows(&payload).len(), 1);
    }

    #[test]
    fn unknown_shapes_yield_nothing() {
        assert!(unwrap_rows(&json!({"weird": [{"symbol": "A"}]})).is_empty());
        assert!(unwrap_rows(&json!("nope")).is_empty());
        assert!(unwrap_rows(&Value::Null).is_empty());
        assert!(unwrap_rows(&json!({"results": {"symbol": "A"}})).is_empty());
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let row = json!({"a": null, "b": "  ", "c": "x"});
        let map = row.as_object().unwrap();
        assert_eq!(first_string(map, &["a", "b", "c"]), Some("x".to_string()));
    }

    #[test]
    fn malformed_first_candidate_does_not_fall_through() {
        let row = json!({"a": "n/a", "b": 3});
        let map = row.as_object().unwrap();
        assert_eq!(first_number(map, &["a", "b"]), None);
    }
}
