//! Common Handler Utilities
//!
//! Parameter extraction and response shaping shared by the namespace handlers.

use serde_json::{json, Value};

use crate::common::{AppError, AppResult};

// ────────────────────────────────────────────────────────────────────────────
// Parameter Extraction Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Extract a required string parameter
pub fn require_string<'a>(params: &'a Value, key: &str) -> AppResult<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::missing_param(key))
}

/// Extract an optional string parameter
pub fn optional_string<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// Extract a string parameter with a default value
pub fn string_with_default<'a>(params: &'a Value, key: &str, default: &'a str) -> &'a str {
    optional_string(params, key).unwrap_or(default)
}

/// Extract an optional u64 parameter
pub fn optional_u64(params: &Value, key: &str) -> Option<u64> {
    params.get(key).and_then(|v| v.as_u64())
}

/// Extract an optional u32 parameter, rejecting values that don't fit
pub fn optional_u32(params: &Value, key: &str) -> AppResult<Option<u32>> {
    optional_u64(params, key)
        .map(|n| {
            u32::try_from(n).map_err(|_| AppError::invalid_input(format!("--{} is too large: {}", key, n)))
        })
        .transpose()
}

/// Extract an optional count such as `max-results`
pub fn optional_usize(params: &Value, key: &str) -> Option<usize> {
    optional_u64(params, key).map(|n| usize::try_from(n).unwrap_or(usize::MAX))
}

/// Extract a bool parameter with a default value
pub fn bool_with_default(params: &Value, key: &str, default: bool) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Extract an optional array of strings
pub fn optional_string_array(params: &Value, key: &str) -> Option<Vec<String>> {
    params.get(key).and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}

/// Extract an array of strings, empty when absent
pub fn string_array(params: &Value, key: &str) -> Vec<String> {
    optional_string_array(params, key).unwrap_or_default()
}

/// Parse a string parameter holding JSON text (e.g. `--values '[["a",1]]'`)
pub fn require_json(params: &Value, key: &str) -> AppResult<Value> {
    let raw = require_string(params, key)?;
    serde_json::from_str(raw)
        .map_err(|e| AppError::invalid_input(format!("--{} is not valid JSON: {}", key, e)))
}

// ────────────────────────────────────────────────────────────────────────────
// Response Helpers
// ────────────────────────────────────────────────────────────────────────────

/// `{ <field>: [...], "count": n }`
pub fn list_response(field: &str, items: Vec<Value>) -> Value {
    let count = items.len();
    json!({ field: items, "count": count })
}

/// Plain confirmation for mutations whose API reply is empty
pub fn done(fields: Value) -> Value {
    let mut out = json!({ "success": true });
    if let (Some(out), Some(fields)) = (out.as_object_mut(), fields.as_object()) {
        out.extend(fields.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_string() {
        let params = json!({"id": "abc", "n": 3});
        assert_eq!(require_string(&params, "id").unwrap(), "abc");
        let err = require_string(&params, "n").unwrap_err();
        assert_eq!(err.message, "Missing required parameter: n");
    }

    #[test]
    fn test_string_with_default() {
        let params = json!({"role": "writer", "type": 7});
        assert_eq!(string_with_default(&params, "role", "reader"), "writer");
        assert_eq!(string_with_default(&params, "kind", "text"), "text");
        assert_eq!(string_with_default(&params, "type", "user"), "user");
    }

    #[test]
    fn test_numbers() {
        let params = json!({"rows": 2, "huge": 5_000_000_000u64});
        assert_eq!(optional_u32(&params, "rows").unwrap(), Some(2));
        assert_eq!(optional_u32(&params, "missing").unwrap(), None);
        assert!(optional_u32(&params, "huge").is_err());
        assert_eq!(optional_usize(&params, "rows"), Some(2));
    }

    #[test]
    fn test_arrays_and_flags() {
        let params = json!({"to": ["a@x.com", "b@x.com"], "bold": true});
        assert_eq!(string_array(&params, "to"), vec!["a@x.com", "b@x.com"]);
        assert!(string_array(&params, "cc").is_empty());
        assert!(bool_with_default(&params, "bold", false));
        assert!(!bool_with_default(&params, "italic", false));
    }

    #[test]
    fn test_require_json() {
        let params = json!({"values": "[[\"a\", 1]]", "bad": "[1,"});
        assert_eq!(require_json(&params, "values").unwrap(), json!([["a", 1]]));
        assert!(require_json(&params, "bad").is_err());
    }

    #[test]
    fn test_response_helpers() {
        let list = list_response("files", vec![json!({"id": "1"})]);
        assert_eq!(list["count"], 1);
        assert_eq!(done(json!({"id": "x"})), json!({"success": true, "id": "x"}));
    }
}
