//! Shared utilities for Google API modules
//!
//! Reduces duplication across the per-product API clients.

use serde_json::{Map, Value};

/// Extract an array field from a JSON response, returning an empty vec if missing.
///
/// Google APIs return lists under varying field names ("items", "messages", "files", "notes").
pub fn extract_array(response: &Value, field: &str) -> Vec<Value> {
    response
        .get(field)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// The `nextPageToken` of a list response, if there is another page
pub fn next_page_token(response: &Value) -> Option<String> {
    response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Copy the named top-level fields that are present into a new object.
pub fn pick(source: &Value, fields: &[&str]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(v) = source.get(*field) {
            if !v.is_null() {
                out.insert((*field).to_string(), v.clone());
            }
        }
    }
    Value::Object(out)
}

/// Percent-encode an ID for use as a single URL path segment
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array() {
        let response = json!({"files": [{"id": "1"}, {"id": "2"}]});
        assert_eq!(extract_array(&response, "files").len(), 2);
        assert!(extract_array(&response, "items").is_empty());
    }

    #[test]
    fn test_next_page_token() {
        assert_eq!(next_page_token(&json!({"nextPageToken": "abc"})), Some("abc".to_string()));
        assert_eq!(next_page_token(&json!({"nextPageToken": ""})), None);
        assert_eq!(next_page_token(&json!({})), None);
    }

    #[test]
    fn test_pick_skips_missing_and_null() {
        let source = json!({"id": "1", "name": "x", "size": null, "extra": true});
        assert_eq!(pick(&source, &["id", "name", "size", "absent"]), json!({"id": "1", "name": "x"}));
    }

    #[test]
    fn test_segment() {
        assert_eq!(segment("team@example.com"), "team%40example.com");
        assert_eq!(segment("a/b"), "a%2Fb");
    }
}
