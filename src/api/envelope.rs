//! Backend-compatibility shim for response envelopes.
//!
//! Some Findora endpoints return bare payloads (`[...]`, `{...}`) and others
//! wrap them as `{"data": ...}`. Every response is decoded through this
//! module exactly once, at the HTTP boundary, so nothing above `api` ever
//! sees the difference.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Strip a `{"data": ...}` wrapper if present
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a list from either `[...]` or `{"data": [...]}`.
///
/// `null` (and `{"data": null}`) decode as an empty list.
pub fn normalize_list<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    match unwrap_data(value) {
        Value::Null => Ok(Vec::new()),
        list @ Value::Array(_) => Ok(serde_json::from_value(list)?),
        other => Err(ApiError::Decode(format!(
            "expected a list, got {}",
            kind_name(&other)
        ))),
    }
}

/// Decode a single item from either `{...}` or `{"data": {...}}`
pub fn normalize_item<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(unwrap_data(value))?)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_list_shapes() {
        let bare: Vec<Item> = normalize_list(json!([{"id": 1}, {"id": 2}])).unwrap();
        let wrapped: Vec<Item> = normalize_list(json!({"data": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_null_list_is_empty() {
        let empty: Vec<Item> = normalize_list(Value::Null).unwrap();
        assert!(empty.is_empty());
        let empty: Vec<Item> = normalize_list(json!({"data": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_list_rejects_object() {
        let err = normalize_list::<Item>(json!({"id": 1})).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_item_shapes() {
        let bare: Item = normalize_item(json!({"id": 5})).unwrap();
        let wrapped: Item = normalize_item(json!({"data": {"id": 5}})).unwrap();
        assert_eq!(bare, wrapped);
    }
}
