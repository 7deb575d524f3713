//! Token blobs.
//!
//! A token is whatever the concrete provider needs to remember (a bare
//! string, an OAuth 1 key/secret pair, an OAuth 2 response). It is kept in
//! the session as an opaque blob: the token serialized to JSON text.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Serialize a token into the blob stored in the session.
pub fn encode<T: Serialize + ?Sized>(token: &T) -> Result<String> {
    Ok(serde_json::to_string(token)?)
}

pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T> {
    Ok(serde_json::from_str(blob)?)
}

/// Loose emptiness: null, false, zero, "", "0", [] and {} count as empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Blob text held in a session value, if there is a non-empty one.
pub(crate) fn blob_of(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(blob)) if !blob.is_empty() => Some(blob),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OAuth1Token {
        oauth_token: String,
        oauth_token_secret: String,
    }

    #[test]
    fn test_structured_token_blob() {
        let token = OAuth1Token {
            oauth_token: "abc".to_string(),
            oauth_token_secret: "s3cret".to_string(),
        };
        let blob = encode(&token).unwrap();
        assert!(blob.contains("s3cret"));
        assert_eq!(decode::<OAuth1Token>(&blob).unwrap(), token);
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let blob = encode("plain").unwrap();
        assert!(decode::<OAuth1Token>(&blob).is_err());
    }

    #[test]
    fn test_is_empty_value() {
        for empty in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(is_empty_value(&empty), "{} should be empty", empty);
        }
        for full in [json!(true), json!(1), json!("t"), json!("00"), json!([0]), json!({"a": null})] {
            assert!(!is_empty_value(&full), "{} should not be empty", full);
        }
    }

    #[test]
    fn test_blob_of() {
        assert_eq!(blob_of(Some(json!("\"abc\""))), Some("\"abc\"".to_string()));
        assert_eq!(blob_of(Some(json!(""))), None);
        assert_eq!(blob_of(Some(json!(12))), None);
        assert_eq!(blob_of(None), None);
    }
}
