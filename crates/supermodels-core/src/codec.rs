//! Metadata value codec.
//!
//! Metadata values are stored in a single TEXT column. Writing encodes a
//! `serde_json::Value` to text; reading recovers a typed value from that text
//! with a fixed precedence chain:
//!
//! ```text
//! empty            → None (caller's default)
//! bool literal     → Bool   ("true" "1" "yes" → true, "false" "0" "no" → false)
//! native payload   → structure   ("msgpack:<base64>")
//! '[' / '{' + JSON → Array / Object
//! anything else    → String
//! ```
//!
//! Booleans are written as `"1"`/`"0"`, so a stored `"1"` always reads back
//! as `true`, including when it was written as the string `"1"` or the
//! number `1`. Numbers read back as their string form.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::CoreError;

/// Tag prefixed to the base64-armored MessagePack form of structured values.
pub const NATIVE_TAG: &str = "msgpack:";

const BOOL_LITERALS: [&str; 6] = ["true", "false", "1", "0", "yes", "no"];
const TRUE_LITERALS: [&str; 3] = ["true", "1", "yes"];

/// Encode a value for the `value` column.
///
/// Returns `None` for `Value::Null`: a null value has no stored form and the
/// callers drop the key instead of writing a row.
///
/// # Errors
///
/// Returns `CoreError::Encoding` if a structured value cannot be serialized.
pub fn encode(value: &Value) -> Result<Option<String>, CoreError> {
    let encoded = match value {
        Value::Null => return Ok(None),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => encode_native(value)?,
    };
    Ok(Some(encoded))
}

/// Serialize a value into the tagged native form.
///
/// # Errors
///
/// Returns `CoreError::Encoding` if MessagePack serialization fails.
pub fn encode_native(value: &Value) -> Result<String, CoreError> {
    let bytes = rmp_serde::to_vec(value).map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(format!("{NATIVE_TAG}{}", STANDARD.encode(bytes)))
}

/// Recover a typed value from its stored text.
///
/// Never fails: a payload that does not deserialize falls through to the
/// next rule, and the last rule returns the raw string.
#[must_use]
pub fn decode(raw: Option<&str>) -> Option<Value> {
    let raw = raw.filter(|s| !s.is_empty())?;

    if BOOL_LITERALS.contains(&raw) {
        return Some(Value::Bool(TRUE_LITERALS.contains(&raw)));
    }
    if let Some(value) = decode_native(raw) {
        return Some(value);
    }
    if let Some(value) = decode_json(raw) {
        return Some(value);
    }
    Some(Value::String(raw.to_string()))
}

/// Like [`decode`], substituting `default` for an empty or absent value.
#[must_use]
pub fn decode_or(raw: Option<&str>, default: Value) -> Value {
    decode(raw).unwrap_or(default)
}

fn decode_native(raw: &str) -> Option<Value> {
    let payload = raw.strip_prefix(NATIVE_TAG)?;
    let bytes = match STANDARD.decode(payload.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::trace!("native payload is not base64, falling through: {e}");
            return None;
        }
    };
    match rmp_serde::from_slice::<Value>(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!("native payload did not deserialize, falling through: {e}");
            None
        }
    }
}

fn decode_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim_start();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if value.is_array() || value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("value looked like JSON but did not parse: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn roundtrip(value: &Value) -> Option<Value> {
        let stored = encode(value).unwrap();
        decode(stored.as_deref())
    }

    #[rstest]
    #[case("true", true)]
    #[case("1", true)]
    #[case("yes", true)]
    #[case("false", false)]
    #[case("0", false)]
    #[case("no", false)]
    fn bool_literals_decode_to_bool(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(decode(Some(raw)), Some(Value::Bool(expected)));
    }

    #[rstest]
    #[case("TRUE")]
    #[case("Yes")]
    #[case(" 1")]
    #[case("01")]
    fn bool_match_is_exact(#[case] raw: &str) {
        assert_eq!(decode(Some(raw)), Some(Value::String(raw.to_string())));
    }

    #[test]
    fn empty_and_absent_use_default() {
        assert_eq!(decode(None), None);
        assert_eq!(decode(Some("")), None);
        assert_eq!(decode_or(Some(""), json!("fallback")), json!("fallback"));
    }

    #[test]
    fn booleans_roundtrip() {
        assert_eq!(roundtrip(&json!(true)), Some(json!(true)));
        assert_eq!(roundtrip(&json!(false)), Some(json!(false)));
    }

    #[test]
    fn string_one_decodes_to_true() {
        assert_eq!(encode(&json!("1")).unwrap().as_deref(), Some("1"));
        assert_eq!(roundtrip(&json!("1")), Some(json!(true)));
        assert_eq!(roundtrip(&json!(1)), Some(json!(true)));
    }

    #[test]
    fn numbers_read_back_as_strings() {
        assert_eq!(roundtrip(&json!("42")), Some(json!("42")));
        assert_eq!(roundtrip(&json!(42)), Some(json!("42")));
        assert_eq!(roundtrip(&json!(2.5)), Some(json!("2.5")));
    }

    #[test]
    fn nested_structures_roundtrip_through_native_form() {
        let value = json!({
            "theme": "dark",
            "limits": {"daily": 10, "ratio": 0.5},
            "tags": ["a", "b", null, true],
        });
        let stored = encode(&value).unwrap().unwrap();
        assert!(stored.starts_with(NATIVE_TAG));
        assert!(serde_json::from_str::<Value>(&stored).is_err(), "not JSON");
        assert_eq!(decode(Some(stored.as_str())), Some(value));
    }

    #[test]
    fn plain_strings_pass_through() {
        assert_eq!(roundtrip(&json!("hello world")), Some(json!("hello world")));
    }

    #[test]
    fn null_has_no_stored_form() {
        assert_eq!(encode(&Value::Null).unwrap(), None);
    }

    #[test]
    fn json_text_decodes_to_structure() {
        assert_eq!(
            decode(Some("  {\"a\": [1, 2]}")),
            Some(json!({"a": [1, 2]}))
        );
        assert_eq!(decode(Some("[1,2,3]")), Some(json!([1, 2, 3])));
    }

    #[test]
    fn malformed_payloads_fall_through_to_string() {
        assert_eq!(decode(Some("{not json")), Some(json!("{not json")));
        assert_eq!(
            decode(Some("msgpack:!!not-base64!!")),
            Some(json!("msgpack:!!not-base64!!"))
        );
        assert_eq!(decode(Some("[")), Some(json!("[")));
    }
}
