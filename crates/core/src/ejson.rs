//! Extended JSON encoding for store-native types.
//!
//! Plain JSON cannot express the store's typed values, so they travel as
//! single-key wrapper objects:
//!
//! | Type | Canonical | Relaxed |
//! |------|-----------|---------|
//! | ObjectId | `{"$oid": "<24 hex>"}` | same |
//! | DateTime | `{"$date": {"$numberLong": "<ms>"}}` | `{"$date": "<ISO-8601>"}` (years 1970-9999) |
//! | Int | `{"$numberLong": "<n>"}` | `<n>` |
//! | Float | `{"$numberDouble": "<f>"}` | `<f>` when finite |
//! | Binary | `{"$binary": {"base64": "<b64>", "subType": "00"}}` | same |
//!
//! Parsing accepts both modes plus `$numberInt` and a bare number under `$date`.
//! An object is treated as a wrapper only when it has exactly one key; a
//! recognised wrapper key with an undecodable payload is an error, unknown
//! `$`-keys are ordinary fields.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::datetime::DateTime;
use crate::document::Document;
use crate::object_id::ObjectId;
use crate::value::Value;

/// Wrapper key for typed ids
pub const OID_KEY: &str = "$oid";
/// Wrapper key for timestamps
pub const DATE_KEY: &str = "$date";
/// Wrapper key for 64-bit integers
pub const NUMBER_LONG_KEY: &str = "$numberLong";
/// Wrapper key for 32-bit integers
pub const NUMBER_INT_KEY: &str = "$numberInt";
/// Wrapper key for doubles
pub const NUMBER_DOUBLE_KEY: &str = "$numberDouble";
/// Wrapper key for binary data
pub const BINARY_KEY: &str = "$binary";

/// Output flavour of extended JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Type-preserving: every number is wrapped
    Canonical,
    /// Human-friendly: numbers and recent dates render natively
    #[default]
    Relaxed,
}

/// Failure to decode extended JSON
#[derive(Debug, Error)]
pub enum EjsonError {
    /// Input is not JSON at all
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A wrapper object carried an undecodable payload
    #[error("invalid {key} wrapper: {reason}")]
    InvalidWrapper {
        /// Wrapper key (e.g. `$oid`)
        key: &'static str,
        /// What was wrong with the payload
        reason: String,
    },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> EjsonError {
    EjsonError::InvalidWrapper {
        key,
        reason: reason.into(),
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse an extended-JSON string
pub fn parse(s: &str) -> Result<Value, EjsonError> {
    let json: JsonValue = serde_json::from_str(s)?;
    from_json(&json)
}

/// Convert parsed JSON into a [`Value`], decoding wrapper objects
pub fn from_json(json: &JsonValue) -> Result<Value, EjsonError> {
    match json {
        JsonValue::Array(arr) => Ok(Value::Array(
            arr.iter().map(from_json).collect::<Result<_, _>>()?,
        )),
        JsonValue::Object(obj) => {
            if let Some(value) = decode_wrapper(obj)? {
                return Ok(value);
            }
            let mut doc = Document::new();
            for (k, v) in obj {
                doc.insert(k.clone(), from_json(v)?);
            }
            Ok(Value::Document(doc))
        }
        scalar => Ok(Value::from_json(scalar)),
    }
}

fn decode_wrapper(obj: &Map<String, JsonValue>) -> Result<Option<Value>, EjsonError> {
    if obj.len() != 1 {
        return Ok(None);
    }
    let Some((key, payload)) = obj.iter().next() else {
        return Ok(None);
    };

    let value = match key.as_str() {
        OID_KEY => {
            let hex = payload
                .as_str()
                .ok_or_else(|| invalid(OID_KEY, "payload is not a string"))?;
            let oid = ObjectId::parse_str(hex).map_err(|e| invalid(OID_KEY, e.to_string()))?;
            Value::ObjectId(oid)
        }
        DATE_KEY => Value::DateTime(decode_date(payload)?),
        NUMBER_LONG_KEY => Value::Int(decode_int_string(payload, NUMBER_LONG_KEY)?),
        NUMBER_INT_KEY => {
            let n = decode_int_string(payload, NUMBER_INT_KEY)?;
            i32::try_from(n).map_err(|_| invalid(NUMBER_INT_KEY, "out of 32-bit range"))?;
            Value::Int(n)
        }
        NUMBER_DOUBLE_KEY => {
            let s = payload
                .as_str()
                .ok_or_else(|| invalid(NUMBER_DOUBLE_KEY, "payload is not a string"))?;
            Value::Float(parse_double(s).ok_or_else(|| invalid(NUMBER_DOUBLE_KEY, s))?)
        }
        BINARY_KEY => Value::Binary(decode_binary(payload)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Decode the payload of a `$date` wrapper
///
/// Accepts an ISO-8601 string, `{"$numberLong": "<ms>"}` or a bare number.
pub fn decode_date(payload: &JsonValue) -> Result<DateTime, EjsonError> {
    match payload {
        JsonValue::String(s) => {
            DateTime::parse_rfc3339(s).ok_or_else(|| invalid(DATE_KEY, format!("bad date {s:?}")))
        }
        JsonValue::Number(n) => n
            .as_i64()
            .map(DateTime::from_millis)
            .or_else(|| n.as_f64().and_then(DateTime::from_float_millis))
            .ok_or_else(|| invalid(DATE_KEY, "number out of range")),
        JsonValue::Object(inner) => match inner.get(NUMBER_LONG_KEY) {
            Some(ms) if inner.len() == 1 => {
                Ok(DateTime::from_millis(decode_int_string(ms, DATE_KEY)?))
            }
            _ => Err(invalid(DATE_KEY, "expected {\"$numberLong\": \"<ms>\"}")),
        },
        _ => Err(invalid(DATE_KEY, "unsupported payload")),
    }
}

fn decode_int_string(payload: &JsonValue, key: &'static str) -> Result<i64, EjsonError> {
    let s = payload
        .as_str()
        .ok_or_else(|| invalid(key, "payload is not a string"))?;
    s.parse::<i64>().map_err(|e| invalid(key, e.to_string()))
}

fn decode_binary(payload: &JsonValue) -> Result<Vec<u8>, EjsonError> {
    let encoded = payload
        .get("base64")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| invalid(BINARY_KEY, "missing base64 field"))?;
    BASE64
        .decode(encoded)
        .map_err(|e| invalid(BINARY_KEY, e.to_string()))
}

fn parse_double(s: &str) -> Option<f64> {
    match s {
        "NaN" => Some(f64::NAN),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a [`Value`] as extended JSON
pub fn to_json(value: &Value, mode: Mode) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => match mode {
            Mode::Relaxed => JsonValue::Number((*i).into()),
            Mode::Canonical => json!({ NUMBER_LONG_KEY: i.to_string() }),
        },
        Value::Float(f) => float_to_json(*f, mode),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::ObjectId(oid) => json!({ OID_KEY: oid.to_hex() }),
        Value::DateTime(ts) => {
            if mode == Mode::Relaxed && ts.is_relaxed_renderable() {
                json!({ DATE_KEY: ts.to_rfc3339() })
            } else {
                json!({ DATE_KEY: { NUMBER_LONG_KEY: ts.as_millis().to_string() } })
            }
        }
        Value::Binary(b) => json!({ BINARY_KEY: { "base64": BASE64.encode(b), "subType": "00" } }),
        Value::Array(arr) => JsonValue::Array(arr.iter().map(|v| to_json(v, mode)).collect()),
        Value::Document(doc) => document_to_json(doc, mode),
    }
}

/// Render a [`Document`] as an extended-JSON object
pub fn document_to_json(doc: &Document, mode: Mode) -> JsonValue {
    let obj: Map<String, JsonValue> = doc
        .iter()
        .map(|(k, v)| (k.clone(), to_json(v, mode)))
        .collect();
    JsonValue::Object(obj)
}

/// Render a [`Value`] as an extended-JSON string
pub fn to_string(value: &Value, mode: Mode) -> String {
    to_json(value, mode).to_string()
}

// =============================================================================
// Serde adapters (canonical mode, lossless)
// =============================================================================

/// Serialize a [`Value`] as canonical extended JSON
///
/// Use with `#[serde(serialize_with = "ejson::serialize_value")]`.
pub fn serialize_value<S>(value: &Value, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    to_json(value, Mode::Canonical).serialize(serializer)
}

/// Deserialize a [`Value`] from extended JSON
pub fn deserialize_value<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let json = JsonValue::deserialize(deserializer)?;
    from_json(&json).map_err(de::Error::custom)
}

/// Serialize a [`Document`] as canonical extended JSON
pub fn serialize_document<S>(doc: &Document, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    document_to_json(doc, Mode::Canonical).serialize(serializer)
}

/// Deserialize a [`Document`] from extended JSON
pub fn deserialize_document<'de, D>(deserializer: D) -> Result<Document, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_value(deserializer)? {
        Value::Document(doc) => Ok(doc),
        other => Err(de::Error::custom(format!(
            "expected a document, got {}",
            other.type_tag()
        ))),
    }
}

fn float_to_json(f: f64, mode: Mode) -> JsonValue {
    if mode == Mode::Relaxed {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return JsonValue::Number(n);
        }
    }
    let text = if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f.is_sign_positive() { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    };
    json!({ NUMBER_DOUBLE_KEY: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    const HEX: &str = "6945cd5054b616d899e8f4e8";

    #[test]
    fn test_parse_oid_wrapper() {
        let v = parse(r#"{"$oid":"6945cd5054b616d899e8f4e8"}"#).unwrap();
        assert_eq!(v, Value::ObjectId(ObjectId::parse_str(HEX).unwrap()));
    }

    #[test]
    fn test_parse_invalid_oid_is_error() {
        let err = parse(r#"{"$oid":"nothex"}"#).unwrap_err();
        assert!(matches!(err, EjsonError::InvalidWrapper { key: "$oid", .. }));
    }

    #[test]
    fn test_parse_syntax_error() {
        assert!(matches!(parse("{not json"), Err(EjsonError::Syntax(_))));
    }

    #[test]
    fn test_parse_date_forms() {
        let iso = parse(r#"{"$date":"2024-01-01T00:00:00Z"}"#).unwrap();
        let long = parse(r#"{"$date":{"$numberLong":"1704067200000"}}"#).unwrap();
        let num = parse(r#"{"$date":1704067200000}"#).unwrap();
        let expected = Value::DateTime(DateTime::from_millis(1_704_067_200_000));
        assert_eq!(iso, expected);
        assert_eq!(long, expected);
        assert_eq!(num, expected);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse(r#"{"$numberLong":"42"}"#).unwrap(), Value::Int(42));
        assert_eq!(parse(r#"{"$numberInt":"-7"}"#).unwrap(), Value::Int(-7));
        assert!(parse(r#"{"$numberInt":"9999999999"}"#).is_err());
        assert_eq!(parse(r#"{"$numberDouble":"1.5"}"#).unwrap(), Value::Float(1.5));
        assert!(matches!(
            parse(r#"{"$numberDouble":"NaN"}"#).unwrap(),
            Value::Float(f) if f.is_nan()
        ));
    }

    #[test]
    fn test_parse_binary() {
        let v = parse(r#"{"$binary":{"base64":"AQID","subType":"00"}}"#).unwrap();
        assert_eq!(v, Value::Binary(vec![1, 2, 3]));
    }

    #[test]
    fn test_multi_key_object_is_not_a_wrapper() {
        let v = parse(r#"{"$oid":"6945cd5054b616d899e8f4e8","x":1}"#).unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(d.get("$oid"), Some(&Value::from(HEX)));
        assert_eq!(d.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_unknown_dollar_key_is_plain_field() {
        let v = parse(r#"{"$where":"x"}"#).unwrap();
        assert_eq!(v.as_document().unwrap().get("$where"), Some(&Value::from("x")));
    }

    #[test]
    fn test_nested_wrappers_decode() {
        let v = parse(r#"{"a":[{"$oid":"6945cd5054b616d899e8f4e8"}],"b":{"c":{"$numberLong":"5"}}}"#)
            .unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(
            d.get("a").unwrap().as_array().unwrap()[0],
            Value::ObjectId(ObjectId::parse_str(HEX).unwrap())
        );
        assert_eq!(
            d.get("b").unwrap().as_document().unwrap().get("c"),
            Some(&Value::Int(5))
        );
    }

    #[test]
    fn test_relaxed_rendering() {
        let oid = ObjectId::parse_str(HEX).unwrap();
        let d = doc! {
            "_id" => oid,
            "n" => 3i64,
            "f" => 1.5,
            "when" => DateTime::from_millis(1_704_067_200_000),
        };
        let out = document_to_json(&d, Mode::Relaxed);
        assert_eq!(
            out,
            json!({
                "_id": { "$oid": HEX },
                "n": 3,
                "f": 1.5,
                "when": { "$date": "2024-01-01T00:00:00.000Z" }
            })
        );
    }

    #[test]
    fn test_canonical_rendering() {
        let d = doc! {
            "n" => 3i64,
            "f" => 2.0,
            "when" => DateTime::from_millis(5),
        };
        let out = document_to_json(&d, Mode::Canonical);
        assert_eq!(
            out,
            json!({
                "n": { "$numberLong": "3" },
                "f": { "$numberDouble": "2.0" },
                "when": { "$date": { "$numberLong": "5" } }
            })
        );
    }

    #[test]
    fn test_relaxed_special_floats_are_wrapped() {
        assert_eq!(
            to_json(&Value::Float(f64::INFINITY), Mode::Relaxed),
            json!({ "$numberDouble": "Infinity" })
        );
    }

    #[derive(Serialize, Deserialize)]
    struct Envelope {
        #[serde(serialize_with = "serialize_value", deserialize_with = "deserialize_value")]
        id: Value,
        #[serde(
            serialize_with = "serialize_document",
            deserialize_with = "deserialize_document"
        )]
        body: Document,
    }

    #[test]
    fn test_serde_adapters_keep_types() {
        let env = Envelope {
            id: Value::from(HEX),
            body: doc! { "_id" => ObjectId::parse_str(HEX).unwrap(), "n" => 1i64 },
        };
        let text = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back.id, Value::from(HEX));
        assert_eq!(back.body, env.body);
    }

    #[test]
    fn test_deserialize_document_rejects_scalar() {
        let text = r#"{"id":"x","body":5}"#;
        assert!(serde_json::from_str::<Envelope>(text).is_err());
    }

    #[test]
    fn test_canonical_text_reparses_to_same_value() {
        let v = Value::Document(doc! {
            "_id" => ObjectId::parse_str(HEX).unwrap(),
            "bin" => Value::Binary(vec![0, 255]),
            "old" => DateTime::from_millis(-5),
        });
        let text = to_string(&v, Mode::Canonical);
        assert!(parse(&text).unwrap().is_identical(&v));
    }
}
