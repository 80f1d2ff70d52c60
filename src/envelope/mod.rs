//! Type-preserving serialization envelope.
//!
//! The backing store holds text, so values that JSON cannot represent natively
//! (timestamps, date-only values, exact decimals) are written as tagged
//! objects of the form `{"val": <text>, "type": <tag>}` and reconstructed on
//! read. JSON-native values pass through untouched. The round trip is lossless
//! for every [`CacheValue`] variant that has an encoding rule.
//!
//! Stored entries use one canonical wrapper shape: a single-key object
//! `{"<cache key>": <encoded result>}`. A sequence result stores as a JSON
//! list, anything else as its own encoding, so the stored form preserves the
//! result's shape — a one-element sequence stays a list. [`unwrap_json`]
//! requires the wrapper key to be present and yields the entry as stored;
//! both the miss path and the hit path serve this same canonical form.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate};
use serde_json::{Map as JsonMap, Value as Json};
use thiserror::Error;

use crate::value::CacheValue;

/// Timestamp wire format: `MM/DD/YYYY hh:mm:ss AM/PM ±zone`.
const DATETIME_AWARE: &str = "%m/%d/%Y %I:%M:%S %p %z";
/// Date-only wire format: `MM/DD/YYYY`.
const DATE_ONLY: &str = "%m/%d/%Y";

const TAG_FIELD: &str = "type";
const VAL_FIELD: &str = "val";

const TAG_DATETIME: &str = "datetime";
const TAG_DATE: &str = "date";
const TAG_DECIMAL: &str = "decimal";

/// A result value contains a member with no encoding rule.
///
/// Recovered locally by the engine: caching is skipped for that call and the
/// handler's result is still returned to the original caller.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("value of type `{0}` has no encoding rule")]
pub struct NotSerializable(pub &'static str);

/// A stored envelope could not be decoded.
///
/// This indicates a store/schema mismatch the engine cannot safely paper
/// over; it is fatal for the single cache read and propagates to the caller.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("stored payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized type tag `{tag}` in stored envelope")]
    UnknownTag { tag: String },

    #[error("malformed `{tag}` value `{val}` in stored envelope")]
    Malformed { tag: &'static str, val: String },

    #[error("stored payload has no entry for key `{key}`")]
    MissingEntry { key: String },
}

/// Encodes a value to its envelope text form.
///
/// # Errors
///
/// [`NotSerializable`] when the value (or anything nested inside it) has no
/// encoding rule — the one such member is a non-finite float.
pub fn encode(value: &CacheValue) -> Result<String, NotSerializable> {
    Ok(encode_value(value)?.to_string())
}

/// Decodes envelope text back into a value.
///
/// Objects carrying a recognized type tag are reconstructed; an unrecognized
/// tag is a [`DecodeError`], never silently coerced. Objects without a tag
/// pass through as maps.
pub fn decode(text: &str) -> Result<CacheValue, DecodeError> {
    let json: Json = serde_json::from_str(text)?;
    decode_value(&json)
}

/// Encodes a result under its cache key using the canonical wrapper shape.
pub fn wrap(key: &str, value: &CacheValue) -> Result<String, NotSerializable> {
    let mut wrapper = JsonMap::new();
    wrapper.insert(key.to_owned(), encode_value(value)?);
    Ok(Json::Object(wrapper).to_string())
}

/// Extracts the canonical inner JSON stored under `key`.
///
/// The entry is returned exactly as stored, so the shape of the original
/// result is preserved. A wrapper without the key is a schema mismatch.
pub fn unwrap_json(key: &str, text: &str) -> Result<Json, DecodeError> {
    let json: Json = serde_json::from_str(text)?;
    json.get(key)
        .cloned()
        .ok_or_else(|| DecodeError::MissingEntry { key: key.to_owned() })
}

/// Decodes the value stored under `key` in wrapped payload text.
pub fn unwrap(key: &str, text: &str) -> Result<CacheValue, DecodeError> {
    decode_value(&unwrap_json(key, text)?)
}

pub(crate) fn encode_value(value: &CacheValue) -> Result<Json, NotSerializable> {
    Ok(match value {
        CacheValue::Null => Json::Null,
        CacheValue::Bool(b) => Json::Bool(*b),
        CacheValue::Int(i) => Json::from(*i),
        CacheValue::Float(x) => serde_json::Number::from_f64(*x)
            .map(Json::Number)
            .ok_or(NotSerializable(value.type_name()))?,
        CacheValue::Text(s) => Json::String(s.clone()),
        CacheValue::Timestamp(ts) => tagged(ts.format(DATETIME_AWARE).to_string(), TAG_DATETIME),
        CacheValue::Date(d) => tagged(d.format(DATE_ONLY).to_string(), TAG_DATE),
        CacheValue::Decimal(d) => tagged(d.to_string(), TAG_DECIMAL),
        CacheValue::Id(u) => Json::String(u.to_string()),
        CacheValue::Seq(items) => Json::Array(
            items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        CacheValue::Map(entries) => {
            let mut obj = JsonMap::with_capacity(entries.len());
            for (k, v) in entries {
                obj.insert(k.clone(), encode_value(v)?);
            }
            Json::Object(obj)
        }
    })
}

pub(crate) fn decode_value(json: &Json) -> Result<CacheValue, DecodeError> {
    Ok(match json {
        Json::Null => CacheValue::Null,
        Json::Bool(b) => CacheValue::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => CacheValue::Int(i),
            // Only non-integral numbers remain; from_f64 round trip keeps them finite.
            None => CacheValue::Float(n.as_f64().unwrap_or(0.0)),
        },
        Json::String(s) => CacheValue::Text(s.clone()),
        Json::Array(items) => CacheValue::Seq(
            items
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Json::Object(obj) => match envelope_tag(obj) {
            Some((tag, val)) => decode_tagged(tag, val)?,
            None => {
                let mut entries = std::collections::BTreeMap::new();
                for (k, v) in obj {
                    entries.insert(k.clone(), decode_value(v)?);
                }
                CacheValue::Map(entries)
            }
        },
    })
}

/// Recognizes the tagged-envelope shape: exactly `{"val": <string>, "type": <string>}`.
///
/// Ordinary maps that happen to contain a `type` entry alongside other fields
/// are not envelopes and pass through unchanged.
fn envelope_tag(obj: &JsonMap<String, Json>) -> Option<(&str, &str)> {
    if obj.len() != 2 {
        return None;
    }
    let tag = obj.get(TAG_FIELD)?.as_str()?;
    let val = obj.get(VAL_FIELD)?.as_str()?;
    Some((tag, val))
}

fn decode_tagged(tag: &str, val: &str) -> Result<CacheValue, DecodeError> {
    match tag {
        TAG_DATETIME => DateTime::parse_from_str(val, DATETIME_AWARE)
            .map(CacheValue::Timestamp)
            .map_err(|_| malformed(TAG_DATETIME, val)),
        TAG_DATE => NaiveDate::parse_from_str(val, DATE_ONLY)
            .map(CacheValue::Date)
            .map_err(|_| malformed(TAG_DATE, val)),
        TAG_DECIMAL => BigDecimal::from_str(val)
            .map(CacheValue::Decimal)
            .map_err(|_| malformed(TAG_DECIMAL, val)),
        other => Err(DecodeError::UnknownTag {
            tag: other.to_owned(),
        }),
    }
}

fn malformed(tag: &'static str, val: &str) -> DecodeError {
    DecodeError::Malformed {
        tag,
        val: val.to_owned(),
    }
}

fn tagged(val: String, tag: &str) -> Json {
    let mut obj = JsonMap::with_capacity(2);
    obj.insert(VAL_FIELD.to_owned(), Json::String(val));
    obj.insert(TAG_FIELD.to_owned(), Json::String(tag.to_owned()));
    Json::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use std::collections::BTreeMap;

    fn sample_timestamp() -> CacheValue {
        let tz = FixedOffset::east_opt(0).unwrap();
        CacheValue::Timestamp(tz.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
    }

    #[test]
    fn timestamp_round_trip() {
        let original = sample_timestamp();
        let text = encode(&original).unwrap();
        assert!(text.contains("01/15/2024 10:30:00 AM +0000"));
        assert_eq!(decode(&text).unwrap(), original);
    }

    #[test]
    fn date_round_trip() {
        let original = CacheValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let text = encode(&original).unwrap();
        assert!(text.contains("03/09/2024"));
        assert_eq!(decode(&text).unwrap(), original);
    }

    #[test]
    fn decimal_round_trips_exactly() {
        let original = CacheValue::Decimal(BigDecimal::from_str("19.99").unwrap());
        let text = encode(&original).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.to_string(), "19.99");
    }

    #[test]
    fn identifier_stored_as_canonical_string() {
        let id = uuid::Uuid::new_v4();
        let text = encode(&CacheValue::Id(id)).unwrap();
        assert_eq!(decode(&text).unwrap(), CacheValue::Text(id.to_string()));
    }

    #[test]
    fn nested_map_round_trip() {
        let mut fields = BTreeMap::new();
        fields.insert("when".to_owned(), sample_timestamp());
        fields.insert(
            "price".to_owned(),
            CacheValue::Decimal(BigDecimal::from_str("7.50").unwrap()),
        );
        fields.insert("count".to_owned(), CacheValue::Int(3));
        let original = CacheValue::Map(fields);

        let text = encode(&original).unwrap();
        assert_eq!(decode(&text).unwrap(), original);
    }

    #[test]
    fn non_finite_float_is_not_serializable() {
        let err = encode(&CacheValue::Float(f64::NAN)).unwrap_err();
        assert_eq!(err, NotSerializable("float"));

        let nested = CacheValue::Seq(vec![CacheValue::Int(1), CacheValue::Float(f64::INFINITY)]);
        assert!(encode(&nested).is_err());
    }

    #[test]
    fn unknown_tag_fails_decode() {
        let text = r#"{"val": "whatever", "type": "complex"}"#;
        match decode(text) {
            Err(DecodeError::UnknownTag { tag }) => assert_eq!(tag, "complex"),
            other => panic!("expected unknown tag error, got {other:?}"),
        }
    }

    #[test]
    fn untagged_object_passes_through() {
        let text = r#"{"type": "car", "wheels": 4}"#;
        match decode(text).unwrap() {
            CacheValue::Map(fields) => {
                assert_eq!(fields.get("type"), Some(&CacheValue::Text("car".into())));
                assert_eq!(fields.get("wheels"), Some(&CacheValue::Int(4)));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn malformed_tagged_value_fails_decode() {
        let text = r#"{"val": "not a date", "type": "date"}"#;
        assert!(matches!(
            decode(text),
            Err(DecodeError::Malformed { tag: "date", .. })
        ));
    }

    #[test]
    fn wrap_single_value_unwraps_to_itself() {
        let value = CacheValue::from("hello");
        let payload = wrap("app.greet()", &value).unwrap();
        assert_eq!(unwrap("app.greet()", &payload).unwrap(), value);
    }

    #[test]
    fn wrap_sequence_unwraps_per_element() {
        let value = CacheValue::from(vec![1, 2, 3]);
        let payload = wrap("app.list()", &value).unwrap();
        assert_eq!(unwrap("app.list()", &payload).unwrap(), value);

        let json: Json = serde_json::from_str(&payload).unwrap();
        let entries = json.get("app.list()").and_then(Json::as_array).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn one_element_sequence_stays_a_sequence() {
        let value = CacheValue::from(vec![1]);
        let payload = wrap("app.list()", &value).unwrap();
        assert_eq!(unwrap("app.list()", &payload).unwrap(), value);
        assert_eq!(unwrap_json("app.list()", &payload).unwrap().to_string(), "[1]");
    }

    #[test]
    fn unwrap_with_wrong_key_is_schema_mismatch() {
        let payload = wrap("app.a()", &CacheValue::Int(1)).unwrap();
        assert!(matches!(
            unwrap("app.b()", &payload),
            Err(DecodeError::MissingEntry { .. })
        ));
    }
}
