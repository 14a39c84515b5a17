use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

/// Canonical attribute value.
///
/// Strategy by type:
/// - Scalars: protobuf `int32`/`sint32`/`sfixed32` widen to `Int64`, the
///   unsigned family to `UInt64`
/// - Enums keep their wire number
/// - List, Map, Message: recursive, only fields that are set
/// - Date, DateTime, Time: produced by column coercion, never by a message
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum number, as on the wire.
    Enum(i32),

    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// Nested message: field name → value, set fields only.
    Message(BTreeMap<String, Value>),

    /// Calendar date without time of day.
    Date(NaiveDate),
    /// Date + time in the mapper's configured zone.
    DateTime(DateTime<FixedOffset>),
    /// Instant, for `time` and `timestamp` columns.
    Time(DateTime<FixedOffset>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Signed view of an integer value, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::Enum(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// JSON rendering for ORMs that take JSON attribute payloads.
    ///
    /// Dates render as `YYYY-MM-DD`, date-times and instants as RFC 3339.
    /// Maps with string keys become objects, anything else a list of pairs.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int64(v) => Json::from(*v),
            Value::UInt64(v) => Json::from(*v),
            Value::Float32(v) => Json::from(f64::from(*v)),
            Value::Float64(v) => Json::from(*v),
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Enum(v) => Json::from(*v),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                if entries.iter().all(|(k, _)| k.as_str().is_some()) {
                    let object = entries
                        .iter()
                        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_owned(), v.to_json())))
                        .collect();
                    Json::Object(object)
                } else {
                    Json::Array(
                        entries
                            .iter()
                            .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                            .collect(),
                    )
                }
            }
            Value::Message(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) | Value::Time(dt) => {
                Json::String(dt.to_rfc3339_opts(SecondsFormat::Secs, false))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// From impls for transformer results
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_i64_accepts_unsigned_that_fit() {
        assert_eq!(Value::UInt64(42).as_i64(), Some(42));
        assert_eq!(Value::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Value::String("1".into()).as_i64(), None);
    }

    #[test]
    fn json_rendering_of_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_json(), serde_json::json!("2024-02-29"));

        let offset = FixedOffset::east_opt(3600).unwrap();
        let dt = DateTime::from_timestamp(0, 0).unwrap().with_timezone(&offset);
        assert_eq!(
            Value::DateTime(dt).to_json(),
            serde_json::json!("1970-01-01T01:00:00+01:00")
        );
    }

    #[test]
    fn json_rendering_of_maps() {
        let string_keyed = Value::Map(vec![("a".into(), Value::Int64(1))]);
        assert_eq!(string_keyed.to_json(), serde_json::json!({ "a": 1 }));

        let int_keyed = Value::Map(vec![(Value::Int64(7), Value::Bool(true))]);
        assert_eq!(int_keyed.to_json(), serde_json::json!([[7, true]]));
    }
}
