//! Conversions between [`Value`] and `serde_json::Value`
//!
//! JSON objects become mapping-kind records, so a parsed document can be fed
//! straight into the transform functions.

use serde_json::{Map, Number, Value as JsonValue};

use crate::transform::{TransformError, Value};

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Undef,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl TryFrom<Value> for JsonValue {
    type Error = TransformError;

    /// Objects and non-finite floats have no JSON form
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Undef => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Int(i) => JsonValue::Number(i.into()),
            Value::Float(f) => JsonValue::Number(
                Number::from_f64(f).ok_or(TransformError::NotSerializable {
                    found: "non-finite float",
                })?,
            ),
            Value::Str(s) => JsonValue::String(s),
            Value::List(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Map(map) => {
                let mut out = Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, JsonValue::try_from(v)?);
                }
                JsonValue::Object(out)
            }
            Value::Object(_) => {
                return Err(TransformError::NotSerializable { found: "object" });
            }
        })
    }
}

/// Parses a JSON array of objects into a sequence of mapping-kind records
pub fn records_from_json(json: JsonValue) -> Vec<Value> {
    match json {
        JsonValue::Array(items) => items.into_iter().map(Value::from).collect(),
        other => vec![Value::from(other)],
    }
}
