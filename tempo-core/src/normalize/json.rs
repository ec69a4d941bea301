//! Lenient accessors over `serde_json::Value`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::Timestamp;
use tempo_types::timestamp::parse_date;

/// Number, or a string holding one (daily series encode values as `"8123"`).
pub fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer, accepting whole floats and numeric strings.
pub fn integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// String, or the textual form of a scalar.
pub fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Field of an object as text.
pub fn text_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(text)
}

/// Field of an object as a number.
pub fn number_field(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(number)
}

/// Field of an object as an integer.
pub fn integer_field(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(integer)
}

/// Array under `key`, if present.
pub fn array<'a>(obj: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

/// Object fields, cloned into an ordered map.
pub fn fields(v: &Value) -> Option<BTreeMap<String, Value>> {
    v.as_object()
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Classify a raw upstream datetime: bare dates stay dates, anything else is an instant.
pub fn timestamp(raw: &str) -> Timestamp {
    if raw.len() == 10 && parse_date(raw).is_some() {
        Timestamp::Date(raw.to_string())
    } else {
        Timestamp::Instant(raw.to_string())
    }
}
