use std::borrow::Cow;

use crate::transform::Value;

/// Default retention test: undef, false, zero, `""`, `"0"` and empty
/// containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Undef => false,
        Value::Bool(b) => *b,
        Value::Int(v) => *v != 0,
        Value::Float(v) => *v != 0.0,
        Value::Str(s) => !(s.is_empty() || s == "0"),
        Value::List(items) => !items.is_empty(),
        Value::Map(map) => !map.is_empty(),
        Value::Object(_) => true,
    }
}

/// Text form of a scalar, `None` for undef and containers
pub fn to_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Str(s) => Some(Cow::Borrowed(s)),
        Value::Int(v) => Some(Cow::Owned(v.to_string())),
        Value::Float(v) => Some(Cow::Owned(format_float(*v))),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("")),
        Value::Undef | Value::List(_) | Value::Map(_) | Value::Object(_) => None,
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

/// Literal equality: numbers numerically, everything else by text
pub fn loose_eq(value: &Value, literal: &Value) -> bool {
    match (value, literal) {
        (Value::Int(a), Value::Int(b)) => a == b,
        _ => match (as_number(value), as_number(literal)) {
            (Some(a), Some(b)) => a == b,
            _ => match (to_text(value), to_text(literal)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        },
    }
}
