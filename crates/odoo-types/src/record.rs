//! Record values as returned by the server.
//!
//! A record is a JSON object keyed by field name. Values follow the server's
//! loose conventions: `false` stands in for "no value" on most field types,
//! single relations come back either as a bare id (`load="raw"`) or as an
//! `[id, display_name]` pair, and multi relations as arrays of ids.

use serde_json::{Map, Value};

/// One remote record: field name -> value, insertion ordered.
pub type Record = Map<String, Value>;

/// Server-side truthiness of a value.
///
/// `false`, `null`, `0`, `""`, `[]` and `{}` are all "empty" for the server,
/// which uses them interchangeably for unset fields.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Interpret a value as a record identifier.
///
/// Only JSON integers qualify; booleans, floats and strings never do.
pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// The `id` of a record, if it carries an integer one.
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(as_id)
}
