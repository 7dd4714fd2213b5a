//! String-to-scalar coercion.
//!
//! Headers, path parameters and query strings reach the engine as strings.
//! With `convert` on, a string is rewritten to the scalar type its schema
//! declares before validation runs, so `"42"` satisfies `{"type": "integer"}`.
//!
//! A schema that accepts `"string"` keeps strings as they are.

use serde_json::{Map, Number, Value};

/// Coerces `value` in place following `schema`. Returns true if anything changed.
pub fn coerce(schema: &Value, value: &mut Value) -> bool {
    let Value::Object(schema) = schema else {
        return false;
    };

    match value {
        Value::String(s) => match coerce_scalar(schema, s) {
            Some(coerced) => {
                *value = coerced;
                true
            }
            None => false,
        },
        Value::Object(map) => coerce_object(schema, map),
        Value::Array(items) => match schema.get("items") {
            Some(item_schema) => items
                .iter_mut()
                .fold(false, |changed, item| coerce(item_schema, item) || changed),
            None => false,
        },
        _ => false,
    }
}

fn coerce_object(schema: &Map<String, Value>, map: &mut Map<String, Value>) -> bool {
    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties").filter(|s| s.is_object());

    let mut changed = false;
    for (key, child) in map.iter_mut() {
        let child_schema = properties.and_then(|p| p.get(key)).or(additional);
        if let Some(child_schema) = child_schema {
            changed |= coerce(child_schema, child);
        }
    }
    changed
}

fn declared_types(schema: &Map<String, Value>) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn coerce_scalar(schema: &Map<String, Value>, s: &str) -> Option<Value> {
    let types = declared_types(schema);
    if types.is_empty() || types.contains(&"string") {
        return None;
    }

    for ty in types {
        let coerced = match ty {
            "integer" => s.trim().parse::<i64>().ok().map(Value::from),
            "number" => parse_number(s.trim()),
            "boolean" => match s.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            "null" if s.is_empty() => Some(Value::Null),
            _ => None,
        };
        if coerced.is_some() {
            return coerced;
        }
    }
    None
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
