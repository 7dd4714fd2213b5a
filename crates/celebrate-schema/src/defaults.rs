//! Default values.
//!
//! Absent properties take the `default` of their schema. Defaults are filled
//! in after validation and are not validated themselves.

use serde_json::{Map, Value};

/// Fills in defaults in place. Returns true if anything changed.
///
/// A `null` or absent root takes the root `default`, if any.
pub fn apply_defaults(schema: &Value, value: &mut Value) -> bool {
    let Value::Object(schema) = schema else {
        return false;
    };

    if value.is_null() {
        if let Some(default) = schema.get("default") {
            *value = default.clone();
            return true;
        }
    }

    let Value::Object(map) = value else {
        return false;
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return false;
    };
    fill_properties(properties, map)
}

fn fill_properties(properties: &Map<String, Value>, map: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, property_schema) in properties {
        match map.get_mut(key) {
            Some(child) => changed |= apply_defaults(property_schema, child),
            None => {
                if let Some(default) = property_schema.get("default") {
                    map.insert(key.clone(), default.clone());
                    changed = true;
                }
            }
        }
    }
    changed
}
