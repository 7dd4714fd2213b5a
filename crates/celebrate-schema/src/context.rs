//! Request-context references.
//!
//! A property schema may carry `"x-context": "<json pointer>"`. The pointer is
//! resolved against the request context (every segment of the request, keyed
//! by segment name) and the property must equal the value found there:
//!
//! ```json
//! { "properties": { "userId": { "x-context": "/params/userId" } } }
//! ```
//!
//! The keyword is ignored by JSON Schema validation itself.

use celebrate_core::Violation;
use serde_json::Value;

/// Keyword carrying a context reference.
pub const CONTEXT_KEYWORD: &str = "x-context";

/// Checks every context reference reachable from `schema`.
///
/// A reference that cannot be resolved, including when no context was
/// supplied, is a violation.
pub fn check_references(schema: &Value, value: &Value, context: Option<&Value>) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(schema, value, context, &mut Vec::new(), &mut violations);
    violations
}

fn walk(
    schema: &Value,
    value: &Value,
    context: Option<&Value>,
    path: &mut Vec<String>,
    out: &mut Vec<Violation>,
) {
    let Value::Object(schema) = schema else {
        return;
    };

    if let Some(pointer) = schema.get(CONTEXT_KEYWORD).and_then(Value::as_str) {
        let expected = context.and_then(|ctx| ctx.pointer(pointer));
        if expected != Some(value) {
            let label = path.last().map_or("value", String::as_str);
            out.push(Violation::new(
                path.clone(),
                format!("\"{label}\" must match the request value at {pointer}"),
                CONTEXT_KEYWORD,
            ));
        }
    }

    if let (Some(properties), Value::Object(map)) =
        (schema.get("properties").and_then(Value::as_object), value)
    {
        for (key, property_schema) in properties {
            if let Some(child) = map.get(key) {
                path.push(key.clone());
                walk(property_schema, child, context, path, out);
                path.pop();
            }
        }
    }
}
