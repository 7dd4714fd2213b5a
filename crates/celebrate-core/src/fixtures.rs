//! Test fixtures for Celebrate development and testing.
//!
//! This module provides a tiny schema engine and pre-built requests that can be
//! used in tests across the Celebrate crates without pulling in a real schema
//! library.
//!
//! # Example
//!
//! ```
//! use celebrate_core::fixtures::{user_request, KeysEngine};
//! use celebrate_core::{Celebrate, CelebrateOptions, ValidationOptions};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let celebrate = Celebrate::new(
//!     json!({ "body": { "required": ["first"] } }),
//!     ValidationOptions::default(),
//!     CelebrateOptions::default(),
//!     Arc::new(KeysEngine),
//! )
//! .unwrap();
//!
//! let mut req = user_request();
//! assert!(futures_util::FutureExt::now_or_never(celebrate.validate(&mut req)).unwrap().is_ok());
//! ```

use crate::engine::{CompiledSchema, FnSchema, SchemaEngine};
use crate::error::{EngineError, Violation};
use crate::options::ValidationOptions;
use crate::request::PlainRequest;
use crate::segment::Segment;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// A minimal engine over object keys.
///
/// A schema is an object with two optional members:
///
/// - `required`: keys that must be present
/// - `defaults`: values filled in for absent keys
///
/// The segment value must be an object. Missing keys are reported with the
/// `required` kind, one violation each, in schema order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeysEngine;

impl SchemaEngine for KeysEngine {
    fn name(&self) -> &'static str {
        "keys"
    }

    fn compile(&self, segment: Segment, raw: &Value) -> Result<Arc<dyn CompiledSchema>, String> {
        let Value::Object(schema) = raw else {
            return Err(format!("{segment} schema must be an object"));
        };
        let required: Vec<String> = match schema.get("required") {
            None => Vec::new(),
            Some(Value::Array(keys)) => keys
                .iter()
                .map(|k| k.as_str().map(str::to_string).ok_or("required keys must be strings"))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err("required must be an array".to_string()),
        };
        let defaults = match schema.get("defaults") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err("defaults must be an object".to_string()),
        };

        Ok(Arc::new(FnSchema::new(move |value: &Value, options: &ValidationOptions| {
            check_keys(segment, &required, &defaults, value, options)
        })))
    }
}

fn check_keys(
    segment: Segment,
    required: &[String],
    defaults: &Map<String, Value>,
    value: &Value,
    options: &ValidationOptions,
) -> Result<Option<Value>, EngineError> {
    let Value::Object(map) = value else {
        return Err(EngineError::from_violations(vec![Violation::new(
            Vec::new(),
            format!("\"{segment}\" must be of type object"),
            "type",
        )]));
    };

    let mut violations = Vec::new();
    for key in required {
        if !map.contains_key(key) {
            violations.push(Violation::new(
                vec![key.clone()],
                format!("\"{key}\" is required"),
                "required",
            ));
            if options.abort_early {
                break;
            }
        }
    }
    if !violations.is_empty() {
        return Err(EngineError::from_violations(violations));
    }

    let missing: Vec<(&String, &Value)> = defaults.iter().filter(|(k, _)| !map.contains_key(*k)).collect();
    if missing.is_empty() {
        return Ok(None);
    }
    let mut out = map.clone();
    for (key, default) in missing {
        out.insert(key.clone(), default.clone());
    }
    Ok(Some(Value::Object(out)))
}

/// Creates a `POST /users/{userId}` request with a JSON body.
///
/// ```
/// use celebrate_core::fixtures::user_request;
/// use celebrate_core::{Segment, SegmentedRequest};
///
/// let req = user_request();
/// assert_eq!(req.method(), "POST");
/// assert_eq!(req.segment(Segment::Params)["userId"], "42");
/// ```
#[must_use]
pub fn user_request() -> PlainRequest {
    PlainRequest::new("POST")
        .with(Segment::Headers, json!({ "accept": "application/json", "host": "localhost" }))
        .with(Segment::Params, json!({ "userId": "42" }))
        .with(Segment::Query, json!({}))
        .with(Segment::Cookies, json!({}))
        .with(Segment::SignedCookies, json!({}))
        .with(Segment::Body, json!({ "first": "john" }))
}
