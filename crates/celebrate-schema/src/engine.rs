//! The JSON Schema engine.

use crate::coerce::coerce;
use crate::context::check_references;
use crate::defaults::apply_defaults;
use crate::error::SchemaError;
use crate::messages;
use crate::unknown::{strip_unknown, unknown_paths, PropertyPatterns};
use celebrate_core::{
    BoxFuture, CompiledSchema, EngineError, EngineOutcome, SchemaEngine, Segment, ValidationOptions,
    Violation,
};
use serde_json::Value;
use std::sync::Arc;

/// Schema engine backed by the `jsonschema` crate.
///
/// Each segment schema is a JSON Schema document (draft detected from
/// `$schema`, latest draft otherwise). On top of plain validation the engine
/// coerces strings to declared scalar types, strips or rejects undeclared
/// properties, resolves `x-context` references and fills in defaults.
///
/// # Example
///
/// ```
/// use celebrate_core::{CompiledSchema, SchemaEngine, Segment, ValidationOptions};
/// use celebrate_schema::JsonSchemaEngine;
/// use serde_json::json;
///
/// let schema = JsonSchemaEngine::new()
///     .compile(Segment::Query, &json!({ "properties": { "page": { "type": "integer" } } }))
///     .unwrap();
///
/// let opts = ValidationOptions::default();
/// let value = json!({ "page": "2" });
/// let outcome = futures_util::FutureExt::now_or_never(schema.validate(&value, &opts)).unwrap();
/// assert_eq!(outcome.unwrap(), Some(json!({ "page": 2 })));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl JsonSchemaEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compiles a schema into a [`JsonSchema`].
    pub fn compile_schema(&self, segment: Segment, raw: &Value) -> Result<JsonSchema, SchemaError> {
        if !(raw.is_object() || raw.is_boolean()) {
            return Err(SchemaError::NotASchema { segment });
        }
        let validator = jsonschema::validator_for(raw).map_err(|e| SchemaError::Invalid {
            segment,
            reason: e.to_string(),
        })?;
        let patterns = PropertyPatterns::compile(raw).map_err(|e| SchemaError::InvalidPattern {
            segment,
            reason: e.to_string(),
        })?;
        Ok(JsonSchema {
            segment,
            schema: raw.clone(),
            validator,
            patterns,
        })
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn name(&self) -> &'static str {
        "jsonschema"
    }

    fn compile(&self, segment: Segment, raw: &Value) -> Result<Arc<dyn CompiledSchema>, String> {
        let schema = self.compile_schema(segment, raw).map_err(|e| e.to_string())?;
        Ok(Arc::new(schema))
    }
}

/// A compiled segment schema.
pub struct JsonSchema {
    segment: Segment,
    schema: Value,
    validator: jsonschema::Validator,
    patterns: PropertyPatterns,
}

impl JsonSchema {
    /// Returns the segment this schema was compiled for.
    #[must_use]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Returns the raw schema.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validates and normalizes `input` synchronously.
    pub fn check(&self, input: &Value, options: &ValidationOptions) -> EngineOutcome {
        let mut value = input.clone();

        if options.convert {
            coerce(&self.schema, &mut value);
        }
        if options.strip_unknown {
            strip_unknown(&self.schema, &self.patterns, &mut value);
        }

        let mut violations = self.violations(&value, options);
        if !violations.is_empty() {
            if options.abort_early {
                violations.truncate(1);
            }
            if options.escape_html {
                messages::escape_all(&mut violations);
            }
            tracing::trace!(
                segment = %self.segment,
                violations = violations.len(),
                "json schema validation failed"
            );
            return Err(EngineError::from_violations(violations));
        }

        apply_defaults(&self.schema, &mut value);
        Ok((value != *input).then_some(value))
    }

    fn violations(&self, value: &Value, options: &ValidationOptions) -> Vec<Violation> {
        let mut violations: Vec<Violation> =
            self.validator.iter_errors(value).map(|e| messages::violation(&e)).collect();
        if options.abort_early && !violations.is_empty() {
            return violations;
        }

        if !options.allow_unknown && !options.strip_unknown {
            violations.extend(unknown_paths(&self.schema, &self.patterns, value).into_iter().map(messages::not_allowed));
        }
        violations.extend(check_references(&self.schema, value, options.context.as_ref()));
        violations
    }
}

impl CompiledSchema for JsonSchema {
    fn validate<'a>(&'a self, value: &'a Value, options: &'a ValidationOptions) -> BoxFuture<'a, EngineOutcome> {
        Box::pin(async move { self.check(value, options) })
    }
}

impl std::fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema")
            .field("segment", &self.segment)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(raw: Value) -> JsonSchema {
        JsonSchemaEngine::new().compile_schema(Segment::Body, &raw).unwrap()
    }

    #[test]
    fn test_rejects_non_schema() {
        let err = JsonSchemaEngine::new()
            .compile_schema(Segment::Query, &json!("string"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::NotASchema { segment: Segment::Query }));
    }

    #[test]
    fn test_rejects_invalid_schema() {
        let err = JsonSchemaEngine::new()
            .compile_schema(Segment::Body, &json!({ "type": 12 }))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
    }

    #[test]
    fn test_unchanged_value_yields_none() {
        let schema = compile(json!({ "type": "object" }));
        let out = schema.check(&json!({ "a": 1 }), &ValidationOptions::default()).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_abort_early_limits_violations() {
        let schema = compile(json!({ "required": ["a", "b"] }));

        let err = schema.check(&json!({}), &ValidationOptions::default()).unwrap_err();
        assert_eq!(err.violations().len(), 1);

        let all = ValidationOptions {
            abort_early: false,
            ..ValidationOptions::default()
        };
        let err = schema.check(&json!({}), &all).unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_disallowed_unknown_keys() {
        let schema = compile(json!({ "properties": { "a": {} } }));
        let strict = ValidationOptions {
            allow_unknown: false,
            ..ValidationOptions::default()
        };

        let err = schema.check(&json!({ "a": 1, "b": 2 }), &strict).unwrap_err();
        assert_eq!(err.violations()[0].dotted_path(), "b");
        assert_eq!(err.message, "\"b\" is not allowed");

        let strip = ValidationOptions {
            strip_unknown: true,
            ..strict
        };
        let out = schema.check(&json!({ "a": 1, "b": 2 }), &strip).unwrap();
        assert_eq!(out, Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_pattern_properties_limit_unknown_keys() {
        let schema = compile(json!({ "patternProperties": { "^[a-z]+$": {} } }));
        let strict = ValidationOptions {
            allow_unknown: false,
            ..ValidationOptions::default()
        };
        let err = schema.check(&json!({ "ABC_1": 1 }), &strict).unwrap_err();
        assert_eq!(err.violations()[0].dotted_path(), "ABC_1");

        let strip = ValidationOptions {
            strip_unknown: true,
            ..strict
        };
        let out = schema.check(&json!({ "ABC_1": 1, "ok": 2 }), &strip).unwrap();
        assert_eq!(out, Some(json!({ "ok": 2 })));
    }

    #[test]
    fn test_unsupported_pattern_is_rejected() {
        let err = JsonSchemaEngine::new()
            .compile_schema(Segment::Headers, &json!({ "patternProperties": { "^(?=x)": {} } }))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { segment: Segment::Headers, .. }));
    }

    #[test]
    fn test_defaults_follow_validation() {
        let schema = compile(json!({
            "properties": { "role": { "type": "integer", "default": "admin" } }
        }));
        let out = schema.check(&json!({}), &ValidationOptions::default()).unwrap();
        assert_eq!(out, Some(json!({ "role": "admin" })));
    }

    #[test]
    fn test_no_conversion() {
        let schema = compile(json!({ "properties": { "page": { "type": "integer" } } }));
        let opts = ValidationOptions {
            convert: false,
            ..ValidationOptions::default()
        };
        assert!(schema.check(&json!({ "page": "1" }), &opts).is_err());
    }

    #[test]
    fn test_escape_html() {
        let schema = compile(json!({ "properties": { "name": { "type": "string", "maxLength": 2 } } }));
        let opts = ValidationOptions {
            escape_html: true,
            ..ValidationOptions::default()
        };
        let err = schema.check(&json!({ "name": "<abc>" }), &opts).unwrap_err();
        assert!(err.message.contains("&lt;abc&gt;"));
        assert!(!err.message.contains('<'));
    }

    #[tokio::test]
    async fn test_context_reference() {
        let schema = compile(json!({
            "properties": { "userId": { "type": "integer", "x-context": "/params/userId" } }
        }));
        let opts = ValidationOptions::default().with_context(json!({ "params": { "userId": 5 } }));

        assert!(schema.validate(&json!({ "userId": 5 }), &opts).await.is_ok());
        let err = schema.validate(&json!({ "userId": 6 }), &opts).await.unwrap_err();
        assert_eq!(err.violations()[0].kind, "x-context");
    }
}
