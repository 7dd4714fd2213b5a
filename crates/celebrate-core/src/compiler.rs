//! Schema spec parsing and compilation.
//!
//! A schema spec is a JSON object keyed by segment name. Its shape is checked
//! before any schema is compiled:
//!
//! - `null` or `false` is a missing spec
//! - anything but an object is rejected
//! - an object must declare at least one segment and nothing else
//!
//! Each declared segment is then compiled once by the engine. The result is a
//! list of [`Step`]s in segment order, ready for the pipeline.

use crate::engine::{CompiledSchema, SchemaEngine};
use crate::error::ConfigurationError;
use crate::segment::Segment;
use crate::validator::Step;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A validated schema spec: raw engine schemas keyed by segment.
///
/// Iteration follows segment order, whatever the order of the source object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaSpec {
    schemas: BTreeMap<Segment, Value>,
}

impl SchemaSpec {
    /// Creates an empty spec. An empty spec cannot be compiled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw schema of a segment.
    #[must_use]
    pub fn with(mut self, segment: Segment, schema: Value) -> Self {
        self.schemas.insert(segment, schema);
        self
    }

    /// Parses a spec from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the value is missing, is not an
    /// object, is empty, or has a key outside the segment set.
    ///
    /// # Example
    ///
    /// ```
    /// use celebrate_core::{ConfigurationError, SchemaSpec, Segment};
    /// use serde_json::json;
    ///
    /// let spec = SchemaSpec::parse(&json!({ "body": {}, "headers": {} })).unwrap();
    /// assert_eq!(spec.segments().collect::<Vec<_>>(), vec![Segment::Headers, Segment::Body]);
    ///
    /// let err = SchemaSpec::parse(&json!({ "foo": {} })).unwrap_err();
    /// assert_eq!(err, ConfigurationError::UnknownSegment { key: "foo".into() });
    /// ```
    pub fn parse(value: &Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::Null | Value::Bool(false) => Err(ConfigurationError::MissingSpec),
            Value::Object(map) => Self::from_map(map),
            _ => Err(ConfigurationError::NotAnObject),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigurationError> {
        let mut schemas = BTreeMap::new();
        for (key, schema) in map {
            let segment = key
                .parse::<Segment>()
                .map_err(|_| ConfigurationError::UnknownSegment { key: key.clone() })?;
            schemas.insert(segment, schema.clone());
        }
        let spec = Self { schemas };
        spec.check()?;
        Ok(spec)
    }

    fn check(&self) -> Result<(), ConfigurationError> {
        if self.schemas.is_empty() {
            return Err(ConfigurationError::EmptySpec);
        }
        Ok(())
    }

    /// Returns the raw schema of a segment.
    #[must_use]
    pub fn get(&self, segment: Segment) -> Option<&Value> {
        self.schemas.get(&segment)
    }

    /// Returns the declared segments in segment order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.schemas.keys().copied()
    }

    /// Returns `(segment, schema)` pairs in segment order.
    pub fn iter(&self) -> impl Iterator<Item = (Segment, &Value)> + '_ {
        self.schemas.iter().map(|(segment, schema)| (*segment, schema))
    }

    /// Returns the number of declared segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true when no segment is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns the spec as a JSON object keyed by segment name.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .schemas
            .iter()
            .map(|(segment, schema)| (segment.as_str().to_string(), schema.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Compiles a [`SchemaSpec`] into pipeline steps with a [`SchemaEngine`].
#[derive(Clone)]
pub struct SchemaCompiler {
    engine: Arc<dyn SchemaEngine>,
}

impl SchemaCompiler {
    /// Creates a compiler backed by `engine`.
    #[must_use]
    pub fn new(engine: Arc<dyn SchemaEngine>) -> Self {
        Self { engine }
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn SchemaEngine> {
        &self.engine
    }

    /// Parses and compiles a raw spec.
    ///
    /// # Errors
    ///
    /// Fails with the first [`ConfigurationError`] found, in segment order.
    pub fn compile(&self, spec: &Value) -> Result<(SchemaSpec, Vec<Step>), ConfigurationError> {
        let spec = SchemaSpec::parse(spec)?;
        let steps = self.compile_spec(&spec)?;
        Ok((spec, steps))
    }

    /// Compiles an already-parsed spec.
    ///
    /// # Errors
    ///
    /// Fails on an empty spec or when the engine rejects a segment schema.
    pub fn compile_spec(&self, spec: &SchemaSpec) -> Result<Vec<Step>, ConfigurationError> {
        spec.check()?;
        let mut steps = Vec::with_capacity(spec.len());
        for (segment, raw) in spec.iter() {
            let schema: Arc<dyn CompiledSchema> = self
                .engine
                .compile(segment, raw)
                .map_err(|reason| ConfigurationError::SchemaCompile { segment, reason })?;
            tracing::trace!(segment = %segment, engine = self.engine.name(), "compiled segment schema");
            steps.push(Step::new(segment, schema));
        }
        Ok(steps)
    }
}

impl std::fmt::Debug for SchemaCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCompiler")
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FnSchema;
    use crate::options::ValidationOptions;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts any schema except the string `"broken"` and counts compilations.
    #[derive(Default)]
    struct CountingEngine {
        compiled: AtomicUsize,
    }

    impl SchemaEngine for CountingEngine {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn compile(&self, _segment: Segment, raw: &Value) -> Result<Arc<dyn CompiledSchema>, String> {
            if raw == "broken" {
                return Err("unparseable".to_string());
            }
            self.compiled.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FnSchema::new(|_: &Value, _: &ValidationOptions| Ok(None))))
        }
    }

    #[test]
    fn test_missing_spec() {
        assert_eq!(SchemaSpec::parse(&Value::Null), Err(ConfigurationError::MissingSpec));
        assert_eq!(SchemaSpec::parse(&json!(false)), Err(ConfigurationError::MissingSpec));
    }

    #[test]
    fn test_not_an_object() {
        for value in [json!(true), json!(1), json!("body"), json!([{ "body": {} }])] {
            assert_eq!(SchemaSpec::parse(&value), Err(ConfigurationError::NotAnObject));
        }
    }

    #[test]
    fn test_empty_spec() {
        assert_eq!(SchemaSpec::parse(&json!({})), Err(ConfigurationError::EmptySpec));
    }

    #[test]
    fn test_unknown_key_is_named() {
        let err = SchemaSpec::parse(&json!({ "body": {}, "session": {} })).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownSegment {
                key: "session".to_string()
            }
        );
        assert!(err.to_string().contains("\"session\""));
    }

    #[test]
    fn test_segment_order_ignores_source_order() {
        let spec = SchemaSpec::parse(&json!({
            "body": 1,
            "signedCookies": 2,
            "params": 3,
            "headers": 4
        }))
        .unwrap();
        let segments: Vec<Segment> = spec.segments().collect();
        assert_eq!(
            segments,
            vec![Segment::Headers, Segment::Params, Segment::SignedCookies, Segment::Body]
        );
        assert_eq!(spec.get(Segment::Params), Some(&json!(3)));
    }

    #[test]
    fn test_to_value_round_trips_keys() {
        let raw = json!({ "query": { "type": "object" }, "body": true });
        let spec = SchemaSpec::parse(&raw).unwrap();
        assert_eq!(spec.to_value(), raw);
    }

    #[test]
    fn test_compile_each_segment_once() {
        let engine = Arc::new(CountingEngine::default());
        let compiler = SchemaCompiler::new(engine.clone());

        let (spec, steps) = compiler.compile(&json!({ "body": {}, "query": {} })).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].segment(), Segment::Query);
        assert!(matches!(steps[1], Step::Body(_)));
        assert_eq!(engine.compiled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compile_error_names_segment() {
        let compiler = SchemaCompiler::new(Arc::new(CountingEngine::default()));
        let err = compiler.compile(&json!({ "cookies": "broken" })).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::SchemaCompile {
                segment: Segment::Cookies,
                reason: "unparseable".to_string()
            }
        );
    }

    #[test]
    fn test_compile_spec_rejects_empty() {
        let compiler = SchemaCompiler::new(Arc::new(CountingEngine::default()));
        assert_eq!(
            compiler.compile_spec(&SchemaSpec::new()).unwrap_err(),
            ConfigurationError::EmptySpec
        );
    }
}
