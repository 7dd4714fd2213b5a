//! The middleware instance.
//!
//! A [`Celebrate`] is built once per route and then shared by every request on
//! it. It owns the compiled steps and the options; nothing on it changes after
//! construction, so concurrent requests never observe each other.

use crate::compiler::{SchemaCompiler, SchemaSpec};
use crate::engine::SchemaEngine;
use crate::error::{ConfigurationError, ValidationError};
use crate::options::{CelebrateOptions, Mode, ValidationOptions};
use crate::pipeline::Pipeline;
use crate::request::SegmentedRequest;
use crate::segment::Segment;
use crate::validator::Step;
use serde_json::Value;
use std::sync::Arc;

/// A compiled request validator.
///
/// # Example
///
/// ```
/// use celebrate_core::{
///     Celebrate, CelebrateOptions, CompiledSchema, EngineError, FnSchema, PlainRequest,
///     SchemaEngine, Segment, ValidationOptions,
/// };
/// use serde_json::{json, Value};
/// use std::sync::Arc;
///
/// struct ObjectsOnly;
///
/// impl SchemaEngine for ObjectsOnly {
///     fn name(&self) -> &'static str { "objects-only" }
///     fn compile(&self, _: Segment, _: &Value) -> Result<Arc<dyn CompiledSchema>, String> {
///         Ok(Arc::new(FnSchema::new(|v: &Value, _: &ValidationOptions| {
///             if v.is_object() { Ok(None) } else { Err(EngineError::new("not an object")) }
///         })))
///     }
/// }
///
/// let celebrate = Celebrate::new(
///     json!({ "query": {} }),
///     ValidationOptions::default(),
///     CelebrateOptions::default(),
///     Arc::new(ObjectsOnly),
/// )
/// .unwrap();
///
/// let mut req = PlainRequest::new("GET").with(Segment::Query, json!("?"));
/// let err = futures_util::FutureExt::now_or_never(celebrate.validate(&mut req))
///     .unwrap()
///     .unwrap_err();
/// assert!(err.get(Segment::Query).is_some());
/// ```
#[derive(Clone)]
pub struct Celebrate {
    spec: SchemaSpec,
    raw: Value,
    steps: Arc<[Step]>,
    engine_options: ValidationOptions,
    options: CelebrateOptions,
    pipeline: Pipeline,
    engine: &'static str,
}

impl Celebrate {
    /// Compiles a raw schema spec.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for a malformed spec or a schema the
    /// engine cannot compile.
    pub fn new(
        spec: Value,
        engine_options: ValidationOptions,
        options: CelebrateOptions,
        engine: Arc<dyn SchemaEngine>,
    ) -> Result<Self, ConfigurationError> {
        let compiler = SchemaCompiler::new(engine);
        let (parsed, steps) = compiler.compile(&spec)?;
        Ok(Self::assemble(parsed, spec, steps, engine_options, options, compiler.engine().name()))
    }

    /// Compiles a typed schema spec.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an empty spec or a schema the
    /// engine cannot compile.
    pub fn from_parts(
        spec: SchemaSpec,
        engine_options: ValidationOptions,
        options: CelebrateOptions,
        engine: Arc<dyn SchemaEngine>,
    ) -> Result<Self, ConfigurationError> {
        let compiler = SchemaCompiler::new(engine);
        let steps = compiler.compile_spec(&spec)?;
        let raw = spec.to_value();
        Ok(Self::assemble(spec, raw, steps, engine_options, options, compiler.engine().name()))
    }

    fn assemble(
        spec: SchemaSpec,
        raw: Value,
        steps: Vec<Step>,
        engine_options: ValidationOptions,
        options: CelebrateOptions,
        engine: &'static str,
    ) -> Self {
        tracing::debug!(
            engine,
            mode = options.mode.as_str(),
            req_context = options.req_context,
            segments = ?spec.segments().map(|segment| segment.as_str()).collect::<Vec<_>>(),
            "celebrate middleware compiled"
        );
        Self {
            spec,
            raw,
            steps: steps.into(),
            engine_options,
            pipeline: Pipeline::new(options.mode, options.req_context),
            options,
            engine,
        }
    }

    /// Validates `request`, rewriting its segments with the normalized values.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the run. In partial mode it holds
    /// exactly one segment; in full mode one per failed segment, and the
    /// request is left untouched.
    pub async fn validate<R>(&self, request: &mut R) -> Result<(), ValidationError>
    where
        R: SegmentedRequest + ?Sized,
    {
        self.pipeline.run(&self.steps, request, &self.engine_options).await
    }

    /// Returns the schema spec as supplied at construction.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.raw
    }

    /// Returns the parsed schema spec.
    #[must_use]
    pub fn spec(&self) -> &SchemaSpec {
        &self.spec
    }

    /// Returns the execution mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.options.mode
    }

    /// Returns the pipeline options.
    #[must_use]
    pub fn options(&self) -> &CelebrateOptions {
        &self.options
    }

    /// Returns the options forwarded to the engine.
    #[must_use]
    pub fn engine_options(&self) -> &ValidationOptions {
        &self.engine_options
    }

    /// Returns the validated segments in evaluation order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.steps.iter().map(Step::segment)
    }
}

impl std::fmt::Debug for Celebrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Celebrate")
            .field("segments", &self.segments().collect::<Vec<_>>())
            .field("mode", &self.options.mode)
            .field("req_context", &self.options.req_context)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Builds [`Celebrate`] instances that share an engine and options.
///
/// ```
/// use celebrate_core::{Celebrator, CelebrateOptions, Mode, ValidationOptions};
/// # use celebrate_core::{CompiledSchema, FnSchema, SchemaEngine, Segment};
/// # use serde_json::{json, Value};
/// # use std::sync::Arc;
/// # struct Pass;
/// # impl SchemaEngine for Pass {
/// #     fn name(&self) -> &'static str { "pass" }
/// #     fn compile(&self, _: Segment, _: &Value) -> Result<Arc<dyn CompiledSchema>, String> {
/// #         Ok(Arc::new(FnSchema::new(|_: &Value, _: &ValidationOptions| Ok(None))))
/// #     }
/// # }
///
/// let full = Celebrator::new(Arc::new(Pass)).options(CelebrateOptions::with_mode(Mode::Full));
///
/// let users = full.build(json!({ "params": {} })).unwrap();
/// let posts = full.build(json!({ "body": {} })).unwrap();
/// assert_eq!(users.mode(), Mode::Full);
/// assert_eq!(posts.mode(), Mode::Full);
/// ```
#[derive(Clone)]
pub struct Celebrator {
    engine: Arc<dyn SchemaEngine>,
    engine_options: ValidationOptions,
    options: CelebrateOptions,
}

impl Celebrator {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new(engine: Arc<dyn SchemaEngine>) -> Self {
        Self {
            engine,
            engine_options: ValidationOptions::default(),
            options: CelebrateOptions::default(),
        }
    }

    /// Sets the pipeline options.
    #[must_use]
    pub fn options(mut self, options: CelebrateOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the engine options.
    #[must_use]
    pub fn engine_options(mut self, engine_options: ValidationOptions) -> Self {
        self.engine_options = engine_options;
        self
    }

    /// Compiles a raw spec with the shared engine and options.
    ///
    /// # Errors
    ///
    /// See [`Celebrate::new`].
    pub fn build(&self, spec: Value) -> Result<Celebrate, ConfigurationError> {
        Celebrate::new(
            spec,
            self.engine_options.clone(),
            self.options,
            Arc::clone(&self.engine),
        )
    }
}

impl std::fmt::Debug for Celebrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Celebrator")
            .field("engine", &self.engine.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
