//! Schema engine capability.
//!
//! The pipeline never talks to a schema library directly. An engine compiles
//! the raw schema of a segment once, at middleware construction, into a
//! [`CompiledSchema`] that is then shared by every request on the route.

use crate::error::EngineError;
use crate::options::ValidationOptions;
use crate::segment::Segment;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of validating one value.
///
/// `Ok(None)` means the value is valid as is; `Ok(Some(v))` carries the
/// normalized value (coerced, defaulted, stripped).
pub type EngineOutcome = Result<Option<Value>, EngineError>;

/// A schema compiled by a [`SchemaEngine`].
///
/// Implementations are immutable and shared across concurrent requests.
pub trait CompiledSchema: Send + Sync + 'static {
    /// Validates `value`.
    ///
    /// May complete asynchronously; callers must await it.
    fn validate<'a>(
        &'a self,
        value: &'a Value,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, EngineOutcome>;
}

/// A schema library adapter.
pub trait SchemaEngine: Send + Sync + 'static {
    /// Returns the engine name, for logs.
    fn name(&self) -> &'static str;

    /// Compiles the raw schema of a segment.
    ///
    /// The error string ends up in [`ConfigurationError::SchemaCompile`](crate::ConfigurationError::SchemaCompile).
    fn compile(&self, segment: Segment, raw: &Value) -> Result<Arc<dyn CompiledSchema>, String>;
}

/// A compiled schema built from a closure.
///
/// Handy for hand-written rules and for tests.
///
/// # Example
///
/// ```
/// use celebrate_core::{EngineError, FnSchema, ValidationOptions, CompiledSchema};
/// use serde_json::{json, Value};
///
/// let schema = FnSchema::new(|value: &Value, _opts: &ValidationOptions| {
///     if value.is_object() {
///         Ok(None)
///     } else {
///         Err(EngineError::new("must be an object"))
///     }
/// });
///
/// let opts = ValidationOptions::default();
/// let outcome = futures_util::FutureExt::now_or_never(schema.validate(&json!(1), &opts));
/// assert!(outcome.unwrap().is_err());
/// ```
pub struct FnSchema<F> {
    func: F,
}

impl<F> FnSchema<F>
where
    F: Fn(&Value, &ValidationOptions) -> EngineOutcome + Send + Sync + 'static,
{
    /// Wraps a synchronous validation function.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> CompiledSchema for FnSchema<F>
where
    F: Fn(&Value, &ValidationOptions) -> EngineOutcome + Send + Sync + 'static,
{
    fn validate<'a>(
        &'a self,
        value: &'a Value,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, EngineOutcome> {
        let outcome = (self.func)(value, options);
        Box::pin(async move { outcome })
    }
}

impl<F> std::fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSchema").finish_non_exhaustive()
    }
}
