//! Per-segment validators.
//!
//! A [`Step`] is one entry of the pipeline. Every segment but the body is
//! validated by a plain [`SegmentValidator`]; the body goes through a
//! [`BodyGuard`] that skips bodyless methods.

use crate::engine::{BoxFuture, CompiledSchema};
use crate::error::SegmentFailure;
use crate::options::ValidationOptions;
use crate::request::SegmentedRequest;
use crate::segment::Segment;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of one step: the normalized value, if any, or the segment failure.
pub type StepOutcome = Result<Option<Value>, SegmentFailure>;

/// Validates one segment against its compiled schema.
#[derive(Clone)]
pub struct SegmentValidator {
    segment: Segment,
    schema: Arc<dyn CompiledSchema>,
}

impl SegmentValidator {
    /// Creates a validator for `segment`.
    #[must_use]
    pub fn new(segment: Segment, schema: Arc<dyn CompiledSchema>) -> Self {
        Self { segment, schema }
    }

    /// Returns the validated segment.
    #[must_use]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Validates `value`, tagging an engine failure with the segment.
    pub fn validate<'a>(
        &'a self,
        value: Value,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            self.schema
                .validate(&value, options)
                .await
                .map_err(|error| SegmentFailure::new(self.segment, error))
        })
    }
}

impl std::fmt::Debug for SegmentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentValidator")
            .field("segment", &self.segment)
            .finish_non_exhaustive()
    }
}

/// Body validator that ignores bodyless methods.
///
/// `GET` and `HEAD` requests (any casing) resolve with no value and no
/// failure, without reading the body or calling the engine.
#[derive(Debug, Clone)]
pub struct BodyGuard {
    inner: SegmentValidator,
}

impl BodyGuard {
    /// Wraps the body validator.
    #[must_use]
    pub fn new(schema: Arc<dyn CompiledSchema>) -> Self {
        Self {
            inner: SegmentValidator::new(Segment::Body, schema),
        }
    }

    /// Returns true for methods that carry no body.
    ///
    /// ```
    /// use celebrate_core::BodyGuard;
    ///
    /// assert!(BodyGuard::is_bodyless("get"));
    /// assert!(BodyGuard::is_bodyless("HEAD"));
    /// assert!(!BodyGuard::is_bodyless("POST"));
    /// ```
    #[must_use]
    pub fn is_bodyless(method: &str) -> bool {
        method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
    }

    /// Validates the body, reading it only when the method can carry one.
    pub fn validate<'a, F>(
        &'a self,
        method: &str,
        read_body: F,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, StepOutcome>
    where
        F: FnOnce() -> Value,
    {
        if Self::is_bodyless(method) {
            tracing::trace!(method, "skipping body validation for bodyless method");
            return Box::pin(async { Ok(None) });
        }
        self.inner.validate(read_body(), options)
    }
}

/// One pipeline step.
#[derive(Debug, Clone)]
pub enum Step {
    /// Any segment except the body.
    Segment(SegmentValidator),
    /// The body, guarded against bodyless methods.
    Body(BodyGuard),
}

impl Step {
    /// Creates the step for `segment`.
    #[must_use]
    pub fn new(segment: Segment, schema: Arc<dyn CompiledSchema>) -> Self {
        match segment {
            Segment::Body => Self::Body(BodyGuard::new(schema)),
            Segment::Headers
            | Segment::Params
            | Segment::Query
            | Segment::Cookies
            | Segment::SignedCookies => Self::Segment(SegmentValidator::new(segment, schema)),
        }
    }

    /// Returns the validated segment.
    #[must_use]
    pub fn segment(&self) -> Segment {
        match self {
            Self::Segment(validator) => validator.segment(),
            Self::Body(_) => Segment::Body,
        }
    }

    /// Runs the step against `request`.
    ///
    /// The segment value is read before the returned future is created, so
    /// the future does not borrow the request.
    pub fn run<'a, R>(&'a self, request: &R, options: &'a ValidationOptions) -> BoxFuture<'a, StepOutcome>
    where
        R: SegmentedRequest + ?Sized,
    {
        match self {
            Self::Segment(validator) => validator.validate(request.segment(validator.segment()), options),
            Self::Body(guard) => guard.validate(request.method(), || request.segment(Segment::Body), options),
        }
    }
}
