//! Error types for Celebrate.
//!
//! Two families of errors exist and must never be confused:
//!
//! | Error | When | Delivery |
//! |-------|------|----------|
//! | [`ConfigurationError`] | malformed schema spec or options | returned from construction |
//! | [`ValidationError`] | request does not satisfy its schemas | returned from request handling |
//!
//! A [`ValidationError`] aggregates one [`EngineError`] per failed [`Segment`],
//! in pipeline order.

use crate::segment::Segment;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default message of a [`ValidationError`].
pub const DEFAULT_VALIDATION_MESSAGE: &str = "celebrate request validation failed";

/// Programmer error detected while building a middleware or responder.
///
/// This is never a request failure and never reaches the error responder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No schema spec was supplied (`null` / `false`).
    #[error("a schema spec is required")]
    MissingSpec,

    /// The schema spec is not an object.
    #[error("the schema spec must be an object keyed by request segment")]
    NotAnObject,

    /// The schema spec has no segment.
    #[error("the schema spec must declare at least one of: {}", Segment::names().join(", "))]
    EmptySpec,

    /// The schema spec has a key outside the segment set.
    #[error("\"{key}\" is not allowed, expected one of: {}", Segment::names().join(", "))]
    UnknownSegment {
        /// The offending key.
        key: String,
    },

    /// The engine could not compile a segment schema.
    #[error("failed to compile the {segment} schema: {reason}")]
    SchemaCompile {
        /// The segment whose schema failed.
        segment: Segment,
        /// Engine-provided reason.
        reason: String,
    },

    /// Options could not be parsed.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// Explanation of the failure.
        reason: String,
    },

    /// Responder status code outside `400..=599`.
    #[error("status code {status} is not a client or server error (expected 400-599)")]
    InvalidStatusCode {
        /// The rejected status code.
        status: u16,
    },
}

/// A single constraint violation reported by a schema engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending value inside the segment.
    pub path: Vec<String>,
    /// Human-readable description.
    pub message: String,
    /// Engine-specific violation kind (e.g. `"required"`, `"pattern"`).
    pub kind: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(path: Vec<String>, message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            kind: kind.into(),
        }
    }

    /// Returns the path joined with dots (`"address.zip"`).
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// The native failure of a schema engine for one segment.
///
/// `details` is `None` when the engine does not break its failure down into
/// individual violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineError {
    /// Summary message.
    pub message: String,
    /// Per-violation breakdown, in engine order.
    pub details: Option<Vec<Violation>>,
}

impl EngineError {
    /// Creates an error without a violation breakdown.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error from its violations. The message joins theirs.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let message = violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join(". ");
        Self {
            message,
            details: Some(violations),
        }
    }

    /// Returns the violations, or an empty slice if there is no breakdown.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        self.details.as_deref().unwrap_or(&[])
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

/// An engine failure tagged with the segment it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{segment}: {error}")]
pub struct SegmentFailure {
    /// The failing segment.
    pub segment: Segment,
    /// The engine failure.
    pub error: EngineError,
}

impl SegmentFailure {
    /// Creates a segment failure.
    #[must_use]
    pub fn new(segment: Segment, error: EngineError) -> Self {
        Self { segment, error }
    }
}

/// Aggregate failure of one request validation.
///
/// Created fresh for every failing request; details keep insertion order,
/// which is pipeline order.
///
/// # Example
///
/// ```
/// use celebrate_core::{EngineError, Segment, ValidationError};
///
/// let mut err = ValidationError::new();
/// err.add(Segment::Query, EngineError::new("\"page\" must be a number"));
///
/// assert_eq!(err.len(), 1);
/// assert_eq!(err.message(), "celebrate request validation failed");
/// assert!(err.get(Segment::Query).is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
    details: IndexMap<Segment, EngineError>,
}

impl ValidationError {
    /// Creates an empty error with the default message.
    #[must_use]
    pub fn new() -> Self {
        Self::with_message(DEFAULT_VALIDATION_MESSAGE)
    }

    /// Creates an empty error with a custom message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: IndexMap::new(),
        }
    }

    /// Creates an error holding a single segment failure.
    #[must_use]
    pub fn from_failure(failure: SegmentFailure) -> Self {
        let mut error = Self::new();
        error.add(failure.segment, failure.error);
        error
    }

    /// Records the failure of a segment.
    ///
    /// A segment is validated at most once per request, so a second failure
    /// for the same segment is ignored and the first one kept.
    pub fn add(&mut self, segment: Segment, error: EngineError) {
        self.details.entry(segment).or_insert(error);
    }

    /// Records every failure of `other` that is not already present.
    pub fn merge(&mut self, other: ValidationError) {
        for (segment, error) in other.details {
            self.add(segment, error);
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the failures keyed by segment, in insertion order.
    #[must_use]
    pub fn details(&self) -> &IndexMap<Segment, EngineError> {
        &self.details
    }

    /// Returns the failure of a segment.
    #[must_use]
    pub fn get(&self, segment: Segment) -> Option<&EngineError> {
        self.details.get(&segment)
    }

    /// Returns the failed segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.details.keys().copied()
    }

    /// Returns the number of failed segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Returns true when no segment failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.details.is_empty() {
            let segments: Vec<&str> = self.details.keys().map(Segment::as_str).collect();
            write!(f, " ({})", segments.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<SegmentFailure> for ValidationError {
    fn from(failure: SegmentFailure) -> Self {
        Self::from_failure(failure)
    }
}
