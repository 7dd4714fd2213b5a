//! Errors travelling through the middleware chain.
//!
//! A stage that cannot produce a response returns a [`MiddlewareError`]. The
//! variant is the discriminant error handlers use to tell a Celebrate
//! validation failure apart from anything else:
//!
//! | Variant | Produced by | Handled by |
//! |---------|-------------|------------|
//! | [`Validation`](MiddlewareError::Validation) | the celebrate stage | [`ErrorResponder`](crate::stages::ErrorResponder) |
//! | [`Other`](MiddlewareError::Other) | any other stage or handler | passed through untouched |

use celebrate_core::ValidationError;
use thiserror::Error;

/// A boxed, thread-safe error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by a middleware stage, handler or error handler.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// Request validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Any other failure.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl MiddlewareError {
    /// Wraps a foreign error.
    pub fn other<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Other(error.into())
    }

    /// Returns true for a Celebrate validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the validation failure, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Other(_) => None,
        }
    }
}

/// Returns true when `error` was produced by the celebrate stage.
///
/// ```
/// use celebrate_core::ValidationError;
/// use celebrate_middleware::{is_celebrate_error, MiddlewareError};
///
/// assert!(is_celebrate_error(&MiddlewareError::from(ValidationError::new())));
/// assert!(!is_celebrate_error(&MiddlewareError::other("boom")));
/// ```
#[must_use]
pub fn is_celebrate_error(error: &MiddlewareError) -> bool {
    error.is_validation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use celebrate_core::{EngineError, Segment};
    use std::error::Error as _;

    #[test]
    fn test_validation_display_is_transparent() {
        let mut inner = ValidationError::new();
        inner.add(Segment::Body, EngineError::new("bad"));
        let err = MiddlewareError::from(inner.clone());

        assert!(err.is_validation());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.as_validation(), Some(&inner));
    }

    #[test]
    fn test_other_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = MiddlewareError::other(io);

        assert!(!err.is_validation());
        assert!(err.as_validation().is_none());
        assert_eq!(err.to_string(), "disk on fire");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_with_validation_like_message_is_foreign() {
        let err = MiddlewareError::other("celebrate request validation failed");
        assert!(!is_celebrate_error(&err));
    }
}
