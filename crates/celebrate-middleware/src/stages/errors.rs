//! Validation error responder.
//!
//! Turns a [`MiddlewareError::Validation`] into the JSON error envelope:
//!
//! ```json
//! {
//!   "statusCode": 400,
//!   "error": "Bad Request",
//!   "message": "celebrate request validation failed",
//!   "validation": {
//!     "body": { "source": "body", "keys": ["first"], "message": "\"first\" is required" }
//!   }
//! }
//! ```
//!
//! Every other error is passed to the next error handler unchanged.

use crate::context::MiddlewareContext;
use crate::error::MiddlewareError;
use crate::middleware::{BoxFuture, ErrorMiddleware, ErrorNext, MiddlewareResult};
use crate::types::{Response, ResponseExt};
use celebrate_core::{ConfigurationError, ErrorEnvelope, ErrorsOptions, ValidationError};
use http::StatusCode;
use serde_json::Value;

/// Error handler that renders validation failures.
///
/// # Example
///
/// ```
/// use celebrate_core::ErrorsOptions;
/// use celebrate_middleware::stages::ErrorResponder;
///
/// let responder = ErrorResponder::new(ErrorsOptions::with_status(422)).unwrap();
/// assert_eq!(responder.options().status_code, 422);
///
/// assert!(ErrorResponder::new(ErrorsOptions::with_status(302)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorResponder {
    options: ErrorsOptions,
}

impl ErrorResponder {
    /// Creates a responder, rejecting status codes outside `400..=599`.
    pub fn new(options: ErrorsOptions) -> Result<Self, ConfigurationError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Creates a responder from JSON options. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let options = serde_json::from_value(value).map_err(|e| ConfigurationError::InvalidOptions {
            reason: e.to_string(),
        })?;
        Self::new(options)
    }

    /// Returns the responder options.
    #[must_use]
    pub fn options(&self) -> &ErrorsOptions {
        &self.options
    }

    /// Builds the error envelope of a validation failure.
    #[must_use]
    pub fn envelope(&self, error: &ValidationError) -> ErrorEnvelope {
        ErrorEnvelope::build(error, &self.options)
    }

    /// Renders a validation failure as a response.
    #[must_use]
    pub fn respond(&self, error: &ValidationError) -> Response {
        let status = StatusCode::from_u16(self.options.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        Response::json(status, &self.envelope(error).to_json())
    }
}

impl ErrorMiddleware for ErrorResponder {
    fn name(&self) -> &'static str {
        "celebrate_errors"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        error: MiddlewareError,
        next: ErrorNext<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            match error {
                MiddlewareError::Validation(validation) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        status = self.options.status_code,
                        "responding to validation failure"
                    );
                    Ok(self.respond(&validation))
                }
                other => next.run(ctx, other).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celebrate_core::{EngineError, Segment, Violation};
    use http_body_util::BodyExt;
    use serde_json::json;

    fn body_error() -> ValidationError {
        let mut err = ValidationError::new();
        err.add(
            Segment::Body,
            EngineError::from_violations(vec![Violation::new(
                vec!["first".into()],
                "\"first\" is required",
                "required",
            )]),
        );
        err
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_default_envelope() {
        let response = ErrorResponder::default().respond(&body_error());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "celebrate request validation failed",
                "validation": {
                    "body": { "source": "body", "keys": ["first"], "message": "\"first\" is required" }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_custom_status_and_message() {
        let responder = ErrorResponder::from_value(json!({ "statusCode": 422, "message": "nope" })).unwrap();
        let response = responder.respond(&body_error());

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Unprocessable Entity");
        assert_eq!(body["message"], "nope");
        assert_eq!(body["validation"]["body"]["message"], "\"first\" is required");
    }

    #[test]
    fn test_rejects_invalid_options() {
        assert!(matches!(
            ErrorResponder::new(ErrorsOptions::with_status(200)),
            Err(ConfigurationError::InvalidStatusCode { status: 200 })
        ));
        assert!(matches!(
            ErrorResponder::from_value(json!({ "statusCode": "x" })),
            Err(ConfigurationError::InvalidOptions { .. })
        ));
        assert!(ErrorResponder::from_value(Value::Null).is_ok());
    }

    #[tokio::test]
    async fn test_foreign_errors_pass_through() {
        let mut ctx = MiddlewareContext::new();
        let responder = ErrorResponder::default();

        let err = responder
            .handle(&mut ctx, MiddlewareError::other("database down"), ErrorNext::end())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "database down");
        assert!(!err.is_validation());
    }
}
