//! Request validation stage.
//!
//! Runs a compiled [`Celebrate`] over the incoming request. On success the
//! request continues with every validated segment written back and a
//! [`ValidatedSegments`](crate::ValidatedSegments) extension attached. On
//! failure the chain stops with [`MiddlewareError::Validation`] and the
//! handler never runs.

use crate::context::MiddlewareContext;
use crate::error::MiddlewareError;
use crate::middleware::{BoxFuture, Middleware, MiddlewareResult, Next};
use crate::request::HttpSegments;
use crate::types::Request;
use celebrate_core::Celebrate;
use std::sync::Arc;

/// Middleware that validates requests against a schema spec.
///
/// # Example
///
/// ```
/// use celebrate_core::{Celebrate, CelebrateOptions, ValidationOptions};
/// use celebrate_middleware::stages::CelebrateMiddleware;
/// use celebrate_schema::JsonSchemaEngine;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let celebrate = Celebrate::new(
///     json!({ "query": { "properties": { "page": { "type": "integer" } } } }),
///     ValidationOptions::default(),
///     CelebrateOptions::default(),
///     Arc::new(JsonSchemaEngine::new()),
/// )
/// .unwrap();
///
/// let middleware = CelebrateMiddleware::new(celebrate);
/// assert_eq!(middleware.celebrate().segments().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CelebrateMiddleware {
    celebrate: Arc<Celebrate>,
}

impl CelebrateMiddleware {
    /// Wraps a compiled validator.
    #[must_use]
    pub fn new(celebrate: Celebrate) -> Self {
        Self {
            celebrate: Arc::new(celebrate),
        }
    }

    /// Wraps a validator shared with other routes.
    #[must_use]
    pub fn shared(celebrate: Arc<Celebrate>) -> Self {
        Self { celebrate }
    }

    /// Returns the validator.
    #[must_use]
    pub fn celebrate(&self) -> &Celebrate {
        &self.celebrate
    }
}

impl Middleware for CelebrateMiddleware {
    fn name(&self) -> &'static str {
        "celebrate"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let mut segments = HttpSegments::from_request(request).await;

            let outcome = self.celebrate.validate(&mut segments).await;
            if let Err(error) = outcome {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    mode = ?self.celebrate.mode(),
                    segments = ?error.segments().collect::<Vec<_>>(),
                    elapsed_us = ctx.elapsed().as_micros(),
                    "request rejected"
                );
                return Err(MiddlewareError::Validation(error));
            }

            tracing::trace!(request_id = %ctx.request_id(), "request validated");
            next.run(ctx, segments.into_validated_request()).await
        })
    }
}
