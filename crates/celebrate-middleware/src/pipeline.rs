//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] runs its stages in registration order, then the handler.
//! A stage or handler that fails hands its [`MiddlewareError`] to the error
//! handlers, again in registration order. An error that no error handler
//! turns into a response becomes a generic `500`.
//!
//! ```text
//! Request → stage 1 → … → stage n → handler ──────────────→ Response
//!              │              │         │
//!              └──────────────┴─────────┴→ error handler 1 → … → 500
//! ```

use crate::context::MiddlewareContext;
use crate::error::MiddlewareError;
use crate::middleware::{BoxFuture, ErrorMiddleware, ErrorNext, Middleware, MiddlewareResult, Next};
use crate::types::{Request, Response, ResponseExt};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A type-erased error handler that can be stored in a vector.
pub type BoxedErrorMiddleware = Arc<dyn ErrorMiddleware>;

/// Message of the response sent for an unhandled error.
pub const UNHANDLED_ERROR_MESSAGE: &str = "An internal error occurred";

/// The middleware pipeline.
///
/// The pipeline cannot be modified after construction.
///
/// # Example
///
/// ```
/// use celebrate_middleware::stages::{ErrorResponder, RequestIdMiddleware};
/// use celebrate_middleware::Pipeline;
///
/// let pipeline = Pipeline::builder()
///     .add_stage(RequestIdMiddleware::new())
///     .add_error_handler(ErrorResponder::default())
///     .build();
///
/// assert_eq!(pipeline.stage_names(), vec!["request_id"]);
/// assert_eq!(pipeline.error_handler_names(), vec!["celebrate_errors"]);
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    error_handlers: Vec<BoxedErrorMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request through the entire pipeline.
    ///
    /// Always produces a response: errors go through the error handlers and
    /// fall back to a `500` envelope.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'static,
    {
        ctx.set_request_line(request.method().as_str(), request.uri().path());

        let next = self.build_chain(handler);
        let error = match next.run(&mut ctx, request).await {
            Ok(response) => return response,
            Err(error) => error,
        };

        match self.handle_error(&mut ctx, error).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(
                    request_id = %ctx.request_id(),
                    method = ctx.method().unwrap_or_default(),
                    path = ctx.path().unwrap_or_default(),
                    error = %error,
                    elapsed_ms = ctx.elapsed().as_millis(),
                    "unhandled middleware error"
                );
                Response::internal_error(UNHANDLED_ERROR_MESSAGE)
            }
        }
    }

    /// Runs `error` through the error handlers.
    ///
    /// Returns the error back if no handler produced a response.
    pub async fn handle_error(&self, ctx: &mut MiddlewareContext, error: MiddlewareError) -> MiddlewareResult {
        let mut next = ErrorNext::end();
        for handler in self.error_handlers.iter().rev() {
            next = ErrorNext::new(handler.as_ref(), next);
        }
        next.run(ctx, error).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the names of all error handlers in order.
    #[must_use]
    pub fn error_handler_names(&self) -> Vec<&'static str> {
        self.error_handlers.iter().map(|h| h.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("error_handlers", &self.error_handler_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
    error_handlers: Vec<BoxedErrorMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared middleware stage.
    #[must_use]
    pub fn add_shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Appends an error handler.
    #[must_use]
    pub fn add_error_handler<E: ErrorMiddleware>(mut self, handler: E) -> Self {
        self.error_handlers.push(Arc::new(handler));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
            error_handlers: self.error_handlers,
        }
    }
}
