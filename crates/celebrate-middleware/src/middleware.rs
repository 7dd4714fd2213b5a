//! Core middleware traits and types.
//!
//! This module defines the two kinds of stage a [`Pipeline`](crate::Pipeline)
//! chains together:
//!
//! - [`Middleware`] - sees the request on its way to the handler
//! - [`ErrorMiddleware`] - sees a [`MiddlewareError`] that no stage turned
//!   into a response
//!
//! A middleware either produces a response, forwards the request through
//! [`Next`], or fails with an error. Errors skip every remaining middleware
//! and the handler and go to the error handlers, in registration order.
//!
//! # Example
//!
//! ```
//! use celebrate_middleware::{BoxFuture, Middleware, MiddlewareContext, MiddlewareResult, Next, Request};
//!
//! struct LoggingMiddleware;
//!
//! impl Middleware for LoggingMiddleware {
//!     fn name(&self) -> &'static str {
//!         "logging"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MiddlewareResult> {
//!         Box::pin(async move {
//!             tracing::info!(request_id = %ctx.request_id(), "request");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::error::MiddlewareError;
use crate::types::{Request, Response};

pub use celebrate_core::BoxFuture;

/// Outcome of a middleware, handler or error handler.
pub type MiddlewareResult = Result<Response, MiddlewareError>;

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware MUST call `next.run()` at most once
/// - Middleware SHOULD NOT swallow errors from downstream stages
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Processes the request through this middleware.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

/// Callback to invoke the next middleware in the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the handler
    Handler(Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a new `Next` that will invoke the given middleware.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    ///
    /// This consumes `self` to ensure it can only be called once.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> MiddlewareResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// An error-handling stage.
///
/// An error handler either turns the error into a response or passes it on
/// through [`ErrorNext`], unchanged or replaced.
pub trait ErrorMiddleware: Send + Sync + 'static {
    /// Returns the unique name of this error handler.
    fn name(&self) -> &'static str;

    /// Handles an error raised by the middleware chain or the handler.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        error: MiddlewareError,
        next: ErrorNext<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

/// Callback to pass an error to the next error handler.
///
/// At the end of the chain the error is returned to the pipeline.
pub struct ErrorNext<'a> {
    inner: Option<(&'a dyn ErrorMiddleware, Box<ErrorNext<'a>>)>,
}

impl<'a> ErrorNext<'a> {
    /// Creates a `Next` that invokes the given error handler.
    pub(crate) fn new(handler: &'a dyn ErrorMiddleware, next: ErrorNext<'a>) -> Self {
        Self {
            inner: Some((handler, Box::new(next))),
        }
    }

    /// Creates the end of the error chain.
    #[must_use]
    pub fn end() -> Self {
        Self { inner: None }
    }

    /// Passes `error` to the next error handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, error: MiddlewareError) -> MiddlewareResult {
        match self.inner {
            Some((handler, next)) => handler.handle(ctx, error, *next).await,
            None => Err(error),
        }
    }
}
