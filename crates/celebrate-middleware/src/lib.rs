//! # Celebrate Middleware
//!
//! HTTP middleware pipeline for Celebrate request validation.
//!
//! This crate plugs the validation core into an `http::Request` pipeline:
//!
//! ```text
//! Request → RequestId → Celebrate → Handler ───────────────→ Response
//!                           │          │
//!                           └──────────┴→ ErrorResponder → … → 500
//! ```
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | [`Pipeline`] | Runs stages, the handler and error handlers in order |
//! | [`HttpSegments`] | Reads and writes the six request segments |
//! | [`stages::CelebrateMiddleware`] | Validates, rewrites, or fails with [`MiddlewareError::Validation`] |
//! | [`stages::ErrorResponder`] | Renders validation failures, passes others on |
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use celebrate_core::{Celebrate, CelebrateOptions, ValidationOptions};
//! use celebrate_middleware::stages::{CelebrateMiddleware, ErrorResponder};
//! use celebrate_middleware::{MiddlewareContext, Pipeline, Request, Response, ResponseExt};
//! use celebrate_schema::JsonSchemaEngine;
//! use http_body_util::Full;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # run();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn run() {
//! let celebrate = Celebrate::new(
//!     json!({ "query": { "properties": { "page": { "type": "integer" } } } }),
//!     ValidationOptions::default(),
//!     CelebrateOptions::default(),
//!     Arc::new(JsonSchemaEngine::new()),
//! )
//! .unwrap();
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(CelebrateMiddleware::new(celebrate))
//!     .add_error_handler(ErrorResponder::default())
//!     .build();
//!
//! let request: Request = http::Request::builder()
//!     .uri("/items?page=first")
//!     .body(Full::new(Bytes::new()))
//!     .unwrap();
//!
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, |_ctx, _req| {
//!         Box::pin(async { Ok(Response::json(http::StatusCode::OK, &json!({}))) })
//!     })
//!     .await;
//! assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/celebrate-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::{MiddlewareContext, RequestId};
pub use error::{is_celebrate_error, BoxError, MiddlewareError};
pub use middleware::{BoxFuture, ErrorMiddleware, ErrorNext, Middleware, MiddlewareResult, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::{values, values_or, HttpSegments, PathParams, SignedCookies, ValidatedSegments};
pub use types::{Request, Response, ResponseExt};
