//! # Celebrate
//!
//! **Request-validation middleware for `http` services**
//!
//! Celebrate validates the six segments of an incoming request (headers,
//! path params, query, cookies, signed cookies and body) against per-route
//! schemas, rewrites the request with the coerced values, and renders
//! failures as a JSON error envelope:
//!
//! - **Declarative routes** - One JSON Schema per segment, compiled once
//! - **Partial or full reporting** - Stop at the first bad segment or collect them all
//! - **Request rewriting** - Defaults and coerced values are what the handler sees
//! - **Typed failures** - Validation errors are told apart from every other error
//!
//! ## Quick Start
//!
//! ```
//! use celebrate::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), ConfigurationError> {
//! let pipeline = Pipeline::builder()
//!     .add_stage(RequestIdMiddleware::new())
//!     .add_stage(celebrate::celebrate(json!({
//!         "body": {
//!             "type": "object",
//!             "required": ["first"],
//!             "properties": { "role": { "type": "string", "default": "admin" } }
//!         }
//!     }))?)
//!     .add_error_handler(celebrate::errors())
//!     .build();
//!
//! assert_eq!(pipeline.stage_names(), vec!["request_id", "celebrate"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → Celebrate → Handler ─────────────────→ Response
//!                           │          │
//!                           └──────────┴→ ErrorResponder → … → 500
//! ```

#![doc(html_root_url = "https://docs.rs/celebrate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use serde_json::Value;

// Re-export core types
pub use celebrate_core as core;

// Re-export the JSON Schema engine
pub use celebrate_schema as schema;

// Re-export middleware types
pub use celebrate_middleware as middleware;

// Re-export configuration types
pub use celebrate_config as config;

// Re-export logging setup
pub use celebrate_telemetry as telemetry;

use celebrate_config::CelebrateConfig;
use celebrate_core::{
    Celebrate, CelebrateOptions, Celebrator, ConfigurationError, ErrorsOptions, ValidationOptions,
};
use celebrate_middleware::stages::{CelebrateMiddleware, ErrorResponder};
use celebrate_schema::JsonSchemaEngine;

/// Returns a builder backed by the JSON Schema engine.
#[must_use]
pub fn celebrator() -> Celebrator {
    Celebrator::new(Arc::new(JsonSchemaEngine::new()))
}

/// Builds the validation stage for one route with default options.
///
/// `spec` maps segment names (`headers`, `params`, `query`, `cookies`,
/// `signedCookies`, `body`) to JSON Schemas.
///
/// # Errors
///
/// Returns [`ConfigurationError`] if the spec names an unknown segment,
/// declares none, or holds a schema the engine cannot compile.
pub fn celebrate(spec: Value) -> Result<CelebrateMiddleware, ConfigurationError> {
    celebrate_with(spec, ValidationOptions::default(), CelebrateOptions::default())
}

/// Builds the validation stage with explicit engine and pipeline options.
///
/// # Errors
///
/// Same as [`celebrate`].
pub fn celebrate_with(
    spec: Value,
    engine_options: ValidationOptions,
    options: CelebrateOptions,
) -> Result<CelebrateMiddleware, ConfigurationError> {
    Celebrate::new(spec, engine_options, options, Arc::new(JsonSchemaEngine::new()))
        .map(CelebrateMiddleware::new)
}

/// Builds the validation stage from a loaded configuration.
///
/// # Errors
///
/// Same as [`celebrate`].
pub fn celebrate_from_config(
    config: &CelebrateConfig,
    spec: Value,
) -> Result<CelebrateMiddleware, ConfigurationError> {
    config
        .celebrator(Arc::new(JsonSchemaEngine::new()))
        .build(spec)
        .map(CelebrateMiddleware::new)
}

/// Error handler rendering validation failures with status 400.
#[must_use]
pub fn errors() -> ErrorResponder {
    ErrorResponder::default()
}

/// Error handler with a custom status code or message.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidStatusCode`] if the status code is not
/// an HTTP error status.
pub fn errors_with(options: ErrorsOptions) -> Result<ErrorResponder, ConfigurationError> {
    ErrorResponder::new(options)
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use celebrate::prelude::*;
///
/// let options = CelebrateOptions::with_mode(Mode::Full);
/// assert_eq!(options.mode.as_str(), "full");
/// ```
pub mod prelude {
    pub use celebrate_core::{
        Celebrate, CelebrateOptions, Celebrator, ConfigurationError, ErrorEnvelope, ErrorsOptions,
        Mode, Segment, ValidationError, ValidationOptions,
    };

    pub use celebrate_schema::JsonSchemaEngine;

    pub use celebrate_middleware::stages::{
        CelebrateMiddleware, ErrorResponder, RequestIdMiddleware,
    };
    pub use celebrate_middleware::{
        is_celebrate_error, values, values_or, MiddlewareContext, MiddlewareError, PathParams,
        Pipeline, Request, Response, ResponseExt, SignedCookies, ValidatedSegments,
    };

    pub use celebrate_config::{CelebrateConfig, ConfigLoader};
}
