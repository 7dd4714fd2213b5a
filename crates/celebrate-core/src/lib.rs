//! # Celebrate Core
//!
//! Request-validation engine for the Celebrate middleware.
//!
//! A route declares one schema per request [`Segment`]. The schemas are
//! compiled once by a [`SchemaEngine`] and every request is then run through a
//! fixed-order [`Pipeline`]:
//!
//! ```text
//! headers → params → query → cookies → signedCookies → body
//! ```
//!
//! - [`Celebrate`] - Compiled middleware instance, built once per route
//! - [`Celebrator`] - Builder sharing an engine and options across routes
//! - [`Pipeline`] - Partial (fail-fast) or full (collect-all) execution
//! - [`SegmentedRequest`] - Adapter trait implemented by host integrations
//! - [`ValidationError`] - Aggregate request failure, one entry per segment
//! - [`ConfigurationError`] - Malformed spec or options, returned at construction
//! - [`ErrorEnvelope`] - JSON body of validation error responses

#![doc(html_root_url = "https://docs.rs/celebrate-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod celebrate;
mod compiler;
mod engine;
pub mod envelope;
mod error;
pub mod fixtures;
mod options;
mod pipeline;
mod request;
mod segment;
mod validator;

pub use celebrate::{Celebrate, Celebrator};
pub use compiler::{SchemaCompiler, SchemaSpec};
pub use engine::{BoxFuture, CompiledSchema, EngineOutcome, FnSchema, SchemaEngine};
pub use envelope::{ErrorEnvelope, SegmentReport};
pub use error::{
    ConfigurationError, EngineError, SegmentFailure, ValidationError, Violation,
    DEFAULT_VALIDATION_MESSAGE,
};
pub use options::{CelebrateOptions, ErrorsOptions, Mode, ValidationOptions, DEFAULT_STATUS_CODE};
pub use pipeline::Pipeline;
pub use request::{PlainRequest, RequestMutator, SegmentedRequest};
pub use segment::{Segment, UnknownSegment};
pub use validator::{BodyGuard, SegmentValidator, Step, StepOutcome};
