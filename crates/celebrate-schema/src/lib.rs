//! # Celebrate Schema
//!
//! JSON Schema engine for Celebrate, built on the `jsonschema` crate.
//!
//! Validation of one segment value runs in this order:
//!
//! 1. coerce strings to declared scalar types (`convert`)
//! 2. strip undeclared properties (`strip_unknown`)
//! 3. JSON Schema validation, then undeclared properties (`allow_unknown` off)
//!    and `x-context` references
//! 4. fill in `default` values of absent properties
//!
//! The engine returns a value only when one of these steps changed the input.

#![doc(html_root_url = "https://docs.rs/celebrate-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
pub mod context;
mod defaults;
mod engine;
mod error;
mod messages;
mod unknown;

pub use context::CONTEXT_KEYWORD;
pub use engine::{JsonSchema, JsonSchemaEngine};
pub use error::SchemaError;
