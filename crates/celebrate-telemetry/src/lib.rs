//! Logging setup for Celebrate services.
//!
//! The Celebrate crates emit `tracing` events with a fixed set of field names
//! (see [`logging::fields`]):
//!
//! | Event | Level | Fields |
//! |-------|-------|--------|
//! | middleware compiled | debug | `engine`, `mode`, `segments` |
//! | segment passed / failed | debug | `segment`, `mode`, `violations` |
//! | request rejected | debug | `request_id`, `mode`, `segments` |
//! | validation failure rendered | debug | `request_id`, `status` |
//! | unhandled middleware error | error | `request_id`, `method`, `path`, `error` |
//!
//! This crate installs a subscriber that renders them.
//!
//! # Example
//!
//! ```rust,ignore
//! use celebrate_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_service_name("users-api"))?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
