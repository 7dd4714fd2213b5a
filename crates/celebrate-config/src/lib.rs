//! Typed configuration for Celebrate.
//!
//! This crate loads the options of the validation middleware, the error
//! responder and logging with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`CelebrateConfig`] has four sections:
//!
//! - `celebrate` - pipeline options ([`CelebrateOptions`](celebrate_core::CelebrateOptions))
//! - `validation` - engine options ([`ValidationOptions`](celebrate_core::ValidationOptions))
//! - `errors` - responder options ([`ErrorsOptions`](celebrate_core::ErrorsOptions))
//! - `logging` - [`LoggingConfig`]
//!
//! # Example
//!
//! ```no_run
//! use celebrate_config::{CelebrateConfig, ConfigLoader};
//!
//! # fn main() -> Result<(), celebrate_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("celebrate.toml")?
//!     .with_env_prefix("CELEBRATE")
//!     .load()?;
//!
//! println!("responding with {}", config.errors.status_code);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [celebrate]
//! mode = "partial"
//! req_context = false
//!
//! [validation]
//! abort_early = true
//! convert = true
//! strip_unknown = false
//! allow_unknown = true
//! escape_html = false
//!
//! [errors]
//! status_code = 400
//! message = "invalid request"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! service_name = "users-api"
//! ```
//!
//! # Environment Variable Overrides
//!
//! All configuration values can be overridden via environment variables using
//! the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `CELEBRATE__CELEBRATE__MODE=full`
//! - `CELEBRATE__VALIDATION__ABORT_EARLY=false`
//! - `CELEBRATE__ERRORS__STATUS_CODE=422`
//! - `CELEBRATE__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CelebrateConfig::default();
        assert_eq!(config.errors.status_code, 400);
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_logging_section_feeds_telemetry() {
        let config = CelebrateConfig::development();
        let log = config.logging.to_log_config();
        assert!(!log.json_format);
        assert_eq!(log.level, "debug");
    }
}
