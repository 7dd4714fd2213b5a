//! Main configuration types.
//!
//! This module provides the top-level [`CelebrateConfig`] struct and its builder.

use std::sync::Arc;

use celebrate_core::{CelebrateOptions, Celebrator, ErrorsOptions, Mode, SchemaEngine, ValidationOptions};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig};

/// Complete Celebrate configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use celebrate_config::CelebrateConfig;
///
/// let config = CelebrateConfig::default();
/// assert_eq!(config.errors.status_code, 400);
/// assert!(config.validation.abort_early);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CelebrateConfig {
    /// Pipeline options (`mode`, `req_context`).
    #[serde(default)]
    pub celebrate: CelebrateOptions,

    /// Options forwarded to the schema engine.
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Error responder options.
    #[serde(default)]
    pub errors: ErrorsOptions,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CelebrateConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CelebrateConfigBuilder {
        CelebrateConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The error status code is outside `400..=599`
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.errors
            .validate()
            .map_err(|e| ConfigError::invalid_value("errors.status_code", e.to_string()))?;

        if self.logging.enabled {
            celebrate_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// This preset favors complete feedback:
    /// - Every failing segment and every violation is reported
    /// - Pretty log formatting at debug level with source locations
    ///
    /// # Example
    ///
    /// ```
    /// use celebrate_config::CelebrateConfig;
    /// use celebrate_core::Mode;
    ///
    /// let config = CelebrateConfig::development();
    /// assert_eq!(config.celebrate.mode, Mode::Full);
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.celebrate.mode = Mode::Full;
        config.validation.abort_early = false;

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// This preset favors short, safe responses:
    /// - Stop at the first failing segment and violation
    /// - HTML-escaped violation messages
    /// - JSON logs at info level
    ///
    /// # Example
    ///
    /// ```
    /// use celebrate_config::{CelebrateConfig, LogFormat};
    ///
    /// let config = CelebrateConfig::production();
    /// assert!(config.validation.escape_html);
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.celebrate.mode = Mode::Partial;
        config.validation.abort_early = true;
        config.validation.escape_html = true;

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config
    }

    /// Returns a middleware builder preconfigured with these options.
    ///
    /// ```
    /// use celebrate_config::CelebrateConfig;
    /// use celebrate_core::fixtures::KeysEngine;
    /// use celebrate_core::Mode;
    /// use serde_json::json;
    /// use std::sync::Arc;
    ///
    /// let celebrator = CelebrateConfig::development().celebrator(Arc::new(KeysEngine));
    /// let celebrate = celebrator.build(json!({ "body": { "required": ["first"] } })).unwrap();
    /// assert_eq!(celebrate.mode(), Mode::Full);
    /// ```
    #[must_use]
    pub fn celebrator(&self, engine: Arc<dyn SchemaEngine>) -> Celebrator {
        Celebrator::new(engine)
            .options(self.celebrate)
            .engine_options(self.validation.clone())
    }
}

/// Builder for [`CelebrateConfig`].
#[derive(Debug, Default)]
pub struct CelebrateConfigBuilder {
    celebrate: Option<CelebrateOptions>,
    validation: Option<ValidationOptions>,
    errors: Option<ErrorsOptions>,
    logging: Option<LoggingConfig>,
}

impl CelebrateConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline options.
    #[must_use]
    pub fn celebrate(mut self, celebrate: CelebrateOptions) -> Self {
        self.celebrate = Some(celebrate);
        self
    }

    /// Set the engine options.
    #[must_use]
    pub fn validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Set the error responder options.
    #[must_use]
    pub fn errors(mut self, errors: ErrorsOptions) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> CelebrateConfig {
        CelebrateConfig {
            celebrate: self.celebrate.unwrap_or_default(),
            validation: self.validation.unwrap_or_default(),
            errors: self.errors.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<CelebrateConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CelebrateConfig::default();
        assert_eq!(config.celebrate.mode, Mode::Partial);
        assert!(!config.celebrate.req_context);
        assert!(config.validation.convert);
        assert_eq!(config.errors.status_code, 400);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sections() {
        let config = CelebrateConfig::builder()
            .celebrate(CelebrateOptions::with_mode(Mode::Full))
            .errors(ErrorsOptions::with_status(422))
            .build();

        assert_eq!(config.celebrate.mode, Mode::Full);
        assert_eq!(config.errors.status_code, 422);
        // Other sections use defaults
        assert_eq!(config.validation, ValidationOptions::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_validate_status_code() {
        let result = CelebrateConfig::builder()
            .errors(ErrorsOptions::with_status(302))
            .build_validated();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("errors.status_code"));
    }

    #[test]
    fn test_validate_log_level() {
        let result = CelebrateConfig::builder()
            .logging(LoggingConfig {
                level: "celebrate=loud".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_presets() {
        let dev = CelebrateConfig::development();
        assert!(!dev.validation.abort_early);
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.logging.include_location);

        let prod = CelebrateConfig::production();
        assert_eq!(prod.celebrate.mode, Mode::Partial);
        assert!(prod.validation.abort_early);
        assert!(prod.validation.escape_html);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [celebrate]
            mode = "full"
            req_context = true

            [validation]
            strip_unknown = true

            [errors]
            status_code = 422
            message = "invalid request"
        "#;

        let config: CelebrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.celebrate.mode, Mode::Full);
        assert!(config.celebrate.req_context);
        assert!(config.validation.strip_unknown);
        assert!(config.validation.convert);
        assert_eq!(config.errors.status_code, 422);
        assert_eq!(config.errors.message.as_deref(), Some("invalid request"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CelebrateConfig, _> = toml::from_str("[server]\nhttp_addr = \"0.0.0.0:80\"");
        assert!(result.is_err());

        let result: Result<CelebrateConfig, _> = toml::from_str("[errors]\nstatus = 400");
        assert!(result.is_err());
    }
}
