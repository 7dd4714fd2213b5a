//! Middleware, engine and responder options.
//!
//! Three option sets exist:
//!
//! - [`CelebrateOptions`] - interpreted by the pipeline (`mode`, `req_context`)
//! - [`ValidationOptions`] - forwarded to the schema engine untouched, except for
//!   the request context the pipeline injects when `req_context` is on
//! - [`ErrorsOptions`] - configure the error responder
//!
//! All three deserialize from camelCase or snake_case keys so they can be read
//! from JSON literals and from TOML configuration files alike.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pipeline execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Stop at the first failing segment.
    #[default]
    Partial,
    /// Validate every segment and report every failure.
    Full,
}

impl Mode {
    /// Returns the mode name used in logs and configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }
}

/// Options interpreted by the validation pipeline itself.
///
/// # Example
///
/// ```
/// use celebrate_core::{CelebrateOptions, Mode};
/// use serde_json::json;
///
/// let opts = CelebrateOptions::from_value(json!({ "reqContext": true, "mode": "full" })).unwrap();
/// assert!(opts.req_context);
/// assert_eq!(opts.mode, Mode::Full);
///
/// assert!(CelebrateOptions::from_value(json!({ "bogus": 1 })).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CelebrateOptions {
    /// Expose the whole request to the engine as validation context.
    #[serde(alias = "reqContext")]
    pub req_context: bool,
    /// Execution strategy.
    pub mode: Mode,
}

impl CelebrateOptions {
    /// Creates options with the given mode and no request context.
    #[must_use]
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Enables or disables request-context injection.
    #[must_use]
    pub fn req_context(mut self, enabled: bool) -> Self {
        self.req_context = enabled;
        self
    }

    /// Parses options from a JSON value. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ConfigurationError::InvalidOptions {
            reason: e.to_string(),
        })
    }
}

/// Options forwarded to the schema engine.
///
/// The named fields are the knobs every bundled engine understands; anything
/// else lands in [`extra`](Self::extra) and is passed along unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Report only the first violation of a segment.
    #[serde(alias = "abortEarly")]
    pub abort_early: bool,
    /// Coerce string input to the declared scalar type.
    pub convert: bool,
    /// Remove properties the schema does not declare.
    #[serde(alias = "stripUnknown")]
    pub strip_unknown: bool,
    /// Accept properties the schema does not declare.
    #[serde(alias = "allowUnknown")]
    pub allow_unknown: bool,
    /// HTML-escape violation messages.
    #[serde(alias = "escapeHtml")]
    pub escape_html: bool,
    /// Engine-specific options.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Snapshot of the whole request, set by the pipeline when `req_context` is on.
    #[serde(skip)]
    pub context: Option<Value>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            strip_unknown: false,
            allow_unknown: true,
            escape_html: false,
            extra: Map::new(),
            context: None,
        }
    }
}

impl ValidationOptions {
    /// Parses engine options from a JSON value. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ConfigurationError::InvalidOptions {
            reason: e.to_string(),
        })
    }

    /// Returns a copy of these options carrying the given request context.
    #[must_use]
    pub fn with_context(&self, context: Value) -> Self {
        Self {
            context: Some(context),
            ..self.clone()
        }
    }
}

/// Default status code of validation error responses.
pub const DEFAULT_STATUS_CODE: u16 = 400;

/// Options of the error responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorsOptions {
    /// Status code of the error response, within `400..=599`.
    #[serde(alias = "statusCode")]
    pub status_code: u16,
    /// Overrides the message of every validation error response.
    pub message: Option<String>,
}

impl Default for ErrorsOptions {
    fn default() -> Self {
        Self {
            status_code: DEFAULT_STATUS_CODE,
            message: None,
        }
    }
}

impl ErrorsOptions {
    /// Creates options with the given status code.
    #[must_use]
    pub fn with_status(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    /// Sets the message override.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Checks that the status code is a client or server error.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if (400..=599).contains(&self.status_code) {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidStatusCode {
                status: self.status_code,
            })
        }
    }
}
