//! Wire-level error envelope.
//!
//! The envelope sent to clients for a failed validation:
//!
//! ```json
//! {
//!   "statusCode": 400,
//!   "error": "Bad Request",
//!   "message": "celebrate request validation failed",
//!   "validation": {
//!     "headers": {
//!       "source": "headers",
//!       "keys": ["accept"],
//!       "message": "\"accept\" does not match /xml/"
//!     }
//!   }
//! }
//! ```

use crate::error::ValidationError;
use crate::options::ErrorsOptions;
use crate::segment::Segment;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reason phrase used for status codes without a canonical one.
pub const UNKNOWN_REASON: &str = "Unknown Error";

/// The failure of one segment, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentReport {
    /// The failed segment.
    pub source: Segment,
    /// Paths of the offending values, dotted and HTML-escaped.
    pub keys: Vec<String>,
    /// The engine message for the segment.
    pub message: String,
}

/// The JSON body of a validation error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// Reason phrase of the status code.
    pub error: String,
    /// The responder's message override, or the error's own message.
    pub message: String,
    /// One report per failed segment, in pipeline order.
    pub validation: IndexMap<Segment, SegmentReport>,
}

impl ErrorEnvelope {
    /// Builds the envelope of `error` under the responder `options`.
    ///
    /// # Example
    ///
    /// ```
    /// use celebrate_core::{EngineError, ErrorEnvelope, ErrorsOptions, Segment, ValidationError, Violation};
    ///
    /// let mut err = ValidationError::new();
    /// err.add(
    ///     Segment::Query,
    ///     EngineError::from_violations(vec![Violation::new(
    ///         vec!["page".into()],
    ///         "\"page\" must be a number",
    ///         "type",
    ///     )]),
    /// );
    ///
    /// let envelope = ErrorEnvelope::build(&err, &ErrorsOptions::default());
    /// assert_eq!(envelope.status_code, 400);
    /// assert_eq!(envelope.error, "Bad Request");
    /// assert_eq!(envelope.validation[&Segment::Query].keys, vec!["page"]);
    /// ```
    #[must_use]
    pub fn build(error: &ValidationError, options: &ErrorsOptions) -> Self {
        let validation = error
            .details()
            .iter()
            .map(|(segment, engine_error)| {
                let keys = engine_error
                    .violations()
                    .iter()
                    .map(|violation| html_escape(&violation.dotted_path()))
                    .collect();
                let report = SegmentReport {
                    source: *segment,
                    keys,
                    message: engine_error.message.clone(),
                };
                (*segment, report)
            })
            .collect();

        Self {
            status_code: options.status_code,
            error: reason_phrase(options.status_code).to_string(),
            message: options
                .message
                .clone()
                .unwrap_or_else(|| error.message().to_string()),
            validation,
        }
    }

    /// Serializes the envelope.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // Every field serializes infallibly.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Returns the canonical reason phrase of a status code.
///
/// ```
/// use celebrate_core::envelope::reason_phrase;
///
/// assert_eq!(reason_phrase(422), "Unprocessable Entity");
/// assert_eq!(reason_phrase(599), "Unknown Error");
/// ```
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or(UNKNOWN_REASON)
}

/// Escapes the characters that are significant in HTML.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
