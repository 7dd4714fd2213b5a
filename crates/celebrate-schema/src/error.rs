//! Schema compilation errors.

use celebrate_core::Segment;
use thiserror::Error;

/// Failure to compile a segment schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema is neither an object nor a boolean.
    #[error("the {segment} schema must be a JSON Schema object or boolean")]
    NotASchema {
        /// The segment being compiled.
        segment: Segment,
    },

    /// The schema is not valid JSON Schema.
    #[error("the {segment} schema is invalid: {reason}")]
    Invalid {
        /// The segment being compiled.
        segment: Segment,
        /// Reason reported by the validator.
        reason: String,
    },

    /// A `patternProperties` key is not a supported regular expression.
    #[error("the {segment} schema has an unsupported property pattern: {reason}")]
    InvalidPattern {
        /// The segment being compiled.
        segment: Segment,
        /// Reason reported by the regex compiler.
        reason: String,
    },
}
