//! Request segments.
//!
//! A [`Segment`] names one slice of an incoming request that can carry its own
//! schema. The set is closed: adding or removing a segment is a compile-checked
//! change because every dispatch over segments is an exhaustive `match`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named slice of an HTTP request.
///
/// The declaration order is the validation order: headers first, body last.
///
/// # Example
///
/// ```
/// use celebrate_core::Segment;
///
/// assert_eq!(Segment::SignedCookies.as_str(), "signedCookies");
/// assert_eq!("query".parse::<Segment>().unwrap(), Segment::Query);
/// assert!(Segment::Headers < Segment::Body);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Request headers.
    #[serde(rename = "headers")]
    Headers,
    /// Path parameters resolved by the router.
    #[serde(rename = "params")]
    Params,
    /// Parsed query string.
    #[serde(rename = "query")]
    Query,
    /// Plain cookies.
    #[serde(rename = "cookies")]
    Cookies,
    /// Cookies whose signature was verified upstream.
    #[serde(rename = "signedCookies")]
    SignedCookies,
    /// Request body.
    #[serde(rename = "body")]
    Body,
}

impl Segment {
    /// All segments in evaluation order.
    pub const ALL: [Segment; 6] = [
        Segment::Headers,
        Segment::Params,
        Segment::Query,
        Segment::Cookies,
        Segment::SignedCookies,
        Segment::Body,
    ];

    /// Returns the wire name of this segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Params => "params",
            Self::Query => "query",
            Self::Cookies => "cookies",
            Self::SignedCookies => "signedCookies",
            Self::Body => "body",
        }
    }

    /// Returns the wire names of every segment, in evaluation order.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Segment::as_str).collect()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown segment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request segment: {0}")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "headers" => Ok(Self::Headers),
            "params" => Ok(Self::Params),
            "query" => Ok(Self::Query),
            "cookies" => Ok(Self::Cookies),
            "signedCookies" => Ok(Self::SignedCookies),
            "body" => Ok(Self::Body),
            other => Err(UnknownSegment(other.to_string())),
        }
    }
}
