//! Request adapter.
//!
//! The core reads and writes request segments through [`SegmentedRequest`],
//! implemented by each host integration. Writing a segment is an explicit
//! capability of the adapter, so the core never has to guess whether a part of
//! the host request is writable.

use crate::segment::Segment;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A request whose segments can be read and replaced.
pub trait SegmentedRequest: Send + Sync {
    /// Returns the HTTP method as sent by the client.
    fn method(&self) -> &str;

    /// Returns the current value of a segment, `Value::Null` when absent.
    ///
    /// After [`set_segment`](Self::set_segment) this returns the new value.
    fn segment(&self, segment: Segment) -> Value;

    /// Replaces the value of a segment.
    ///
    /// Must not fail: adapters that cannot write a segment in place keep the
    /// value aside and serve it from [`segment`](Self::segment).
    fn set_segment(&mut self, segment: Segment, value: Value);

    /// Returns every segment as one JSON object keyed by segment name.
    ///
    /// This is the context handed to the engine when `req_context` is on.
    fn context(&self) -> Value {
        let mut map = Map::new();
        for segment in Segment::ALL {
            map.insert(segment.as_str().to_string(), self.segment(segment));
        }
        map.insert("method".to_string(), Value::String(self.method().to_string()));
        Value::Object(map)
    }
}

/// Writes validated values back onto a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMutator;

impl RequestMutator {
    /// Applies `value` to `segment`. Absent and `null` values are ignored.
    pub fn apply<R: SegmentedRequest + ?Sized>(request: &mut R, segment: Segment, value: Option<Value>) {
        match value {
            None | Some(Value::Null) => {}
            Some(value) => {
                tracing::trace!(segment = %segment, "applying validated value");
                request.set_segment(segment, value);
            }
        }
    }
}

/// An in-memory request: a method and a map of segment values.
///
/// Useful for hosts that are not HTTP servers and for tests.
///
/// # Example
///
/// ```
/// use celebrate_core::{PlainRequest, Segment, SegmentedRequest};
/// use serde_json::json;
///
/// let req = PlainRequest::new("POST").with(Segment::Body, json!({ "first": "john" }));
/// assert_eq!(req.method(), "POST");
/// assert_eq!(req.segment(Segment::Body), json!({ "first": "john" }));
/// assert!(req.segment(Segment::Query).is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlainRequest {
    method: String,
    segments: IndexMap<Segment, Value>,
}

impl PlainRequest {
    /// Creates a request with the given method and no segments.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            segments: IndexMap::new(),
        }
    }

    /// Sets a segment value.
    #[must_use]
    pub fn with(mut self, segment: Segment, value: Value) -> Self {
        self.segments.insert(segment, value);
        self
    }

    /// Builds a request from a JSON object such as
    /// `{ "method": "POST", "body": { ... }, "query": { ... } }`.
    ///
    /// Unknown keys are ignored; a missing method defaults to `GET`.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("GET")
            .to_string();
        let mut request = Self::new(method);
        for segment in Segment::ALL {
            if let Some(v) = value.get(segment.as_str()) {
                request.segments.insert(segment, v.clone());
            }
        }
        request
    }

    /// Returns the segment values that are set.
    #[must_use]
    pub fn segments(&self) -> &IndexMap<Segment, Value> {
        &self.segments
    }
}

impl SegmentedRequest for PlainRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn segment(&self, segment: Segment) -> Value {
        self.segments.get(&segment).cloned().unwrap_or(Value::Null)
    }

    fn set_segment(&mut self, segment: Segment, value: Value) {
        self.segments.insert(segment, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let req = PlainRequest::from_json(&json!({
            "method": "PUT",
            "params": { "id": "1" },
            "signedCookies": { "sid": "abc" },
            "onComplete": "ignored"
        }));
        assert_eq!(req.method(), "PUT");
        assert_eq!(req.segment(Segment::Params), json!({ "id": "1" }));
        assert_eq!(req.segment(Segment::SignedCookies), json!({ "sid": "abc" }));
        assert_eq!(req.segments().len(), 2);
    }

    #[test]
    fn test_from_json_defaults_method() {
        let req = PlainRequest::from_json(&json!({}));
        assert_eq!(req.method(), "GET");
    }

    #[test]
    fn test_mutator_ignores_absent_values() {
        let mut req = PlainRequest::new("POST").with(Segment::Body, json!({ "a": 1 }));

        RequestMutator::apply(&mut req, Segment::Body, None);
        RequestMutator::apply(&mut req, Segment::Body, Some(Value::Null));
        assert_eq!(req.segment(Segment::Body), json!({ "a": 1 }));

        RequestMutator::apply(&mut req, Segment::Body, Some(json!({ "a": 2 })));
        assert_eq!(req.segment(Segment::Body), json!({ "a": 2 }));
    }

    #[test]
    fn test_context_contains_all_segments() {
        let req = PlainRequest::new("GET").with(Segment::Params, json!({ "userId": 7 }));
        let ctx = req.context();

        assert_eq!(ctx["params"]["userId"], json!(7));
        assert_eq!(ctx["method"], json!("GET"));
        for segment in Segment::ALL {
            assert!(ctx.get(segment.as_str()).is_some());
        }
    }
}
