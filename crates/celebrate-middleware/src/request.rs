//! HTTP request adapter.
//!
//! [`HttpSegments`] exposes the six segments of an `http::Request` to the
//! validation core:
//!
//! | Segment | Source |
//! |---------|--------|
//! | `headers` | header map, lower-case names, repeated values joined with `", "` |
//! | `params` | [`PathParams`] extension set by the router |
//! | `query` | query string, repeated keys become arrays |
//! | `cookies` | `Cookie` headers, minus the signed ones |
//! | `signedCookies` | [`SignedCookies`] extension set by the cookie verifier |
//! | `body` | JSON or form-urlencoded body; an empty body is absent |
//!
//! Validated values are written back where the request can represent them
//! (body as JSON, scalar headers, query string, path params) and are always
//! kept in an overlay, so reads through the adapter and the
//! [`ValidatedSegments`] snapshot see the validated value in every case.

use crate::types::Request;
use bytes::Bytes;
use celebrate_core::{Segment, SegmentedRequest};
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use http::Uri;
use http_body_util::{BodyExt, Full};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// Request extensions
// ============================================================================

/// Path parameters resolved by the router, stored as a request extension.
///
/// ```
/// use celebrate_middleware::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("userId", "42");
/// assert_eq!(params.get("userId"), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: IndexMap<String, String>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn to_value(&self) -> Value {
        string_map(&self.inner)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Cookies whose signature was verified upstream, stored as a request extension.
///
/// Their names are left out of the `cookies` segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedCookies {
    inner: IndexMap<String, String>,
}

impl SignedCookies {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a verified cookie.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Returns the value of a verified cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Returns true if a cookie of that name was verified.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    fn to_value(&self) -> Value {
        string_map(&self.inner)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SignedCookies {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Every segment of a request after successful validation.
///
/// The celebrate stage stores it as a request extension; read it back with
/// [`values`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidatedSegments {
    segments: IndexMap<Segment, Value>,
}

impl ValidatedSegments {
    /// Returns the value of a segment.
    #[must_use]
    pub fn get(&self, segment: Segment) -> Option<&Value> {
        self.segments.get(&segment)
    }

    /// Returns the validated body.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.get(Segment::Body)
    }

    /// Returns the validated query.
    #[must_use]
    pub fn query(&self) -> Option<&Value> {
        self.get(Segment::Query)
    }

    /// Returns the validated path parameters.
    #[must_use]
    pub fn params(&self) -> Option<&Value> {
        self.get(Segment::Params)
    }

    /// Deserializes a segment into `T`.
    ///
    /// An absent segment deserializes from `null`.
    pub fn parse<T: DeserializeOwned>(&self, segment: Segment) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.get(segment).cloned().unwrap_or(Value::Null))
    }

    /// Returns `(segment, value)` pairs in segment order.
    pub fn iter(&self) -> impl Iterator<Item = (Segment, &Value)> {
        self.segments.iter().map(|(s, v)| (*s, v))
    }
}

impl FromIterator<(Segment, Value)> for ValidatedSegments {
    fn from_iter<I: IntoIterator<Item = (Segment, Value)>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// Returns the validated segments of a request that passed the celebrate stage.
///
/// ```
/// use celebrate_middleware::{values, Request};
/// use bytes::Bytes;
/// use http_body_util::Full;
///
/// let request: Request = http::Request::new(Full::new(Bytes::new()));
/// assert!(values(&request).is_none());
/// ```
#[must_use]
pub fn values(request: &Request) -> Option<&ValidatedSegments> {
    request.extensions().get::<ValidatedSegments>()
}

/// Returns the validated segments of a request, or `fallback` if it has none.
#[must_use]
pub fn values_or<'a>(request: &'a Request, fallback: &'a ValidatedSegments) -> &'a ValidatedSegments {
    values(request).unwrap_or(fallback)
}

// ============================================================================
// HttpSegments
// ============================================================================

/// [`SegmentedRequest`] over an `http::Request`.
#[derive(Debug)]
pub struct HttpSegments {
    parts: http::request::Parts,
    body: Bytes,
    overlay: IndexMap<Segment, Value>,
}

impl HttpSegments {
    /// Takes ownership of a request, buffering its body.
    pub async fn from_request(request: Request) -> Self {
        let (parts, body) = request.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self {
            parts,
            body,
            overlay: IndexMap::new(),
        }
    }

    /// Returns the current value of every segment.
    #[must_use]
    pub fn snapshot(&self) -> ValidatedSegments {
        Segment::ALL
            .into_iter()
            .map(|segment| (segment, self.segment(segment)))
            .collect()
    }

    /// Rebuilds the request.
    #[must_use]
    pub fn into_request(self) -> Request {
        Request::from_parts(self.parts, Full::new(self.body))
    }

    /// Rebuilds the request with a [`ValidatedSegments`] extension.
    #[must_use]
    pub fn into_validated_request(self) -> Request {
        let snapshot = self.snapshot();
        let mut request = self.into_request();
        request.extensions_mut().insert(snapshot);
        request
    }

    fn read(&self, segment: Segment) -> Value {
        match segment {
            Segment::Headers => self.read_headers(),
            Segment::Params => self
                .parts
                .extensions
                .get::<PathParams>()
                .map_or_else(|| Value::Object(Map::new()), PathParams::to_value),
            Segment::Query => parse_pairs(self.parts.uri.query().unwrap_or("")),
            Segment::Cookies => self.read_cookies(),
            Segment::SignedCookies => self
                .parts
                .extensions
                .get::<SignedCookies>()
                .map_or_else(|| Value::Object(Map::new()), SignedCookies::to_value),
            Segment::Body => self.read_body(),
        }
    }

    fn read_headers(&self) -> Value {
        let mut map = Map::new();
        for name in self.parts.headers.keys() {
            let joined = self
                .parts
                .headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            map.insert(name.as_str().to_string(), Value::String(joined));
        }
        Value::Object(map)
    }

    fn read_cookies(&self) -> Value {
        let signed = self.parts.extensions.get::<SignedCookies>();
        let mut map = Map::new();
        for header in self.parts.headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in header.split(';') {
                if let Some((name, value)) = cookie.trim().split_once('=') {
                    let name = name.trim();
                    if signed.is_some_and(|s| s.contains(name)) {
                        continue;
                    }
                    let value = value.trim().trim_matches('"');
                    map.insert(name.to_string(), Value::String(value.to_string()));
                }
            }
        }
        Value::Object(map)
    }

    fn read_body(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        let content_type = self
            .parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            return std::str::from_utf8(&self.body).map_or(Value::Null, parse_pairs);
        }
        // Anything that is not JSON reaches the schema as a string.
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned()))
    }

    fn write_through(&mut self, segment: Segment, value: &Value) {
        match segment {
            Segment::Headers => self.write_headers(value),
            Segment::Params => {
                if let Some(pairs) = scalar_pairs(value) {
                    self.parts.extensions.insert(pairs.into_iter().collect::<PathParams>());
                }
            }
            Segment::Query => self.write_query(value),
            Segment::Body => self.write_body(value),
            // Cookies and signed cookies live in the overlay only.
            Segment::Cookies | Segment::SignedCookies => {}
        }
    }

    fn write_headers(&mut self, value: &Value) {
        let Value::Object(map) = value else {
            return;
        };
        let dropped: Vec<HeaderName> = self
            .parts
            .headers
            .keys()
            .filter(|name| !map.contains_key(name.as_str()))
            .cloned()
            .collect();
        for name in &dropped {
            self.parts.headers.remove(name);
        }
        for (name, value) in map {
            let Some(value) = scalar_string(value) else {
                continue;
            };
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                self.parts.headers.insert(name, value);
            }
        }
    }

    fn write_query(&mut self, value: &Value) {
        let Some(pairs) = query_pairs(value) else {
            return;
        };
        let Ok(query) = serde_urlencoded::to_string(&pairs) else {
            return;
        };
        if let Some(uri) = with_query(&self.parts.uri, &query) {
            self.parts.uri = uri;
        }
    }

    fn write_body(&mut self, value: &Value) {
        let Ok(bytes) = serde_json::to_vec(value) else {
            return;
        };
        self.body = Bytes::from(bytes);
        self.parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.parts.headers.contains_key(CONTENT_LENGTH) {
            self.parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        }
    }
}

impl SegmentedRequest for HttpSegments {
    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn segment(&self, segment: Segment) -> Value {
        match self.overlay.get(&segment) {
            Some(value) => value.clone(),
            None => self.read(segment),
        }
    }

    fn set_segment(&mut self, segment: Segment, value: Value) {
        self.write_through(segment, &value);
        self.overlay.insert(segment, value);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn string_map(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Parses `a=1&b=2&b=3` into `{"a": "1", "b": ["2", "3"]}`.
fn parse_pairs(input: &str) -> Value {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(input) {
        Ok(pairs) => pairs,
        Err(error) => {
            tracing::debug!(error = %error, input, "unparseable urlencoded pairs, reading as empty");
            Vec::new()
        }
    };
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    Value::Object(map)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flattens an object of scalars. `None` if any value is not a scalar.
fn scalar_pairs(value: &Value) -> Option<Vec<(String, String)>> {
    let Value::Object(map) = value else {
        return None;
    };
    map.iter()
        .map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
        .collect()
}

/// Flattens an object of scalars and scalar arrays into query pairs.
fn query_pairs(value: &Value) -> Option<Vec<(String, String)>> {
    let Value::Object(map) = value else {
        return None;
    };
    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_string(item)?));
                }
            }
            other => pairs.push((key.clone(), scalar_string(other)?)),
        }
    }
    Some(pairs)
}

fn with_query(uri: &Uri, query: &str) -> Option<Uri> {
    let path = uri.path();
    let path_and_query = if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
