//! Common types used throughout the middleware chain.
//!
//! This module defines the HTTP request and response types used by middleware.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used in the middleware chain.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware chain.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a JSON response with the given status code.
    fn json(status: http::StatusCode, body: &serde_json::Value) -> Response;

    /// Creates the JSON envelope of an error that no handler turned into a response.
    fn internal_error(message: &str) -> Response;
}

impl ResponseExt for Response {
    fn json(status: http::StatusCode, body: &serde_json::Value) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON response")
    }

    fn internal_error(message: &str) -> Response {
        let status = http::StatusCode::INTERNAL_SERVER_ERROR;
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Internal Server Error"),
            "message": message
        });
        Self::json(status, &body)
    }
}
