//! End-to-end tests of the JSON Schema engine driven by the core pipeline.

use celebrate_core::{
    Celebrate, CelebrateOptions, ConfigurationError, Mode, PlainRequest, Segment, SegmentedRequest,
    ValidationOptions,
};
use celebrate_schema::JsonSchemaEngine;
use serde_json::{json, Value};
use std::sync::Arc;

fn celebrate(spec: Value, options: CelebrateOptions) -> Celebrate {
    Celebrate::new(spec, ValidationOptions::default(), options, Arc::new(JsonSchemaEngine::new())).unwrap()
}

#[tokio::test]
async fn test_body_default_is_applied() {
    let middleware = celebrate(
        json!({
            "body": {
                "type": "object",
                "required": ["first"],
                "properties": {
                    "first": { "type": "string" },
                    "role": { "type": "integer", "default": "admin" }
                }
            }
        }),
        CelebrateOptions::default(),
    );

    let mut req = PlainRequest::new("POST").with(Segment::Body, json!({ "first": "john" }));
    middleware.validate(&mut req).await.unwrap();
    assert_eq!(req.segment(Segment::Body), json!({ "first": "john", "role": "admin" }));

    // Same outcome on a fresh request.
    let mut again = PlainRequest::new("POST").with(Segment::Body, json!({ "first": "john" }));
    middleware.validate(&mut again).await.unwrap();
    assert_eq!(again, req);
}

#[tokio::test]
async fn test_header_pattern_mismatch() {
    let middleware = celebrate(
        json!({
            "headers": {
                "type": "object",
                "properties": { "accept": { "type": "string", "pattern": "xml" } }
            }
        }),
        CelebrateOptions::default(),
    );

    let mut req = PlainRequest::new("GET").with(Segment::Headers, json!({ "accept": "application/json" }));
    let err = middleware.validate(&mut req).await.unwrap_err();

    assert_eq!(err.len(), 1);
    let headers = err.get(Segment::Headers).unwrap();
    let keys: Vec<String> = headers.violations().iter().map(|v| v.dotted_path()).collect();
    assert_eq!(keys, vec!["accept"]);
    assert!(headers.message.contains("xml"));
}

#[tokio::test]
async fn test_query_is_coerced() {
    let middleware = celebrate(
        json!({
            "query": {
                "type": "object",
                "properties": {
                    "page": { "type": "integer", "minimum": 1 },
                    "all": { "type": "boolean", "default": false }
                }
            }
        }),
        CelebrateOptions::default(),
    );

    let mut req = PlainRequest::new("GET").with(Segment::Query, json!({ "page": "3" }));
    middleware.validate(&mut req).await.unwrap();
    assert_eq!(req.segment(Segment::Query), json!({ "page": 3, "all": false }));

    let mut bad = PlainRequest::new("GET").with(Segment::Query, json!({ "page": "0" }));
    assert!(middleware.validate(&mut bad).await.is_err());
}

#[tokio::test]
async fn test_bodyless_methods_skip_body() {
    let middleware = celebrate(
        json!({ "body": { "type": "object", "required": ["first"] } }),
        CelebrateOptions::default(),
    );

    for method in ["GET", "head", "Get"] {
        let mut req = PlainRequest::new(method);
        middleware.validate(&mut req).await.unwrap();
        assert!(req.segment(Segment::Body).is_null());
    }

    let mut post = PlainRequest::new("POST");
    assert!(middleware.validate(&mut post).await.is_err());
}

#[tokio::test]
async fn test_full_mode_reports_every_segment_and_mutates_nothing() {
    let middleware = celebrate(
        json!({
            "params": { "properties": { "id": { "type": "integer" } } },
            "query": { "properties": { "page": { "type": "integer" } } },
            "body": { "type": "object", "required": ["first"] }
        }),
        CelebrateOptions::with_mode(Mode::Full),
    );

    let original = PlainRequest::new("POST")
        .with(Segment::Params, json!({ "id": "7" }))
        .with(Segment::Query, json!({ "page": "one" }))
        .with(Segment::Body, json!({}));
    let mut req = original.clone();

    let err = middleware.validate(&mut req).await.unwrap_err();
    assert_eq!(err.segments().collect::<Vec<_>>(), vec![Segment::Query, Segment::Body]);
    // params would have been coerced, but nothing is applied on failure.
    assert_eq!(req, original);
}

#[tokio::test]
async fn test_partial_mode_reports_first_failure() {
    let middleware = celebrate(
        json!({
            "query": { "properties": { "page": { "type": "integer" } } },
            "body": { "type": "object", "required": ["first"] }
        }),
        CelebrateOptions::default(),
    );

    let mut req = PlainRequest::new("POST")
        .with(Segment::Query, json!({ "page": "one" }))
        .with(Segment::Body, json!({}));

    let err = middleware.validate(&mut req).await.unwrap_err();
    assert_eq!(err.segments().collect::<Vec<_>>(), vec![Segment::Query]);
}

#[tokio::test]
async fn test_req_context_sees_validated_params() {
    let middleware = celebrate(
        json!({
            "params": { "properties": { "userId": { "type": "integer" } } },
            "body": {
                "properties": { "userId": { "type": "integer", "x-context": "/params/userId" } }
            }
        }),
        CelebrateOptions::default().req_context(true),
    );

    let mut req = PlainRequest::new("POST")
        .with(Segment::Params, json!({ "userId": "12" }))
        .with(Segment::Body, json!({ "userId": 12 }));
    middleware.validate(&mut req).await.unwrap();

    let mut wrong = PlainRequest::new("POST")
        .with(Segment::Params, json!({ "userId": "12" }))
        .with(Segment::Body, json!({ "userId": 13 }));
    let err = middleware.validate(&mut wrong).await.unwrap_err();
    assert!(err.get(Segment::Body).is_some());
}

#[test]
fn test_invalid_schema_is_a_configuration_error() {
    let err = Celebrate::new(
        json!({ "body": { "type": "nonsense" } }),
        ValidationOptions::default(),
        CelebrateOptions::default(),
        Arc::new(JsonSchemaEngine::new()),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigurationError::SchemaCompile { segment: Segment::Body, .. }));
}
