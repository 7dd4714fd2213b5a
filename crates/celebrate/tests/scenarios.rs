//! Request scenarios run through the facade constructors.

use bytes::Bytes;
use celebrate::prelude::*;
use celebrate::middleware::middleware::{BoxFuture, MiddlewareResult};
use celebrate::middleware::HttpSegments;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde_json::{json, Value};

fn request(method: &str, uri: &str, body: Option<&Value>) -> Request {
    let builder = http::Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap(),
        None => builder.body(Full::new(Bytes::new())).unwrap(),
    }
}

fn validated(_ctx: &mut MiddlewareContext, request: Request) -> BoxFuture<'static, MiddlewareResult> {
    let body = values(&request).map_or(Value::Null, |v| serde_json::to_value(v).unwrap());
    Box::pin(async move { Ok(Response::json(StatusCode::OK, &body)) })
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn pipeline(stage: CelebrateMiddleware) -> Pipeline {
    Pipeline::builder()
        .add_stage(stage)
        .add_error_handler(celebrate::errors())
        .build()
}

#[tokio::test]
async fn test_body_default_is_applied() {
    let stage = celebrate::celebrate(json!({
        "body": {
            "type": "object",
            "required": ["first"],
            "properties": {
                "first": { "type": "string" },
                "role": { "type": "integer", "default": "admin" }
            }
        }
    }))
    .unwrap();

    let response = pipeline(stage)
        .process(
            MiddlewareContext::new(),
            request("POST", "/", Some(&json!({ "first": "john" }))),
            validated,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["body"], json!({ "first": "john", "role": "admin" }));
}

#[tokio::test]
async fn test_header_pattern_failure_is_a_validation_error() {
    let stage = celebrate::celebrate(json!({
        "headers": { "properties": { "accept": { "type": "string", "pattern": "xml" } } }
    }))
    .unwrap();
    let req = http::Request::builder()
        .uri("/")
        .header("accept", "application/json")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let mut segments = HttpSegments::from_request(req).await;
    let err = stage.celebrate().validate(&mut segments).await.unwrap_err();

    assert_eq!(err.len(), 1);
    let failure = err.get(Segment::Headers).unwrap();
    assert_eq!(failure.violations()[0].path, vec!["accept".to_string()]);
    assert!(failure.message.contains("xml"));

    // The same failure rendered by the default responder.
    let response = celebrate::errors().respond(&err);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());
    assert_eq!(
        body["validation"],
        json!({
            "headers": {
                "source": "headers",
                "keys": ["accept"],
                "message": failure.message
            }
        })
    );
}

#[tokio::test]
async fn test_foreign_error_reaches_next_handler_unchanged() {
    let responder = celebrate::errors();
    let pipeline = Pipeline::builder().add_error_handler(responder).build();

    let err = pipeline
        .handle_error(&mut MiddlewareContext::new(), MiddlewareError::other("disk full"))
        .await
        .unwrap_err();

    assert!(!is_celebrate_error(&err));
    assert_eq!(err.to_string(), "disk full");
}

#[tokio::test]
async fn test_partial_context_sees_coerced_params() {
    let stage = celebrate::celebrate_with(
        json!({
            "params": { "properties": { "userId": { "type": "integer" } } },
            "body": {
                "type": "object",
                "properties": { "userId": { "type": "integer", "x-context": "/params/userId" } }
            }
        }),
        ValidationOptions::default(),
        CelebrateOptions::default().req_context(true),
    )
    .unwrap();

    let mut req = request("POST", "/users/42", Some(&json!({ "userId": 42 })));
    req.extensions_mut().insert([("userId", "42")].into_iter().collect::<PathParams>());
    let response = pipeline(stage.clone()).process(MiddlewareContext::new(), req, validated).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut req = request("POST", "/users/42", Some(&json!({ "userId": 7 })));
    req.extensions_mut().insert([("userId", "42")].into_iter().collect::<PathParams>());
    let response = pipeline(stage).process(MiddlewareContext::new(), req, validated).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["validation"]["body"]["keys"], json!(["userId"]));
}

#[tokio::test]
async fn test_errors_with_custom_status() {
    assert!(celebrate::errors_with(ErrorsOptions::with_status(200)).is_err());

    let responder = celebrate::errors_with(ErrorsOptions::with_status(422).message("nope")).unwrap();
    assert_eq!(responder.options().status_code, 422);
}

#[tokio::test]
async fn test_config_driven_stage_uses_full_mode() {
    let config = CelebrateConfig::development();
    let stage = celebrate::celebrate_from_config(
        &config,
        json!({
            "query": { "properties": { "page": { "type": "integer" } } },
            "body": { "type": "object", "required": ["first"] }
        }),
    )
    .unwrap();
    assert_eq!(stage.celebrate().mode(), Mode::Full);

    let response = pipeline(stage)
        .process(
            MiddlewareContext::new(),
            request("POST", "/?page=one", Some(&json!({}))),
            validated,
        )
        .await;
    let body = json_body(response).await;
    let validation = body["validation"].as_object().unwrap();
    assert!(validation.contains_key("query"));
    assert!(validation.contains_key("body"));
}

#[tokio::test]
async fn test_same_stage_twice_gives_same_outcome() {
    let stage = celebrate::celebrate(json!({
        "query": { "properties": { "page": { "type": "integer", "default": 1 } } }
    }))
    .unwrap();
    let pipeline = pipeline(stage);

    let first = json_body(pipeline.process(MiddlewareContext::new(), request("GET", "/", None), validated).await).await;
    let second = json_body(pipeline.process(MiddlewareContext::new(), request("GET", "/", None), validated).await).await;

    assert_eq!(first, second);
    assert_eq!(first["query"], json!({ "page": 1 }));
}
