//! Fault rendering through a router with the envelope layer installed.

#![allow(clippy::unwrap_used)]

use api_envelope_core::{ResponseConfig, ResponseStatus, ValidationErrors};
use api_envelope_testing::{body_json, body_text, fixtures, init_tracing, mocks::RecordingReporter};
use api_envelope_web::{
    ApiReply, CarriedResponse, Fault, HttpFault, Responder, ValidationFault, WebResult,
    envelope_layer, handlers::fallback,
};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app(config: ResponseConfig, recorder: &RecordingReporter) -> Router {
    let responder = Responder::new(fixtures::example_builder_with(config))
        .with_reporter(recorder.sink());

    Router::new()
        .route("/validation", get(validation))
        .route("/validation/with-input", get(validation_with_input))
        .route("/forbidden", get(forbidden))
        .route("/model", get(model))
        .route("/unauthenticated", get(unauthenticated))
        .route("/translated", get(translated))
        .route("/carried/raw", get(carried_raw))
        .route("/carried/json", get(carried_json))
        .route("/broken", get(broken))
        .route("/users", get(users))
        .fallback(fallback::not_found)
        .layer(envelope_layer(responder.clone()))
        .with_state(responder)
}

async fn validation(State(responder): State<Responder>) -> WebResult<ApiReply> {
    Responder::fail_validation_when(true, [("key", "An error")])?;
    Ok(responder.no_content())
}

async fn validation_with_input() -> WebResult<ApiReply> {
    let errors = ValidationErrors::with_messages([("name", "The name field is required.")]);
    Err(ValidationFault::new(errors)
        .with_input(json!({"name": null}).as_object().cloned().unwrap_or_default())
        .into())
}

async fn forbidden() -> WebResult<ApiReply> {
    Err(HttpFault::new(ResponseStatus::FORBIDDEN).with_message("Error message").into())
}

async fn model() -> WebResult<ApiReply> {
    Err(Fault::model_not_found("User", [12]))
}

async fn unauthenticated() -> WebResult<ApiReply> {
    Err(Fault::unauthenticated("Authentication failed"))
}

async fn translated() -> WebResult<ApiReply> {
    Err(Fault::http(ResponseStatus::BAD_REQUEST, "example_code"))
}

async fn carried_raw() -> WebResult<ApiReply> {
    Err(CarriedResponse::raw(ResponseStatus::BAD_REQUEST, "This is a failed response").into())
}

async fn carried_json() -> WebResult<ApiReply> {
    Err(CarriedResponse::json(ResponseStatus::BAD_REQUEST, json!({"error": {"code": "012"}})).into())
}

async fn broken() -> WebResult<ApiReply> {
    Err(anyhow::anyhow!("A random error").into())
}

async fn users(State(responder): State<Responder>) -> WebResult<ApiReply> {
    Ok(responder.ok("example_code:status=listed", json!([{"name": "Jane"}])))
}

async fn call(app: Router, uri: &str) -> (StatusCode, axum::response::Response) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    (response.status(), response)
}

async fn call_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, response) = call(app, uri).await;
    (status, body_json(response).await.unwrap())
}

#[tokio::test]
async fn test_validation_fault_uses_translated_default_message() {
    init_tracing();
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/validation").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Validation Failed.",
            "errors": {"key": {"message": "An error"}},
        })
    );
}

#[tokio::test]
async fn test_validation_fault_with_input_reports_rejected_value() {
    let (status, body) = call_json(
        app(fixtures::example_config(), &RecordingReporter::new()),
        "/validation/with-input",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"],
        json!({"name": {"message": "The name field is required.", "rejected_value": null}})
    );
}

#[tokio::test]
async fn test_http_fault_keeps_status_and_message() {
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/forbidden").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"success": false, "message": "Error message"}));
}

#[tokio::test]
async fn test_normalized_faults_get_their_statuses() {
    let recorder = RecordingReporter::new();

    let (status, body) = call_json(app(fixtures::example_config(), &recorder), "/model").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Resource not found."));

    let (status, body) =
        call_json(app(fixtures::example_config(), &recorder), "/unauthenticated").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Authentication failed"));

    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_http_fault_message_is_translated() {
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/translated").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("An example error message"));
    assert_eq!(body.get("error_code"), None);
}

#[tokio::test]
async fn test_carried_responses_are_reshaped() {
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/carried/raw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "An error occurred",
            "error": {"content": "This is a failed response"},
        })
    );

    let (_, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/carried/json").await;
    assert_eq!(
        body,
        json!({"success": false, "message": "An error occurred", "error": {"code": "012"}})
    );
}

#[tokio::test]
async fn test_unclassified_fault_is_reported_and_minimal() {
    let recorder = RecordingReporter::new();
    let (status, body) = call_json(app(fixtures::example_config(), &recorder), "/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": "Server Error", "error": {"message": "Server Error"}})
    );
    assert_eq!(recorder.reports(), ["A random error"]);
}

#[tokio::test]
async fn test_unclassified_fault_in_debug_mode_has_diagnostics() {
    let config = fixtures::example_config().with_debug(true);
    let (_, body) = call_json(app(config, &RecordingReporter::new()), "/broken").await;

    let error = body["error"].as_object().unwrap();
    for key in ["message", "exception", "causes", "trace"] {
        assert!(error.contains_key(key), "missing {key}");
    }
    assert_eq!(error["message"], json!("A random error"));
}

#[tokio::test]
async fn test_html_fallback_when_enabled() {
    let config = fixtures::example_config().with_render_html_on_exception(true);
    let recorder = RecordingReporter::new();
    let (status, response) = call(app(config, &recorder), "/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.unwrap().contains("<!DOCTYPE html>"));
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_unknown_routes_get_a_json_404() {
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Resource not found."}));
}

#[tokio::test]
async fn test_handlers_use_the_state_responder() {
    let (status, body) =
        call_json(app(fixtures::example_config(), &RecordingReporter::new()), "/users").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Example success message, listed",
            "data": [{"name": "Jane"}],
        })
    );
}

#[test]
fn test_fault_tag_survives_rendering() {
    use axum::response::IntoResponse;

    let response = Fault::not_found("").into_response();
    let fault = response.extensions().get::<Arc<Fault>>().unwrap();
    assert!(matches!(fault.as_ref(), Fault::NotFound(_)));
}
