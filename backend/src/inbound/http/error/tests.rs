//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("connection string leaked: postgres://secret")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_request() -> Error {
    Error::invalid_request("bad")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"fields": {"text": ["This field is required."]}}))
}

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let value = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, header, value)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let (status, header, body) = body_of(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(invalid_request: Error) {
    let (status, header, body) = body_of(&invalid_request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "bad");
    assert_eq!(body["details"]["fields"]["text"][0], "This field is required.");
}

#[rstest]
#[actix_web::test]
async fn errors_without_trace_id_omit_the_header() {
    let (_, header, body) = body_of(&Error::not_found("missing")).await;
    assert!(header.is_none());
    assert!(body.get("traceId").is_none());
}

#[rstest]
#[tokio::test]
async fn errors_capture_the_scoped_trace_id() {
    let trace_id = crate::domain::TraceId::generate();
    let error = crate::domain::TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    let (_, header, _) = body_of(&error).await;
    assert_eq!(header, Some(trace_id.to_string()));
}

#[rstest]
fn actix_errors_become_internal() {
    let actix = actix_web::error::ErrorBadGateway("upstream exploded");
    let error = Error::from(actix);
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}

#[rstest]
#[actix_web::test]
async fn unmatched_routes_get_a_json_not_found() {
    use actix_web::{App, test, web};

    let app = test::init_service(App::new().default_service(web::to(not_found))).await;
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "no page at /nowhere");
}
