//! Unit tests for error display and classification.

use honeybadger_mcp_server::api::{RequestError, RequestErrorKind};
use honeybadger_mcp_server::mcp::tools::ToolError;
use honeybadger_mcp_server::AppError;
use reqwest::StatusCode;
use serde_json::json;

#[test]
fn app_error_display_is_prefixed() {
    assert_eq!(AppError::Config("bad".into()).to_string(), "config: bad");
    assert_eq!(AppError::Api("bad".into()).to_string(), "api: bad");
    assert_eq!(AppError::Mcp("bad".into()).to_string(), "mcp: bad");
}

#[test]
fn api_error_skips_empty_message_field() {
    let err = RequestError::api(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message": "", "errors": "Invalid"}"#,
    );
    assert_eq!(err.message, "Invalid");
}

#[test]
fn api_error_prefers_service_message() {
    let err = RequestError::api(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"errors": "Name can't be blank"}"#,
    );
    assert_eq!(err.kind, RequestErrorKind::Api);
    assert_eq!(err.status_code(), Some(422));
    assert_eq!(err.to_string(), "Name can't be blank");
    assert_eq!(err.body, Some(json!({"errors": "Name can't be blank"})));
}

#[test]
fn api_error_falls_back_to_reason_phrase() {
    let err = RequestError::api(StatusCode::BAD_GATEWAY, "");
    assert_eq!(err.message, "Bad Gateway");
}

#[test]
fn cancelled_error_is_classified() {
    let err = RequestError::cancelled();
    assert!(err.is_cancelled());
    assert_eq!(err.status_code(), None);
}

#[test]
fn tool_error_messages_are_stable() {
    assert_eq!(ToolError::required("project_id").to_string(), "project_id is required");
    assert_eq!(ToolError::Marshal.to_string(), "Failed to marshal response");
    assert_eq!(
        ToolError::Query("unknown field".into()).to_string(),
        "Insights query failed: unknown field"
    );

    let request = ToolError::Request {
        action: "list faults",
        source: RequestError::api(StatusCode::UNAUTHORIZED, ""),
    };
    assert_eq!(request.to_string(), "Failed to list faults: Unauthorized");
    assert!(std::error::Error::source(&request).is_some());
}
