//! Shared test helpers for MCP-level integration tests.
//!
//! Builds a `HoneybadgerServer` pointed at a mock Service and connects an
//! rmcp client to it over an in-memory duplex pipe, so tests exercise the
//! same JSON-RPC path a real agent uses.

use std::sync::Arc;

use honeybadger_mcp_server::api::ApiClient;
use honeybadger_mcp_server::config::GlobalConfig;
use honeybadger_mcp_server::mcp::handler::{AppState, HoneybadgerServer};
use rmcp::model::{CallToolRequestParams, CallToolResult, JsonObject};
use rmcp::service::{RoleClient, RunningService};
use rmcp::{ServiceError, ServiceExt};
use serde_json::Value;

/// Auth token every test server sends.
pub const TEST_TOKEN: &str = "test-token";

/// `Authorization` header value for [`TEST_TOKEN`] with an empty password.
pub const TEST_BASIC_AUTH: &str = "Basic dGVzdC10b2tlbjo=";

/// Build a validated config targeting `api_url`.
pub fn test_config(api_url: &str, read_only: bool) -> GlobalConfig {
    let toml = format!(
        r#"
api_url = "{api_url}"
read_only = {read_only}
request_timeout_seconds = 5
"#
    );
    let mut config = GlobalConfig::from_toml_str(&toml).expect("valid test config");
    config.auth_token = TEST_TOKEN.into();
    config
}

/// Build shared state around a test config.
pub fn test_state(api_url: &str, read_only: bool) -> Arc<AppState> {
    let config = Arc::new(test_config(api_url, read_only));
    let api = Arc::new(ApiClient::new(&config).expect("api client"));
    Arc::new(AppState { config, api })
}

/// Build a fully registered server.
pub fn test_server(api_url: &str, read_only: bool) -> HoneybadgerServer {
    HoneybadgerServer::new(test_state(api_url, read_only)).expect("server builds")
}

/// Connected MCP client.
pub type TestClient = RunningService<RoleClient, ()>;

/// Start `server` on one end of a duplex pipe and connect a client to the other.
pub async fn connect(server: HoneybadgerServer) -> TestClient {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        if let Ok(service) = server.serve(server_io).await {
            let _ = service.waiting().await;
        }
    });
    ().serve(client_io).await.expect("client handshake")
}

/// Convenience: build and connect in one step.
pub async fn connect_to(api_url: &str, read_only: bool) -> TestClient {
    connect(test_server(api_url, read_only)).await
}

/// Convert a `json!({...})` literal into call arguments.
pub fn args(value: Value) -> JsonObject {
    value.as_object().cloned().expect("arguments must be an object")
}

/// Invoke a tool by name.
pub async fn call(
    client: &TestClient,
    name: &str,
    arguments: Value,
) -> Result<CallToolResult, ServiceError> {
    client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(args(arguments)),
            task: None,
        })
        .await
}

/// Text of the single content item of a tool result.
pub fn text_of(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1, "exactly one content item");
    result.content[0]
        .as_text()
        .map(|text| text.text.clone())
        .expect("text content")
}

/// Parse the single text item as JSON.
pub fn json_of(result: &CallToolResult) -> Value {
    serde_json::from_str(&text_of(result)).expect("tool text is JSON")
}

/// Whether the result is a tool-error result.
pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}
