//! MCP server handler, shared application state, and tool router.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use rmcp::handler::server::{
    tool::{ToolCallContext, ToolRouter},
    ServerHandler,
};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{NotificationContext, RequestContext, RoleServer};
use tracing::{debug, error, info, info_span, Instrument};

use super::registry::{Catalog, ToolRegistry};
use super::tools;
use crate::api::ApiClient;
use crate::config::GlobalConfig;
use crate::Result;

/// Name advertised in the `initialize` response.
pub const SERVER_NAME: &str = "honeybadger-mcp-server";

const INSTRUCTIONS: &str = "Tools for the Honeybadger error-tracking API. \
    Use list_projects to find project ids, then list_faults and list_fault_notices \
    to investigate errors. Call get_insights_reference before writing BadgerQL \
    queries, dashboards, or alarms. Use search_tools to find a tool by keyword.";

/// Shared application state accessible by all MCP tool handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Honeybadger API client.
    pub api: Arc<ApiClient>,
}

/// MCP server exposing the Honeybadger API as tools.
pub struct HoneybadgerServer {
    state: Arc<AppState>,
    router: ToolRouter<Self>,
    tools: Vec<Tool>,
    catalog: Arc<Catalog>,
}

impl HoneybadgerServer {
    /// Build the server and register every tool allowed by the read-only policy.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if tool registration fails.
    pub fn new(state: Arc<AppState>) -> Result<Self> {
        let mut registry = ToolRegistry::new(state.config.read_only);
        tools::register_all(&mut registry)?;
        let (router, tools, catalog) = registry.finish();

        info!(
            api_url = %state.config.api_url,
            read_only = state.config.read_only,
            tool_count = tools.len(),
            "tool registry built"
        );

        Ok(Self {
            state,
            router,
            tools,
            catalog: Arc::new(catalog),
        })
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Frozen catalog searched by `search_tools`.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Routable tool descriptors in registration order.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

impl ServerHandler for HoneybadgerServer {
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        let span = info_span!("call_tool", tool = %request.name);

        async move {
            let started = Instant::now();
            debug!("tool call started");

            let outcome = AssertUnwindSafe(
                self.router
                    .call(ToolCallContext::new(self, request, context)),
            )
            .catch_unwind()
            .await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            match outcome {
                Ok(Ok(result)) => {
                    info!(
                        elapsed_ms,
                        is_error = result.is_error.unwrap_or(false),
                        "tool call completed"
                    );
                    Ok(result)
                }
                Ok(Err(err)) => {
                    error!(elapsed_ms, error = %err.message, "tool call rejected");
                    Err(err)
                }
                Err(panic) => {
                    let reason = panic_reason(panic.as_ref());
                    error!(elapsed_ms, reason, "tool handler panicked");
                    Err(rmcp::ErrorData::internal_error(
                        format!("tool handler panicked: {reason}"),
                        None,
                    ))
                }
            }
        }
        .instrument(span)
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.tools.clone())))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..ServerInfo::default()
        }
    }

    fn on_initialized(
        &self,
        context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        match context.peer.peer_info() {
            Some(peer) => info!(
                client = %peer.client_info.name,
                client_version = %peer.client_info.version,
                "session registered"
            ),
            None => info!("session registered"),
        }
        std::future::ready(())
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
