//! Insights tools: `BadgerQL` queries and the static query reference.

use tracing::debug;

use super::{failed, ToolError, ToolResult};
use crate::api::insights::InsightsQueryRequest;
use crate::mcp::registry::{Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

/// `BadgerQL` syntax, dashboard widget, and alarm trigger reference.
pub const REFERENCE: &str = include_str!("insights_reference.md");

/// Register the Insights tools.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        ToolSpec::new(
            "query_insights",
            "Run a BadgerQL query against a project's Insights data. Call get_insights_reference first to learn the query syntax.",
        )
        .read_only()
        .param(Param::number("project_id").required().describe("Project id"))
        .param(
            Param::string("query")
                .required()
                .min_length(1)
                .describe("BadgerQL query"),
        )
        .param(
            Param::string("ts")
                .describe("Time range such as PT3H, today, or an ISO 8601 interval"),
        )
        .param(Param::string("timezone").describe("IANA timezone for relative ranges")),
        |call| Box::pin(query_insights(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "get_insights_reference",
            "Get the BadgerQL reference used to write Insights queries, dashboard widgets, and alarms.",
        )
        .read_only(),
        |call| Box::pin(get_reference(call)),
    )?;

    Ok(())
}

#[allow(clippy::unused_async)] // handler signature
async fn get_reference(_call: ToolCall) -> ToolResult {
    Ok(shaper::text(REFERENCE))
}

async fn query_insights(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let request = InsightsQueryRequest {
        query: call.args.require_string("query")?,
        ts: call.args.optional_string("ts"),
        timezone: call.args.optional_string("timezone"),
    };

    let response = call
        .api
        .insights
        .query(&call.ct, project_id, &request)
        .await
        .map_err(failed("query insights"))?;

    if let Some(error) = response.error {
        debug!(project_id, "insights query rejected");
        return Err(ToolError::Query(error.message));
    }
    shaper::json(&response)
}
