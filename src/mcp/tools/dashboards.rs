//! Dashboard tools.

use super::{failed, ToolError, ToolResult};
use crate::api::dashboards::DashboardRequest;
use crate::mcp::registry::{Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

const WIDGETS_HINT: &str =
    "JSON array of widget definitions, encoded as a string (see get_insights_reference)";

/// Register every dashboard tool.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        ToolSpec::new("list_dashboards", "List the Insights dashboards of a project.")
            .read_only()
            .param(project_id()),
        |call| Box::pin(list_dashboards(call)),
    )?;

    registry.register(
        ToolSpec::new("get_dashboard", "Get an Insights dashboard with its widgets.")
            .read_only()
            .param(project_id())
            .param(dashboard_id()),
        |call| Box::pin(get_dashboard(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "create_dashboard",
            "Create an Insights dashboard. Call get_insights_reference first to learn the widget format.",
        )
        .destructive()
        .param(project_id())
        .param(Param::string("title").required().describe("Dashboard title"))
        .param(Param::json("widgets").required().describe(WIDGETS_HINT)),
        |call| Box::pin(create_dashboard(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "update_dashboard",
            "Update the title or widgets of an Insights dashboard. Call get_insights_reference first to learn the widget format.",
        )
        .destructive()
        .param(project_id())
        .param(dashboard_id())
        .param(Param::string("title").describe("New dashboard title"))
        .param(Param::json("widgets").describe(WIDGETS_HINT)),
        |call| Box::pin(update_dashboard(call)),
    )?;

    registry.register(
        ToolSpec::new("delete_dashboard", "Delete an Insights dashboard.")
            .destructive()
            .param(project_id())
            .param(dashboard_id()),
        |call| Box::pin(delete_dashboard(call)),
    )?;

    Ok(())
}

fn project_id() -> Param {
    Param::number("project_id").required().describe("Project id")
}

fn dashboard_id() -> Param {
    Param::string("dashboard_id").required().describe("Dashboard id")
}

async fn list_dashboards(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let dashboards = call
        .api
        .dashboards
        .list(&call.ct, project_id)
        .await
        .map_err(failed("list dashboards"))?;
    shaper::json(&dashboards)
}

async fn get_dashboard(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let dashboard_id = call.args.require_string("dashboard_id")?;
    let dashboard = call
        .api
        .dashboards
        .get(&call.ct, project_id, &dashboard_id)
        .await
        .map_err(failed("get dashboard"))?;
    shaper::json(&dashboard)
}

async fn create_dashboard(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let request = DashboardRequest {
        title: Some(call.args.require_string("title")?),
        widgets: Some(widgets(call.args.require_json("widgets")?)?),
    };

    let dashboard = call
        .api
        .dashboards
        .create(&call.ct, project_id, &request)
        .await
        .map_err(failed("create dashboard"))?;
    shaper::json(&dashboard)
}

async fn update_dashboard(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let dashboard_id = call.args.require_string("dashboard_id")?;
    let request = DashboardRequest {
        title: call.args.optional_string("title"),
        widgets: call.args.json("widgets")?.map(widgets).transpose()?,
    };

    let outcome = call
        .api
        .dashboards
        .update(&call.ct, project_id, &dashboard_id, &request)
        .await
        .map_err(failed("update dashboard"))?;
    shaper::json(&outcome)
}

async fn delete_dashboard(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let dashboard_id = call.args.require_string("dashboard_id")?;
    let ack = call
        .api
        .dashboards
        .delete(&call.ct, project_id, &dashboard_id)
        .await
        .map_err(failed("delete dashboard"))?;
    shaper::json(&ack)
}

fn widgets(value: serde_json::Value) -> std::result::Result<serde_json::Value, ToolError> {
    if value.is_array() {
        Ok(value)
    } else {
        Err(ToolError::validation("widgets must be a JSON array"))
    }
}
