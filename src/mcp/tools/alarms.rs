//! Alarm tools, including trigger history.

use serde_json::Value;

use super::{failed, ToolError, ToolResult};
use crate::api::alarms::AlarmRequest;
use crate::mcp::args::Arguments;
use crate::mcp::registry::{Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

const TRIGGER_HINT: &str =
    "JSON object describing when the alarm fires, encoded as a string (see get_insights_reference)";
const STREAMS_HINT: &str = "JSON array of stream ids, encoded as a string";

/// Register every alarm tool.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        ToolSpec::new("list_alarms", "List the Insights alarms of a project.")
            .read_only()
            .param(project_id()),
        |call| Box::pin(list_alarms(call)),
    )?;

    registry.register(
        ToolSpec::new("get_alarm", "Get an Insights alarm and its trigger configuration.")
            .read_only()
            .param(project_id())
            .param(alarm_id()),
        |call| Box::pin(get_alarm(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "create_alarm",
            "Create an Insights alarm that fires when a BadgerQL query crosses a threshold. Call get_insights_reference first to learn the query and trigger formats.",
        )
        .destructive()
        .param(project_id())
        .param(Param::string("name").required().describe("Alarm name"))
        .param(Param::string("query").required().describe("BadgerQL query to evaluate"))
        .param(
            Param::string("evaluation_period")
                .required()
                .describe("History window read by each check, e.g. 5m or 1h"),
        )
        .param(Param::json("trigger_config").required().describe(TRIGGER_HINT))
        .param(Param::string("description").describe("Alarm description"))
        .param(Param::json("stream_ids").describe(STREAMS_HINT)),
        |call| Box::pin(create_alarm(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "update_alarm",
            "Update an Insights alarm. Call get_insights_reference first to learn the query and trigger formats.",
        )
        .destructive()
        .param(project_id())
        .param(alarm_id())
        .param(Param::string("name").describe("Alarm name"))
        .param(Param::string("query").describe("BadgerQL query to evaluate"))
        .param(Param::string("evaluation_period").describe("History window read by each check"))
        .param(Param::json("trigger_config").describe(TRIGGER_HINT))
        .param(Param::string("description").describe("Alarm description"))
        .param(Param::json("stream_ids").describe(STREAMS_HINT)),
        |call| Box::pin(update_alarm(call)),
    )?;

    registry.register(
        ToolSpec::new("delete_alarm", "Delete an Insights alarm.")
            .destructive()
            .param(project_id())
            .param(alarm_id()),
        |call| Box::pin(delete_alarm(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "get_alarm_history",
            "Get the trigger and resolve history of an Insights alarm.",
        )
        .read_only()
        .param(project_id())
        .param(alarm_id())
        .param(Param::number("page").min(1).describe("Page number")),
        |call| Box::pin(get_alarm_history(call)),
    )?;

    Ok(())
}

fn project_id() -> Param {
    Param::number("project_id").required().describe("Project id")
}

fn alarm_id() -> Param {
    Param::string("alarm_id").required().describe("Alarm id")
}

/// Shared optional alarm fields.
fn alarm_request(args: &Arguments) -> std::result::Result<AlarmRequest, ToolError> {
    Ok(AlarmRequest {
        name: args.optional_string("name"),
        description: args.optional_string("description"),
        query: args.optional_string("query"),
        evaluation_period: args.optional_string("evaluation_period"),
        trigger_config: args.json("trigger_config")?.map(trigger_config).transpose()?,
        stream_ids: args.json("stream_ids")?.map(stream_ids).transpose()?,
    })
}

fn trigger_config(value: Value) -> std::result::Result<Value, ToolError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(ToolError::validation("trigger_config must be a JSON object"))
    }
}

fn stream_ids(value: Value) -> std::result::Result<Value, ToolError> {
    if value.is_array() {
        Ok(value)
    } else {
        Err(ToolError::validation("stream_ids must be a JSON array"))
    }
}

async fn list_alarms(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let alarms = call
        .api
        .alarms
        .list(&call.ct, project_id)
        .await
        .map_err(failed("list alarms"))?;
    shaper::json(&alarms)
}

async fn get_alarm(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let alarm_id = call.args.require_string("alarm_id")?;
    let alarm = call
        .api
        .alarms
        .get(&call.ct, project_id, &alarm_id)
        .await
        .map_err(failed("get alarm"))?;
    shaper::json(&alarm)
}

async fn create_alarm(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    call.args.require_string("name")?;
    call.args.require_string("query")?;
    call.args.require_string("evaluation_period")?;
    call.args.require_json("trigger_config")?;
    let request = alarm_request(&call.args)?;

    let alarm = call
        .api
        .alarms
        .create(&call.ct, project_id, &request)
        .await
        .map_err(failed("create alarm"))?;
    shaper::json(&alarm)
}

async fn update_alarm(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let alarm_id = call.args.require_string("alarm_id")?;
    let request = alarm_request(&call.args)?;

    let outcome = call
        .api
        .alarms
        .update(&call.ct, project_id, &alarm_id, &request)
        .await
        .map_err(failed("update alarm"))?;
    shaper::json(&outcome)
}

async fn delete_alarm(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let alarm_id = call.args.require_string("alarm_id")?;
    let ack = call
        .api
        .alarms
        .delete(&call.ct, project_id, &alarm_id)
        .await
        .map_err(failed("delete alarm"))?;
    shaper::json(&ack)
}

async fn get_alarm_history(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let alarm_id = call.args.require_string("alarm_id")?;
    let page = call.args.int_in_range("page", 1, None)?;
    let history = call
        .api
        .alarms
        .history(&call.ct, project_id, &alarm_id, page)
        .await
        .map_err(failed("get alarm history"))?;
    shaper::json(&history)
}
