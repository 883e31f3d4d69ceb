//! Fault tools: listings, details, notices, affected users, and counts.

use super::{failed, ToolResult};
use crate::api::faults::{FaultListOptions, FaultOrder, NoticeListOptions, MAX_LIMIT};
use crate::mcp::args::Arguments;
use crate::mcp::registry::{Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

const TIMESTAMP_HINT: &str = "RFC 3339 timestamp or Unix seconds";

/// Register every fault tool.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        time_filters(
            ToolSpec::new(
                "list_faults",
                "List faults (grouped errors) of a project with optional search, time filters, ordering, and paging.",
            )
            .read_only()
            .param(project_id())
            .param(Param::string("q").describe("Search query, e.g. class or message text")),
        )
        .param(
            Param::number("limit")
                .min(1)
                .max(MAX_LIMIT)
                .describe("Maximum number of faults to return"),
        )
        .param(
            Param::string("order")
                .one_of(&FaultOrder::ALL)
                .describe("Sort by most recent or most frequent"),
        )
        .param(Param::number("page").min(1).describe("Page number")),
        |call| Box::pin(list_faults(call)),
    )?;

    registry.register(
        ToolSpec::new("get_fault", "Get the details of a single fault.")
            .read_only()
            .param(project_id())
            .param(fault_id()),
        |call| Box::pin(get_fault(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "list_fault_notices",
            "List individual occurrences (notices) of a fault, including backtraces and request context.",
        )
        .read_only()
        .param(project_id())
        .param(fault_id())
        .param(Param::string("created_after").describe(TIMESTAMP_HINT))
        .param(Param::string("created_before").describe(TIMESTAMP_HINT))
        .param(
            Param::number("limit")
                .min(1)
                .max(MAX_LIMIT)
                .describe("Maximum number of notices to return"),
        ),
        |call| Box::pin(list_notices(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "list_fault_affected_users",
            "List the users affected by a fault with their occurrence counts.",
        )
        .read_only()
        .param(project_id())
        .param(fault_id())
        .param(Param::string("q").describe("Filter users by this text")),
        |call| Box::pin(list_affected_users(call)),
    )?;

    registry.register(
        time_filters(
            ToolSpec::new(
                "get_fault_counts",
                "Get fault totals for a project broken down by environment and status.",
            )
            .read_only()
            .param(project_id())
            .param(Param::string("q").describe("Search query")),
        ),
        |call| Box::pin(get_fault_counts(call)),
    )?;

    Ok(())
}

fn project_id() -> Param {
    Param::number("project_id").required().describe("Project id")
}

fn fault_id() -> Param {
    Param::number("fault_id").required().describe("Fault id")
}

fn time_filters(spec: ToolSpec) -> ToolSpec {
    spec.param(Param::string("created_after").describe(TIMESTAMP_HINT))
        .param(Param::string("occurred_after").describe(TIMESTAMP_HINT))
        .param(Param::string("occurred_before").describe(TIMESTAMP_HINT))
}

fn search_options(args: &Arguments) -> FaultListOptions {
    FaultListOptions {
        q: args.optional_string("q"),
        created_after: args.unix_seconds("created_after"),
        occurred_after: args.unix_seconds("occurred_after"),
        occurred_before: args.unix_seconds("occurred_before"),
        ..FaultListOptions::default()
    }
}

async fn list_faults(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let options = FaultListOptions {
        limit: call.args.int_in_range("limit", 1, Some(MAX_LIMIT))?,
        order: call.args.one_of("order", &FaultOrder::ALL)?,
        page: call.args.int_in_range("page", 1, None)?,
        ..search_options(&call.args)
    };

    let faults = call
        .api
        .faults
        .list(&call.ct, project_id, &options)
        .await
        .map_err(failed("list faults"))?;
    shaper::json(&faults)
}

async fn get_fault(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let fault_id = call.args.require_int("fault_id")?;

    let fault = call
        .api
        .faults
        .get(&call.ct, project_id, fault_id)
        .await
        .map_err(failed("get fault"))?;
    shaper::json(&fault)
}

async fn list_notices(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let fault_id = call.args.require_int("fault_id")?;
    let options = NoticeListOptions {
        created_after: call.args.unix_seconds("created_after"),
        created_before: call.args.unix_seconds("created_before"),
        limit: call.args.int_in_range("limit", 1, Some(MAX_LIMIT))?,
    };

    let notices = call
        .api
        .faults
        .list_notices(&call.ct, project_id, fault_id, &options)
        .await
        .map_err(failed("list fault notices"))?;
    shaper::json(&notices)
}

async fn list_affected_users(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let fault_id = call.args.require_int("fault_id")?;
    let q = call.args.optional_string("q");

    let users = call
        .api
        .faults
        .list_affected_users(&call.ct, project_id, fault_id, q.as_deref())
        .await
        .map_err(failed("list affected users"))?;
    shaper::json(&users)
}

async fn get_fault_counts(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let options = search_options(&call.args);

    let counts = call
        .api
        .faults
        .counts(&call.ct, project_id, &options)
        .await
        .map_err(failed("get fault counts"))?;
    shaper::json(&counts)
}
