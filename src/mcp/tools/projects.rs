//! Project tools: CRUD, occurrence counts, integrations, and reports.

use tracing::{info_span, Instrument};

use super::{failed, ToolError, ToolResult};
use crate::api::projects::{
    OccurrenceOptions, Period, ProjectRequest, ReportOptions, ReportType,
};
use crate::mcp::args::Arguments;
use crate::mcp::registry::{Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

/// Register every project tool.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        ToolSpec::new(
            "list_projects",
            "List Honeybadger projects, optionally limited to one account.",
        )
        .read_only()
        .param(Param::string("account_id").describe("Only list projects of this account")),
        |call| Box::pin(list_projects(call)),
    )?;

    registry.register(
        ToolSpec::new("get_project", "Get a single Honeybadger project by id.")
            .read_only()
            .param(Param::number("id").required().describe("Project id")),
        |call| Box::pin(get_project(call)),
    )?;

    registry.register(
        project_fields(
            ToolSpec::new("create_project", "Create a Honeybadger project in an account.")
                .destructive()
                .param(
                    Param::string("account_id")
                        .required()
                        .describe("Account to create the project in"),
                )
                .param(Param::string("name").required().describe("Project name")),
        ),
        |call| Box::pin(create_project(call)),
    )?;

    registry.register(
        project_fields(
            ToolSpec::new(
                "update_project",
                "Update settings of an existing Honeybadger project.",
            )
            .destructive()
            .param(Param::number("id").required().describe("Project id"))
            .param(Param::string("name").describe("New project name")),
        ),
        |call| Box::pin(update_project(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "delete_project",
            "Permanently delete a Honeybadger project and all of its data.",
        )
        .destructive()
        .param(Param::number("id").required().describe("Project id")),
        |call| Box::pin(delete_project(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "get_project_occurrence_counts",
            "Get error occurrence counts over time for one project, or for all projects when project_id is omitted.",
        )
        .read_only()
        .param(Param::number("project_id").describe("Project id; omit for all projects"))
        .param(
            Param::string("period")
                .one_of(&Period::ALL)
                .describe("Bucket size of each data point"),
        )
        .param(Param::string("environment").describe("Only count this environment")),
        |call| Box::pin(get_occurrence_counts(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "get_project_integrations",
            "List the notification integrations configured for a project.",
        )
        .read_only()
        .param(Param::number("project_id").required().describe("Project id")),
        |call| Box::pin(get_integrations(call)),
    )?;

    registry.register(
        ToolSpec::new(
            "get_project_report",
            "Get an aggregated notice report for a project grouped by class, location, user, or day.",
        )
        .read_only()
        .param(Param::number("project_id").required().describe("Project id"))
        .param(
            Param::string("report_type")
                .required()
                .one_of(&ReportType::ALL)
                .describe("Report grouping"),
        )
        .param(Param::string("start").describe("RFC 3339 start of the report range"))
        .param(Param::string("stop").describe("RFC 3339 end of the report range"))
        .param(Param::string("environment").describe("Only include this environment")),
        |call| Box::pin(get_report(call)),
    )?;

    Ok(())
}

/// Optional settings shared by create and update.
fn project_fields(spec: ToolSpec) -> ToolSpec {
    spec.param(
        Param::boolean("resolve_errors_on_deploy")
            .describe("Resolve all errors when a deploy is reported"),
    )
    .param(Param::boolean("disable_public_links").describe("Disable public error links"))
    .param(Param::string("user_url").describe("URL template linking to a user in your app"))
    .param(Param::string("source_url").describe("URL template linking to source code"))
    .param(
        Param::number("purge_days")
            .min(1)
            .describe("Days to keep notices before purging"),
    )
    .param(Param::string("user_search_field").describe("Field used to search users"))
}

fn project_request(args: &Arguments) -> std::result::Result<ProjectRequest, ToolError> {
    Ok(ProjectRequest {
        name: args.optional_string("name"),
        resolve_errors_on_deploy: args.optional_bool("resolve_errors_on_deploy"),
        disable_public_links: args.optional_bool("disable_public_links"),
        user_url: args.optional_string("user_url"),
        source_url: args.optional_string("source_url"),
        purge_days: args.int_in_range("purge_days", 1, None)?,
        user_search_field: args.optional_string("user_search_field"),
    })
}

async fn list_projects(call: ToolCall) -> ToolResult {
    let account_id = call.args.optional_string("account_id");
    let projects = match account_id.as_deref() {
        Some(account_id) => call.api.projects.list_by_account(&call.ct, account_id).await,
        None => call.api.projects.list_all(&call.ct).await,
    }
    .map_err(failed("list projects"))?;

    shaper::json(&shaper::project_summaries(projects))
}

async fn get_project(call: ToolCall) -> ToolResult {
    let id = call.args.require_int("id")?;
    let project = call
        .api
        .projects
        .get(&call.ct, id)
        .await
        .map_err(failed("get project"))?;
    shaper::json(&project)
}

async fn create_project(call: ToolCall) -> ToolResult {
    let account_id = call.args.require_string("account_id")?;
    call.args.require_string("name")?;
    let request = project_request(&call.args)?;

    let span = info_span!("create_project", %account_id);
    async move {
        let project = call
            .api
            .projects
            .create(&call.ct, &account_id, &request)
            .await
            .map_err(failed("create project"))?;
        shaper::json(&project)
    }
    .instrument(span)
    .await
}

async fn update_project(call: ToolCall) -> ToolResult {
    let id = call.args.require_int("id")?;
    let request = project_request(&call.args)?;

    let span = info_span!("update_project", project_id = id);
    async move {
        let ack = call
            .api
            .projects
            .update(&call.ct, id, &request)
            .await
            .map_err(failed("update project"))?;
        shaper::json(&ack)
    }
    .instrument(span)
    .await
}

async fn delete_project(call: ToolCall) -> ToolResult {
    let id = call.args.require_int("id")?;

    let span = info_span!("delete_project", project_id = id);
    async move {
        let ack = call
            .api
            .projects
            .delete(&call.ct, id)
            .await
            .map_err(failed("delete project"))?;
        shaper::json(&ack)
    }
    .instrument(span)
    .await
}

async fn get_occurrence_counts(call: ToolCall) -> ToolResult {
    let options = OccurrenceOptions {
        period: call.args.one_of("period", &Period::ALL)?,
        environment: call.args.optional_string("environment"),
    };

    match call.args.get_int("project_id", 0) {
        0 => {
            let counts = call
                .api
                .projects
                .all_occurrence_counts(&call.ct, &options)
                .await
                .map_err(failed("get occurrence counts"))?;
            shaper::json(&counts)
        }
        project_id => {
            let counts = call
                .api
                .projects
                .occurrence_counts(&call.ct, project_id, &options)
                .await
                .map_err(failed("get occurrence counts"))?;
            shaper::json(&counts)
        }
    }
}

async fn get_integrations(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let integrations = call
        .api
        .projects
        .integrations(&call.ct, project_id)
        .await
        .map_err(failed("get project integrations"))?;
    shaper::json(&integrations)
}

async fn get_report(call: ToolCall) -> ToolResult {
    let project_id = call.args.require_int("project_id")?;
    let report: ReportType = call
        .args
        .one_of("report_type", &ReportType::ALL)?
        .ok_or_else(|| ToolError::required("report_type"))?;
    let options = ReportOptions {
        start: call.args.rfc3339("start"),
        stop: call.args.rfc3339("stop"),
        environment: call.args.optional_string("environment"),
    };

    let rows = call
        .api
        .projects
        .report(&call.ct, project_id, report, &options)
        .await
        .map_err(failed("get project report"))?;
    shaper::json(&rows)
}
