//! Contract tests pinning the published tool names, order, and annotations.
//!
//! Agents and prompt libraries refer to these names directly; renaming or
//! reordering a tool is a breaking change.

use std::sync::Arc;

use honeybadger_mcp_server::api::ApiClient;
use honeybadger_mcp_server::config::GlobalConfig;
use honeybadger_mcp_server::mcp::handler::{AppState, HoneybadgerServer};

const ALL_TOOLS: [&str; 27] = [
    "list_projects",
    "get_project",
    "create_project",
    "update_project",
    "delete_project",
    "get_project_occurrence_counts",
    "get_project_integrations",
    "get_project_report",
    "list_faults",
    "get_fault",
    "list_fault_notices",
    "list_fault_affected_users",
    "get_fault_counts",
    "query_insights",
    "get_insights_reference",
    "list_dashboards",
    "get_dashboard",
    "create_dashboard",
    "update_dashboard",
    "delete_dashboard",
    "list_alarms",
    "get_alarm",
    "create_alarm",
    "update_alarm",
    "delete_alarm",
    "get_alarm_history",
    "search_tools",
];

const WRITE_TOOLS: [&str; 9] = [
    "create_project",
    "update_project",
    "delete_project",
    "create_dashboard",
    "update_dashboard",
    "delete_dashboard",
    "create_alarm",
    "update_alarm",
    "delete_alarm",
];

fn server(read_only: bool) -> HoneybadgerServer {
    let config = GlobalConfig {
        auth_token: "contract-token".into(),
        read_only,
        ..GlobalConfig::default()
    };
    let config = Arc::new(config);
    let api = Arc::new(ApiClient::new(&config).expect("api client"));
    HoneybadgerServer::new(Arc::new(AppState { config, api })).expect("server builds")
}

fn names(server: &HoneybadgerServer) -> Vec<String> {
    server
        .tools()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect()
}

#[test]
fn full_mode_exposes_every_tool_in_order() {
    assert_eq!(names(&server(false)), ALL_TOOLS);
}

#[test]
fn read_only_mode_exposes_the_read_subset_in_order() {
    let expected: Vec<&str> = ALL_TOOLS
        .iter()
        .copied()
        .filter(|name| !WRITE_TOOLS.contains(name))
        .collect();
    assert_eq!(names(&server(true)), expected);
}

#[test]
fn write_tools_are_destructive_and_not_read_only() {
    let server = server(false);
    for tool in server.tools() {
        let annotations = tool.annotations.as_ref().expect("annotations");
        let is_write = WRITE_TOOLS.contains(&tool.name.as_ref());
        assert_eq!(
            annotations.read_only_hint,
            Some(!is_write),
            "{} read-only hint",
            tool.name
        );
        assert_eq!(
            annotations.destructive_hint,
            Some(is_write),
            "{} destructive hint",
            tool.name
        );
    }
}

#[test]
fn every_tool_has_a_description() {
    for tool in server(false).tools() {
        let description = tool.description.as_deref().unwrap_or_default();
        assert!(!description.is_empty(), "{} needs a description", tool.name);
    }
}

#[test]
fn catalog_excludes_search_tools() {
    let server = server(false);
    assert_eq!(server.catalog().len(), 26);
    assert!(server
        .catalog()
        .entries()
        .iter()
        .all(|entry| entry.name != "search_tools"));
}
