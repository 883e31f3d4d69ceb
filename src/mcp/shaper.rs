//! Response shaping: service results to MCP text content.
//!
//! Every successful tool result is a single text item holding JSON.
//! Envelopes are serialized as received; the project API key is removed at
//! the type level (see [`crate::api::projects::Project`]) so no shaping path
//! can emit it.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::error;

use super::tools::{ToolError, ToolResult};
use crate::api::projects::{Project, ProjectSummary};
use crate::api::types::ListResponse;

/// Serialize `value` as the single JSON text item of a successful result.
///
/// # Errors
///
/// Returns [`ToolError::Marshal`] if serialization fails.
pub fn json<T>(value: &T) -> ToolResult
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value)
        .map(text)
        .map_err(|err| {
            error!(%err, "failed to marshal tool response");
            ToolError::Marshal
        })
}

/// Successful result carrying plain text.
#[must_use]
pub fn text(body: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(body.into())])
}

/// Reduce each project to its summary fields, keeping `links` intact.
#[must_use]
pub fn project_summaries(projects: ListResponse<Project>) -> ListResponse<ProjectSummary> {
    projects.map(ProjectSummary::from)
}
