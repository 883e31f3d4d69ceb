//! MCP tool handlers, one module per resource family.
//!
//! Handlers validate their arguments, call the matching resource service,
//! and shape the response. Every failure is a [`ToolError`], which the
//! registry turns into an MCP tool-error result so the agent sees a stable
//! message instead of a protocol failure.

pub mod alarms;
pub mod dashboards;
pub mod faults;
pub mod insights;
pub mod projects;
pub mod search;

use std::fmt::{Display, Formatter};

use rmcp::model::CallToolResult;

use super::registry::ToolRegistry;
use crate::api::RequestError;
use crate::Result;

/// Outcome of a tool handler.
pub type ToolResult = std::result::Result<CallToolResult, ToolError>;

/// Handler-level failure reported to the agent as a tool-error result.
#[derive(Debug)]
pub enum ToolError {
    /// Missing or malformed argument; the message names the parameter.
    Validation(String),
    /// The Service request failed.
    Request {
        /// Verb and resource, e.g. `list faults`.
        action: &'static str,
        /// Underlying transport or API failure.
        source: RequestError,
    },
    /// The response could not be serialized back to JSON.
    Marshal,
    /// An Insights query was rejected by the Service.
    Query(String),
}

impl ToolError {
    /// Build a validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// `<name> is required`.
    #[must_use]
    pub fn required(name: &str) -> Self {
        Self::Validation(format!("{name} is required"))
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => f.write_str(msg),
            Self::Request { action, source } => write!(f, "Failed to {action}: {source}"),
            Self::Marshal => f.write_str("Failed to marshal response"),
            Self::Query(msg) => write!(f, "Insights query failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Adapter for `map_err` that tags a [`RequestError`] with the attempted action.
pub(crate) fn failed(action: &'static str) -> impl FnOnce(RequestError) -> ToolError {
    move |source| ToolError::Request { action, source }
}

/// Register every resource tool, freeze the catalog, then add `search_tools`.
///
/// # Errors
///
/// Returns `AppError::Mcp` if a tool name is registered twice.
pub fn register_all(registry: &mut ToolRegistry) -> Result<()> {
    projects::register(registry)?;
    faults::register(registry)?;
    insights::register(registry)?;
    dashboards::register(registry)?;
    alarms::register(registry)?;
    registry.freeze();
    search::register(registry)
}
