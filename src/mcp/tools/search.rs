//! `search_tools` meta-tool over the frozen catalog.

use super::{ToolError, ToolResult};
use crate::mcp::registry::{Catalog, Param, ToolCall, ToolRegistry, ToolSpec};
use crate::mcp::shaper;
use crate::Result;

/// Text returned when nothing matches.
pub const NO_MATCHES: &str = "No tools found matching the query.";

/// Register `search_tools`. Call after the catalog is frozen.
///
/// # Errors
///
/// Returns `AppError::Mcp` on a duplicate tool name.
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(
        ToolSpec::new(
            "search_tools",
            "Search the available Honeybadger tools by keyword in their name or description.",
        )
        .read_only()
        .param(
            Param::string("query")
                .required()
                .min_length(1)
                .describe("Case-insensitive keyword, e.g. fault or dashboard"),
        ),
        |call| Box::pin(search_tools(call)),
    )?;
    Ok(())
}

#[allow(clippy::unused_async)] // handler signature
async fn search_tools(call: ToolCall) -> ToolResult {
    let query = call.args.get_string("query", "");
    if query.trim().is_empty() {
        return Err(ToolError::required("query"));
    }
    Ok(shaper::text(render(&call.catalog, &query)))
}

/// Render matching entries as `Name/Description/Read-only` blocks.
#[must_use]
pub fn render(catalog: &Catalog, query: &str) -> String {
    let matches = catalog.search(query);
    if matches.is_empty() {
        return NO_MATCHES.to_owned();
    }
    matches
        .iter()
        .map(|entry| {
            format!(
                "Name: {}\nDescription: {}\nRead-only: {}",
                entry.name,
                entry.description,
                if entry.read_only { "yes" } else { "no" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
