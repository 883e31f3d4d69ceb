//! Tool descriptors, registration, and the searchable catalog.
//!
//! Descriptors are declared with [`ToolSpec`] and [`Param`] and turned into
//! rmcp [`Tool`]s with a JSON schema and read-only/destructive annotations.
//! In read-only mode, tools not hinted read-only are never added to the
//! router, so `tools/list` omits them and a direct `tools/call` fails with
//! the framework's "tool not found" error.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::args::Arguments;
use super::handler::HoneybadgerServer;
use super::tools::ToolResult;
use crate::api::ApiClient;
use crate::{AppError, Result};

// ── Parameter schema ─────────────────────────────────────

/// Parameter value type as declared in the tool schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Free-form string.
    String,
    /// Number, coerced from numeric strings.
    Number,
    /// Boolean.
    Boolean,
    /// A JSON document passed as an encoded string.
    Json,
}

/// One declared tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: &'static str,
    kind: ParamType,
    required: bool,
    description: Option<&'static str>,
    minimum: Option<i64>,
    maximum: Option<i64>,
    min_length: Option<u64>,
    allowed: &'static [&'static str],
}

impl Param {
    fn new(name: &'static str, kind: ParamType) -> Self {
        Self {
            name,
            kind,
            required: false,
            description: None,
            minimum: None,
            maximum: None,
            min_length: None,
            allowed: &[],
        }
    }

    /// String parameter.
    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self::new(name, ParamType::String)
    }

    /// Numeric parameter.
    #[must_use]
    pub fn number(name: &'static str) -> Self {
        Self::new(name, ParamType::Number)
    }

    /// Boolean parameter.
    #[must_use]
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    /// JSON-encoded string parameter.
    #[must_use]
    pub fn json(name: &'static str) -> Self {
        Self::new(name, ParamType::Json)
    }

    /// Mark the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a description shown to the agent.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Inclusive lower bound for a number parameter.
    #[must_use]
    pub fn min(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Inclusive upper bound for a number parameter.
    #[must_use]
    pub fn max(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Minimum length of a string parameter.
    #[must_use]
    pub fn min_length(mut self, length: u64) -> Self {
        self.min_length = Some(length);
        self
    }

    /// Restrict a string parameter to an enumerated set.
    #[must_use]
    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    fn schema(&self) -> Value {
        let mut schema = JsonObject::new();
        let kind = match self.kind {
            ParamType::String | ParamType::Json => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        };
        schema.insert("type".into(), kind.into());
        if let Some(description) = self.description {
            schema.insert("description".into(), description.into());
        }
        if let Some(minimum) = self.minimum {
            schema.insert("minimum".into(), minimum.into());
        }
        if let Some(maximum) = self.maximum {
            schema.insert("maximum".into(), maximum.into());
        }
        if let Some(length) = self.min_length {
            schema.insert("minLength".into(), length.into());
        }
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        Value::Object(schema)
    }
}

// ── Tool descriptors ─────────────────────────────────────

/// Declarative descriptor of a single tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    name: &'static str,
    description: &'static str,
    read_only: bool,
    destructive: bool,
    params: Vec<Param>,
}

impl ToolSpec {
    /// Start a descriptor. Tools default to neither read-only nor destructive.
    #[must_use]
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            read_only: false,
            destructive: false,
            params: Vec::new(),
        }
    }

    /// Hint that the tool never changes Service state.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Hint that the tool may change or delete Service state.
    #[must_use]
    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    /// Append an input parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// JSON schema of the tool's input object.
    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        let properties: JsonObject = self
            .params
            .iter()
            .map(|param| (param.name.to_owned(), param.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".into(), "object".into());
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    /// rmcp descriptor with schema and annotations.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema())).annotate(
            ToolAnnotations::new()
                .read_only(self.read_only)
                .destructive(self.destructive),
        )
    }
}

// ── Catalog ──────────────────────────────────────────────

/// `{name, description, read-only}` triple used by tool search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Whether the tool is hinted read-only.
    pub read_only: bool,
}

/// Frozen, ordered view of the registered tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match over name and description.
    ///
    /// Results keep registration order; there is no ranking.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&needle)
                    || entry.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

// ── Registry ─────────────────────────────────────────────

/// Everything a handler needs for one invocation.
pub struct ToolCall {
    /// Shared API client.
    pub api: Arc<ApiClient>,
    /// Frozen tool catalog.
    pub catalog: Arc<Catalog>,
    /// Raw call arguments.
    pub args: Arguments,
    /// Cancelled when the client abandons the request or the server stops.
    pub ct: CancellationToken,
}

/// Boxed handler future.
pub type ToolFuture = BoxFuture<'static, ToolResult>;

/// Collects descriptors and routes while the server is assembled.
pub struct ToolRegistry {
    read_only: bool,
    frozen: bool,
    names: HashSet<&'static str>,
    router: ToolRouter<HoneybadgerServer>,
    tools: Vec<Tool>,
    catalog: Vec<CatalogEntry>,
}

impl ToolRegistry {
    /// Empty registry applying the given read-only policy.
    #[must_use]
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only,
            frozen: false,
            names: HashSet::new(),
            router: ToolRouter::new(),
            tools: Vec::new(),
            catalog: Vec::new(),
        }
    }

    /// Register a tool and its handler.
    ///
    /// Returns `false` when the read-only policy filtered the tool out.
    /// Tools registered after [`Self::freeze`] are routable but are not
    /// part of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the name is already registered.
    pub fn register<F>(&mut self, spec: ToolSpec, handler: F) -> Result<bool>
    where
        F: Fn(ToolCall) -> ToolFuture + Send + Sync + 'static,
    {
        if self.read_only && !spec.read_only {
            debug!(tool = spec.name, "skipping tool in read-only mode");
            return Ok(false);
        }
        if !self.names.insert(spec.name) {
            return Err(AppError::Mcp(format!(
                "tool {} registered more than once",
                spec.name
            )));
        }

        let tool = spec.to_tool();
        let handler = Arc::new(handler);
        self.router.add_route(ToolRoute::new_dyn(
            tool.clone(),
            move |context: ToolCallContext<'_, HoneybadgerServer>| {
                let handler = Arc::clone(&handler);
                Box::pin(dispatch(context, handler))
            },
        ));
        self.tools.push(tool);

        if !self.frozen {
            self.catalog.push(CatalogEntry {
                name: spec.name.to_owned(),
                description: spec.description.to_owned(),
                read_only: spec.read_only,
            });
        }
        Ok(true)
    }

    /// Stop adding registrations to the catalog.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Number of routable tools so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Consume the registry into its router, ordered descriptors, and catalog.
    #[must_use]
    pub fn finish(self) -> (ToolRouter<HoneybadgerServer>, Vec<Tool>, Catalog) {
        (
            self.router,
            self.tools,
            Catalog {
                entries: self.catalog,
            },
        )
    }
}

/// Run a handler and convert its failure into a tool-error result.
async fn dispatch<F>(
    context: ToolCallContext<'_, HoneybadgerServer>,
    handler: Arc<F>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData>
where
    F: Fn(ToolCall) -> ToolFuture + Send + Sync + 'static,
{
    let call = ToolCall {
        api: Arc::clone(&context.service.state().api),
        catalog: Arc::clone(context.service.catalog()),
        args: Arguments::from(context.arguments),
        ct: context.request_context.ct.clone(),
    };

    match handler(call).await {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!(tool = %context.name, error = %err, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
        }
    }
}
