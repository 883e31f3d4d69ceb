//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering startup and assembly failures.
///
/// Per-call failures are not `AppError`s: the HTTP transport reports
/// [`crate::api::RequestError`] and tool handlers report
/// [`crate::mcp::tools::ToolError`], both of which end up as MCP tool-error
/// results rather than process failures.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or credential lookup failure.
    Config(String),
    /// HTTP client construction failure.
    Api(String),
    /// MCP protocol, registration, or transport failure.
    Mcp(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Api(msg) => write!(f, "api: {msg}"),
            Self::Mcp(msg) => write!(f, "mcp: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}
