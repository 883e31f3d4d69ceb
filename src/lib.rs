#![forbid(unsafe_code)]

//! Honeybadger error-tracking API exposed as MCP tools.

pub mod api;
pub mod config;
pub mod errors;
pub mod mcp;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
