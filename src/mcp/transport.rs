//! Stdio transport for the agent connection.
//!
//! stdout carries MCP frames exclusively; all logging goes to stderr.

use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::handler::HoneybadgerServer;
use crate::{AppError, Result};

/// Serve the MCP server over stdio until the client disconnects or the
/// cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Mcp` if the MCP handshake fails or the service task
/// aborts.
pub async fn serve_stdio(server: HoneybadgerServer, ct: CancellationToken) -> Result<()> {
    info!("starting stdio MCP transport");
    let service = server
        .serve_with_ct(stdio(), ct)
        .await
        .map_err(|err| AppError::Mcp(format!("stdio transport failed: {err}")))?;

    let reason = service
        .waiting()
        .await
        .map_err(|err| AppError::Mcp(format!("stdio service error: {err}")))?;

    info!(?reason, "session unregistered");
    Ok(())
}
