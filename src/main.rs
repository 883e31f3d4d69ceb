#![forbid(unsafe_code)]

//! `honeybadger-mcp-server`: MCP stdio server for the Honeybadger API.
//!
//! Resolves configuration (TOML file, environment, CLI flags, keychain),
//! builds the API client and tool registry, and serves MCP over stdio until
//! the client disconnects or the process receives SIGINT/SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use honeybadger_mcp_server::api::ApiClient;
use honeybadger_mcp_server::config::GlobalConfig;
use honeybadger_mcp_server::mcp::handler::{AppState, HoneybadgerServer};
use honeybadger_mcp_server::mcp::transport;
use honeybadger_mcp_server::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "honeybadger-mcp-server",
    about = "MCP server for the Honeybadger error-tracking API",
    version,
    long_about = None
)]
struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Personal auth token (overrides keychain and environment).
    #[arg(long)]
    auth_token: Option<String>,

    /// Honeybadger API base URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Expose only read-only tools.
    #[arg(long)]
    read_only: Option<bool>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = resolve_config(&args)?;
    init_tracing(args.log_format, &config.log_level)?;
    info!("honeybadger-mcp-server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(config))
}

/// Merge the TOML file, environment, and CLI flags, in increasing precedence.
fn resolve_config(args: &Cli) -> Result<GlobalConfig> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.apply_env()?;

    if let Some(url) = &args.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(read_only) = args.read_only {
        config.read_only = read_only;
    }
    if let Some(level) = &args.log_level {
        config.log_level.clone_from(level);
    }
    if let Some(token) = &args.auth_token {
        config.auth_token.clone_from(token);
    }

    config.validate()?;
    Ok(config)
}

async fn run(mut config: GlobalConfig) -> Result<()> {
    // ── Credentials ─────────────────────────────────────
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!(
        api_url = %config.api_url,
        read_only = config.read_only,
        "configuration loaded"
    );

    // ── API client and tool registry ────────────────────
    let api = Arc::new(ApiClient::new(&config)?);
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        api,
    });
    let server = HoneybadgerServer::new(state)?;

    // ── Serve until disconnect or signal ────────────────
    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    let result = transport::serve_stdio(server, ct.clone()).await;
    ct.cancel();
    info!("honeybadger-mcp-server shut down");
    result
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

/// Log to stderr; stdout belongs to the MCP transport.
fn init_tracing(log_format: LogFormat, default_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
