//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Canonical Honeybadger API host.
pub const DEFAULT_API_URL: &str = "https://app.honeybadger.io";

/// Keychain service name used for credential lookup.
pub const KEYRING_SERVICE: &str = "honeybadger-mcp-server";

/// Environment variable holding the personal auth token.
pub const AUTH_TOKEN_ENV: &str = "HONEYBADGER_PERSONAL_AUTH_TOKEN";

const API_URL_ENV: &str = "HONEYBADGER_API_URL";
const READ_ONLY_ENV: &str = "HONEYBADGER_READ_ONLY";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

/// Global configuration parsed from an optional `config.toml`.
///
/// The auth token is never read from the TOML file; it is populated at
/// runtime from the CLI, the OS keychain, or the environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct GlobalConfig {
    /// Personal auth token used as the HTTP Basic username (populated at runtime).
    #[serde(skip)]
    pub auth_token: String,
    /// Base URL of the Honeybadger API, without the `/v2` suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// When true only tools hinted read-only are exposed.
    #[serde(default = "default_true")]
    pub read_only: bool,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            auth_token: String::new(),
            api_url: default_api_url(),
            read_only: true,
            request_timeout_seconds: default_request_timeout_seconds(),
            log_level: default_log_level(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an environment value is malformed.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Recognises `HONEYBADGER_API_URL`, `HONEYBADGER_READ_ONLY`, and
    /// `LOG_LEVEL`. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HONEYBADGER_READ_ONLY` is not a boolean
    /// or the resulting configuration fails validation.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(READ_ONLY_ENV) {
            self.read_only = parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("{READ_ONLY_ENV} must be a boolean, got '{raw}'"))
            })?;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        self.validate()
    }

    /// Resolve the auth token from the OS keychain with env-var fallback.
    ///
    /// A token already set (for example from `--auth-token`) wins and no
    /// lookup is performed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither the keychain nor
    /// `HONEYBADGER_PERSONAL_AUTH_TOKEN` provides a token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        if self.auth_token.trim().is_empty() {
            self.auth_token = load_credential("personal_auth_token", AUTH_TOKEN_ENV).await?;
        }
        self.ensure_auth_token()
    }

    /// Fail unless a non-empty auth token is present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the token is empty.
    pub fn ensure_auth_token(&self) -> Result<()> {
        if self.auth_token.trim().is_empty() {
            return Err(AppError::Config(format!(
                "auth token is required; pass --auth-token or set {AUTH_TOKEN_ENV}"
            )));
        }
        Ok(())
    }

    /// HTTP timeout applied to every outbound request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Normalize and check values after every overlay.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an empty or non-HTTP `api_url` or a
    /// zero timeout.
    pub fn validate(&mut self) -> Result<()> {
        let trimmed = self.api_url.trim().trim_end_matches('/').to_owned();
        if trimmed.is_empty() {
            return Err(AppError::Config("api_url must not be empty".into()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_url must start with http:// or https://, got '{trimmed}'"
            )));
        }
        self.api_url = trimmed;

        if self.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "request_timeout_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Parse the boolean spellings accepted in environment variables.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.trim().is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(keyring::Error::NoEntry) => {}
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            AppError::Config(format!(
                "credential {keyring_key} not found in keychain or {env_key} env var"
            ))
        })
}
