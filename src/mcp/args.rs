//! Typed accessors over loosely typed MCP tool arguments.
//!
//! Agents send numbers as JSON numbers or numeric strings, booleans as JSON
//! booleans or `"true"`/`"false"`, and JSON-valued parameters as encoded
//! strings. Accessors coerce these into typed values; `null` and empty
//! strings count as absent.

use std::str::FromStr;

use chrono::DateTime;
use rmcp::model::JsonObject;
use serde_json::Value;
use tracing::warn;

use super::tools::ToolError;

/// Arguments of one `tools/call` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(JsonObject);

impl From<JsonObject> for Arguments {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

impl From<Option<JsonObject>> for Arguments {
    fn from(map: Option<JsonObject>) -> Self {
        Self(map.unwrap_or_default())
    }
}

impl Arguments {
    fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    // ── Defaulting accessors ─────────────────────────────

    /// Integer argument, or `default` when absent or not numeric.
    #[must_use]
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.optional_int(name).unwrap_or(default)
    }

    /// String argument, or `default` when absent.
    #[must_use]
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.optional_string(name)
            .unwrap_or_else(|| default.to_owned())
    }

    /// Boolean argument, or `default` when absent or not boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.optional_bool(name).unwrap_or(default)
    }

    // ── Optional accessors ───────────────────────────────

    /// Integer argument if present and numeric.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)] // integral floats only
    pub fn optional_int(&self, name: &str) -> Option<i64> {
        match self.raw(name)? {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && value.is_finite())
                    .map(|value| value as i64)
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-empty string argument. Numbers and booleans are rendered as text.
    #[must_use]
    pub fn optional_string(&self, name: &str) -> Option<String> {
        match self.raw(name)? {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Boolean argument if present and boolean-like.
    #[must_use]
    pub fn optional_bool(&self, name: &str) -> Option<bool> {
        match self.raw(name)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    // ── Required accessors ───────────────────────────────

    /// Required integer; zero counts as missing.
    ///
    /// # Errors
    ///
    /// Returns `<name> is required` when absent or zero.
    pub fn require_int(&self, name: &str) -> Result<i64, ToolError> {
        match self.get_int(name, 0) {
            0 => Err(ToolError::required(name)),
            value => Ok(value),
        }
    }

    /// Required non-empty string.
    ///
    /// # Errors
    ///
    /// Returns `<name> is required` when absent or empty.
    pub fn require_string(&self, name: &str) -> Result<String, ToolError> {
        self.optional_string(name)
            .ok_or_else(|| ToolError::required(name))
    }

    // ── Constrained accessors ────────────────────────────

    /// Optional integer constrained to `min..=max` (`max` unbounded when `None`).
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the bounds when out of range.
    pub fn int_in_range(
        &self,
        name: &str,
        min: i64,
        max: Option<i64>,
    ) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.optional_int(name) else {
            return Ok(None);
        };
        match max {
            Some(max) if !(min..=max).contains(&value) => Err(ToolError::validation(format!(
                "{name} must be between {min} and {max}"
            ))),
            None if value < min => Err(ToolError::validation(format!(
                "{name} must be at least {min}"
            ))),
            _ => Ok(Some(value)),
        }
    }

    /// Optional enumerated string parsed into `T`.
    ///
    /// # Errors
    ///
    /// Returns `<name> must be one of: …` for values outside `allowed`.
    pub fn one_of<T>(&self, name: &str, allowed: &[&str]) -> Result<Option<T>, ToolError>
    where
        T: FromStr,
    {
        let Some(raw) = self.optional_string(name) else {
            return Ok(None);
        };
        if !allowed.contains(&raw.as_str()) {
            return Err(ToolError::validation(format!(
                "{name} must be one of: {}",
                allowed.join(", ")
            )));
        }
        raw.parse().map(Some).map_err(|_| {
            ToolError::validation(format!(
                "{name} must be one of: {}",
                allowed.join(", ")
            ))
        })
    }

    // ── JSON-encoded parameters ──────────────────────────

    /// Optional JSON document passed as an encoded string.
    ///
    /// # Errors
    ///
    /// Returns `Failed to parse <name> JSON: …` when the string is not JSON.
    pub fn json(&self, name: &str) -> Result<Option<Value>, ToolError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(|err| ToolError::validation(format!("Failed to parse {name} JSON: {err}"))),
            // Already structured; clients sometimes skip the string encoding.
            Some(other) => Ok(Some(other.clone())),
        }
    }

    /// Required JSON document passed as an encoded string.
    ///
    /// # Errors
    ///
    /// Returns `<name> is required` when absent or
    /// `Failed to parse <name> JSON: …` when malformed.
    pub fn require_json(&self, name: &str) -> Result<Value, ToolError> {
        self.json(name)?.ok_or_else(|| ToolError::required(name))
    }

    // ── Timestamps ───────────────────────────────────────

    /// Optional RFC 3339 timestamp, passed through as given.
    ///
    /// Malformed values are dropped with a warning.
    #[must_use]
    pub fn rfc3339(&self, name: &str) -> Option<String> {
        let raw = self.optional_string(name)?;
        if DateTime::parse_from_rfc3339(&raw).is_ok() {
            Some(raw)
        } else {
            warn!(param = name, value = %raw, "ignoring malformed timestamp");
            None
        }
    }

    /// Optional timestamp as Unix seconds.
    ///
    /// Accepts an integer, a decimal string, or an RFC 3339 string.
    /// Malformed values are dropped with a warning.
    #[must_use]
    pub fn unix_seconds(&self, name: &str) -> Option<i64> {
        if let Some(Value::Number(_)) = self.raw(name) {
            return self.optional_int(name);
        }
        let raw = self.optional_string(name)?;
        let trimmed = raw.trim();
        if let Ok(seconds) = trimmed.parse::<i64>() {
            return Some(seconds);
        }
        match DateTime::parse_from_rfc3339(trimmed) {
            Ok(parsed) => Some(parsed.timestamp()),
            Err(_) => {
                warn!(param = name, value = %raw, "ignoring malformed timestamp");
                None
            }
        }
    }
}
