//! Typed failures reported by the HTTP transport.

use std::fmt::{Display, Formatter};

use reqwest::StatusCode;
use serde_json::Value;

/// Classification of a failed Service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// Connection, DNS, TLS, timeout, or body read failure.
    Transport,
    /// The caller's cancellation token fired before or during the round-trip.
    Cancelled,
    /// The Service answered with a status outside `[200, 400)`.
    Api,
    /// A successful response body did not match the expected shape.
    Decode,
    /// The request body or a path segment could not be encoded.
    Marshal,
}

/// Failure of a single request against the Service.
#[derive(Debug, Clone)]
pub struct RequestError {
    /// What went wrong.
    pub kind: RequestErrorKind,
    /// HTTP status for `Api` errors.
    pub status: Option<StatusCode>,
    /// Human-readable cause; for `Api` errors the Service's own message.
    pub message: String,
    /// Raw response body for `Api` errors: parsed JSON when possible, else a string.
    pub body: Option<Value>,
}

impl RequestError {
    /// Build a transport-level failure.
    #[must_use]
    pub fn transport(cause: impl Display) -> Self {
        Self::simple(RequestErrorKind::Transport, cause.to_string())
    }

    /// Build a cancellation failure.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::simple(RequestErrorKind::Cancelled, "request cancelled".into())
    }

    /// Build a decode failure.
    #[must_use]
    pub fn decode(cause: impl Display) -> Self {
        Self::simple(RequestErrorKind::Decode, cause.to_string())
    }

    /// Build a request-body serialization failure.
    #[must_use]
    pub fn marshal(cause: impl Display) -> Self {
        Self::simple(RequestErrorKind::Marshal, cause.to_string())
    }

    /// Build an API failure from a non-success status and the raw body text.
    ///
    /// The message is the first string among the body's `message`, `error`,
    /// and `errors` fields, falling back to the status reason phrase.
    #[must_use]
    pub fn api(status: StatusCode, raw_body: &str) -> Self {
        let body = if raw_body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(raw_body)
                    .unwrap_or_else(|_| Value::String(raw_body.to_owned())),
            )
        };

        let message = body
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| status.as_str().to_owned(), str::to_owned)
            });

        Self {
            kind: RequestErrorKind::Api,
            status: Some(status),
            message,
            body,
        }
    }

    /// Whether this failure was caused by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == RequestErrorKind::Cancelled
    }

    /// HTTP status code as an integer, if the Service answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status.map(|status| status.as_u16())
    }

    fn simple(kind: RequestErrorKind, message: String) -> Self {
        Self {
            kind,
            status: None,
            message,
            body: None,
        }
    }
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RequestErrorKind::Api | RequestErrorKind::Transport | RequestErrorKind::Cancelled => {
                f.write_str(&self.message)
            }
            RequestErrorKind::Decode => f.write_str("failed to decode response"),
            RequestErrorKind::Marshal => write!(f, "failed to marshal request: {}", self.message),
        }
    }
}

impl std::error::Error for RequestError {}

fn extract_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    ["message", "error", "errors"]
        .iter()
        .find_map(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
        })
        .map(str::to_owned)
}
