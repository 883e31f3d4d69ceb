//! Authenticated JSON transport for the Honeybadger REST API.
//!
//! Every request is rooted at `{base_url}/v2`, carries HTTP Basic auth with
//! the personal auth token as username and an empty password, and races the
//! caller's [`CancellationToken`] so a client disconnect aborts in-flight
//! requests.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::RequestError;
use crate::{AppError, Result};

const API_PREFIX: &str = "/v2";
const JSON_MEDIA_TYPE: &str = "application/json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Query-string builder that only keeps non-empty, non-zero values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(&'static str, String)>);

impl Query {
    /// Start an empty query string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text parameter unless it is absent or empty.
    #[must_use]
    pub fn text(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.0.push((key, value.to_owned()));
        }
        self
    }

    /// Append a numeric parameter unless it is absent or zero.
    #[must_use]
    pub fn number(mut self, key: &'static str, value: Option<i64>) -> Self {
        if let Some(value) = value.filter(|value| *value != 0) {
            self.0.push((key, value.to_string()));
        }
        self
    }

    /// Whether no parameter survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the retained `(key, value)` pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// Percent-encode a caller-supplied id so it stays one path segment.
///
/// # Errors
///
/// Returns a `Marshal` error for an empty id or a dot segment, which would
/// otherwise be resolved against the parent path.
pub fn segment(id: &str) -> std::result::Result<Cow<'_, str>, RequestError> {
    if matches!(id, "" | "." | "..") {
        return Err(RequestError::marshal(format!(
            "invalid path segment '{id}'"
        )));
    }
    Ok(urlencoding::encode(id))
}

/// Low-level HTTP client shared by every resource service.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl HttpTransport {
    /// Build the transport with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the underlying HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(base_url: &str, auth_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| AppError::Api(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_token: auth_token.to_owned(),
        })
    }

    /// Absolute URL for an API path such as `/projects/1`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// `GET` a path and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for transport failures, cancellation,
    /// non-success statuses, or an undecodable body.
    pub async fn get<T>(
        &self,
        ct: &CancellationToken,
        path: &str,
        query: &Query,
    ) -> std::result::Result<T, RequestError>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute(ct, Method::GET, path, query, None).await?;
        decode(&raw)
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for marshal failures, transport failures,
    /// cancellation, non-success statuses, or an undecodable body.
    pub async fn post<B, T>(
        &self,
        ct: &CancellationToken,
        path: &str,
        query: &Query,
        body: &B,
    ) -> std::result::Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let raw = self
            .execute(ct, Method::POST, path, query, Some(payload))
            .await?;
        decode(&raw)
    }

    /// `PUT` a JSON body; decode the response only when the Service sent one.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for marshal failures, transport failures,
    /// cancellation, non-success statuses, or a non-empty undecodable body.
    pub async fn put<B, T>(
        &self,
        ct: &CancellationToken,
        path: &str,
        body: &B,
    ) -> std::result::Result<Option<T>, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let raw = self
            .execute(ct, Method::PUT, path, &Query::new(), Some(payload))
            .await?;
        decode_optional(&raw)
    }

    /// `PUT` a JSON body and discard whatever the Service answers.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for marshal failures, transport failures,
    /// cancellation, or non-success statuses.
    pub async fn put_discarding<B>(
        &self,
        ct: &CancellationToken,
        path: &str,
        body: &B,
    ) -> std::result::Result<(), RequestError>
    where
        B: Serialize + ?Sized,
    {
        let payload = encode(body)?;
        self.execute(ct, Method::PUT, path, &Query::new(), Some(payload))
            .await
            .map(drop)
    }

    /// `DELETE` a path, discarding any response body.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for transport failures, cancellation, or
    /// non-success statuses.
    pub async fn delete(
        &self,
        ct: &CancellationToken,
        path: &str,
    ) -> std::result::Result<(), RequestError> {
        self.execute(ct, Method::DELETE, path, &Query::new(), None)
            .await
            .map(drop)
    }

    /// Send one request and return the raw body of a successful response.
    async fn execute(
        &self,
        ct: &CancellationToken,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<String, RequestError> {
        if ct.is_cancelled() {
            return Err(RequestError::cancelled());
        }

        let mut builder = self
            .client
            .request(method.clone(), self.endpoint(path))
            .basic_auth(&self.auth_token, None::<&str>)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE);
        if !query.is_empty() {
            builder = builder.query(query.pairs());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(%method, path, "sending service request");

        let exchange = async {
            let response = builder.send().await.map_err(RequestError::transport)?;
            let status = response.status();
            let text = response.text().await.map_err(RequestError::transport)?;
            Ok::<(StatusCode, String), RequestError>((status, text))
        };

        let (status, text) = tokio::select! {
            biased;
            () = ct.cancelled() => return Err(RequestError::cancelled()),
            result = exchange => result?,
        };

        if !is_success(status) {
            warn!(
                %method,
                path,
                status = status.as_u16(),
                "service returned an error status"
            );
            return Err(RequestError::api(status, &text));
        }

        Ok(text)
    }
}

fn is_success(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

fn encode<B>(body: &B) -> std::result::Result<Vec<u8>, RequestError>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body).map_err(RequestError::marshal)
}

fn decode<T>(raw: &str) -> std::result::Result<T, RequestError>
where
    T: DeserializeOwned,
{
    if raw.trim().is_empty() {
        return Err(RequestError::decode("empty response body"));
    }
    serde_json::from_str(raw).map_err(RequestError::decode)
}

fn decode_optional<T>(raw: &str) -> std::result::Result<Option<T>, RequestError>
where
    T: DeserializeOwned,
{
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(RequestError::decode)
}
