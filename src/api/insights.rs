//! Insights (`BadgerQL`) queries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::transport::{HttpTransport, Query};
use super::types::Extra;

/// Body of `POST /projects/{id}/insights/queries`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsQueryRequest {
    /// `BadgerQL` source.
    pub query: String,
    /// Time range shorthand (`PT3H`, `today`) or an ISO 8601 interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    /// IANA timezone used for relative ranges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Result of an Insights query.
///
/// A query error arrives with status 200 and a populated `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsQueryResponse {
    /// Result rows.
    #[serde(default)]
    pub results: Vec<Value>,
    /// Query metadata, when the query ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<InsightsMeta>,
    /// Query error, when it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InsightsError>,
}

/// Metadata describing an Insights result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsMeta {
    /// Normalized query text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Column names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Column types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Rows returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
    /// Rows matched before truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<i64>,
    /// Start of the queried range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    /// End of the queried range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Query error reported inside a 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsError {
    /// Error text.
    #[serde(default)]
    pub message: String,
}

/// Insights endpoints.
#[derive(Debug, Clone)]
pub struct InsightsService {
    transport: Arc<HttpTransport>,
}

impl InsightsService {
    pub(crate) fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Run a `BadgerQL` query.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails. A query that the
    /// Service rejects with status 200 is returned as `Ok` with `error` set.
    pub async fn query(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        request: &InsightsQueryRequest,
    ) -> Result<InsightsQueryResponse, RequestError> {
        self.transport
            .post(
                ct,
                &format!("/projects/{project_id}/insights/queries"),
                &Query::new(),
                request,
            )
            .await
    }
}
