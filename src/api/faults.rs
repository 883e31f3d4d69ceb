//! Faults, notices, affected users, and fault counts.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::transport::{HttpTransport, Query};
use super::types::{loose_integer, string_or_number, Extra, ListResponse};

/// Largest page size the Service accepts for fault and notice listings.
pub const MAX_LIMIT: i64 = 25;

/// A grouped error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Numeric fault id.
    pub id: i64,
    /// Error class name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub klass: Option<String>,
    /// Most recent error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the fault is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,
    /// Whether the fault is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    /// Lifetime occurrence count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notices_count: Option<i64>,
    /// Only present when the listing was time-bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notices_count_in_range: Option<i64>,
    /// Environment the fault was reported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Tags attached to the fault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// First occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Latest occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notice_at: Option<String>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// One occurrence of a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Notice id; numeric ids are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Parent fault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_id: Option<i64>,
    /// Error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Occurrence timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Stack frames, innermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backtrace: Vec<BacktraceLine>,
    /// Captured runtime environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<NoticeEnvironment>,
    /// Request context, as sent by the notifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    /// Request cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Value>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A single backtrace frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktraceLine {
    /// Line number; the Service sends it as either a number or a string.
    #[serde(
        default,
        deserialize_with = "loose_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<i64>,
    /// Source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Method or function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Runtime environment captured with a notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeEnvironment {
    /// Always an object; a bare path string is normalized to `{"path": …}`.
    #[serde(
        default,
        deserialize_with = "project_root",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_root: Option<Value>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

fn project_root<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(path)) => {
            let mut object = Map::new();
            object.insert("path".into(), Value::String(path));
            Some(Value::Object(object))
        }
        Some(Value::Null) | None => None,
        other => other,
    })
}

/// A user affected by a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedUser {
    /// User identifier as reported by the notifier.
    pub user: String,
    /// Occurrences for this user.
    pub count: i64,
}

/// Fault totals broken down by environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultCounts {
    /// Total across all environments.
    #[serde(default)]
    pub total: i64,
    /// Per-environment breakdown.
    #[serde(default)]
    pub environments: Vec<EnvironmentCount>,
}

/// Per-environment fault totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentCount {
    /// Environment name, absent for unlabelled faults.
    #[serde(default)]
    pub environment: Option<String>,
    /// Resolved bucket.
    #[serde(default)]
    pub resolved: bool,
    /// Ignored bucket.
    #[serde(default)]
    pub ignored: bool,
    /// Faults in this bucket.
    #[serde(default)]
    pub count: i64,
}

/// Sort order for fault listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOrder {
    /// Latest occurrence first.
    Recent,
    /// Most occurrences first.
    Frequent,
}

impl FaultOrder {
    /// Every accepted spelling, in schema order.
    pub const ALL: [&'static str; 2] = ["recent", "frequent"];

    /// Wire spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Frequent => "frequent",
        }
    }
}

impl FromStr for FaultOrder {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "recent" => Ok(Self::Recent),
            "frequent" => Ok(Self::Frequent),
            other => Err(format!("unknown order '{other}'")),
        }
    }
}

/// Filters for fault listings and fault counts. Timestamps are Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultListOptions {
    /// Search query.
    pub q: Option<String>,
    /// Faults created after this time.
    pub created_after: Option<i64>,
    /// Faults occurring after this time.
    pub occurred_after: Option<i64>,
    /// Faults occurring before this time.
    pub occurred_before: Option<i64>,
    /// Page size, at most [`MAX_LIMIT`].
    pub limit: Option<i64>,
    /// Sort order.
    pub order: Option<FaultOrder>,
    /// 1-based page number.
    pub page: Option<i64>,
}

impl FaultListOptions {
    fn query(&self) -> Query {
        Query::new()
            .text("q", self.q.as_deref())
            .number("created_after", self.created_after)
            .number("occurred_after", self.occurred_after)
            .number("occurred_before", self.occurred_before)
            .number("limit", self.limit)
            .text("order", self.order.map(FaultOrder::as_str))
            .number("page", self.page)
    }
}

/// Filters for notice listings. Timestamps are Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeListOptions {
    /// Notices created after this time.
    pub created_after: Option<i64>,
    /// Notices created before this time.
    pub created_before: Option<i64>,
    /// Page size, at most [`MAX_LIMIT`].
    pub limit: Option<i64>,
}

impl NoticeListOptions {
    fn query(&self) -> Query {
        Query::new()
            .number("created_after", self.created_after)
            .number("created_before", self.created_before)
            .number("limit", self.limit)
    }
}

/// Fault endpoints.
#[derive(Debug, Clone)]
pub struct FaultsService {
    transport: Arc<HttpTransport>,
}

impl FaultsService {
    pub(crate) fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List faults of a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        options: &FaultListOptions,
    ) -> Result<ListResponse<Fault>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/faults"),
                &options.query(),
            )
            .await
    }

    /// Fetch a single fault.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn get(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        fault_id: i64,
    ) -> Result<Fault, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/faults/{fault_id}"),
                &Query::new(),
            )
            .await
    }

    /// List the notices of a fault.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list_notices(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        fault_id: i64,
        options: &NoticeListOptions,
    ) -> Result<ListResponse<Notice>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/faults/{fault_id}/notices"),
                &options.query(),
            )
            .await
    }

    /// List users affected by a fault.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list_affected_users(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        fault_id: i64,
        q: Option<&str>,
    ) -> Result<Vec<AffectedUser>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/faults/{fault_id}/affected_users"),
                &Query::new().text("q", q),
            )
            .await
    }

    /// Fault totals for a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn counts(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        options: &FaultListOptions,
    ) -> Result<FaultCounts, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/faults/summary"),
                &options.query(),
            )
            .await
    }
}
