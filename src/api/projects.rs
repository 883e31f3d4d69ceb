//! Projects, occurrence counts, integrations, and reports.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::transport::{HttpTransport, Query};
use super::types::{Acknowledgement, Extra, ListResponse};

/// A Honeybadger project.
///
/// The project API key (`token`) is accepted on input but never
/// serialized, so it cannot leak through any tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project id.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the project accepts notices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Latest notice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notice_at: Option<String>,
    /// Total faults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_count: Option<i64>,
    /// Unresolved faults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_fault_count: Option<i64>,
    /// Project API key. Never serialized.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Configured environments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Value>,
    /// Owning account or user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,
    /// Uptime sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Value>,
    /// Teams with access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Value>,
    /// Users with access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Value>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Lightweight projection used by `list_projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Numeric project id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the project accepts notices.
    pub active: Option<bool>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Latest notice.
    pub last_notice_at: Option<String>,
    /// Total faults.
    pub fault_count: Option<i64>,
    /// Unresolved faults.
    pub unresolved_fault_count: Option<i64>,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            active: project.active,
            created_at: project.created_at,
            last_notice_at: project.last_notice_at,
            fault_count: project.fault_count,
            unresolved_fault_count: project.unresolved_fault_count,
        }
    }
}

/// Create/update payload. Unset fields are omitted from the wire body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resolve faults automatically on deploy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_errors_on_deploy: Option<bool>,
    /// Disable public notice links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_public_links: Option<bool>,
    /// URL template for user links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_url: Option<String>,
    /// URL template for source links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Notice retention in days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_days: Option<i64>,
    /// Field used for user search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_search_field: Option<String>,
}

/// `{"project": …}` request wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBody<'a> {
    /// Wrapped payload.
    pub project: &'a ProjectRequest,
}

/// Bucket size for occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Hourly buckets.
    Hour,
    /// Daily buckets.
    Day,
    /// Weekly buckets.
    Week,
    /// Monthly buckets.
    Month,
}

impl Period {
    /// Every accepted spelling, in schema order.
    pub const ALL: [&'static str; 4] = ["hour", "day", "week", "month"];

    /// Wire spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("unknown period '{other}'")),
        }
    }
}

/// Project report kinds served under `/reports/{type}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    /// Notice counts grouped by error class.
    NoticesByClass,
    /// Notice counts grouped by location.
    NoticesByLocation,
    /// Notice counts grouped by user.
    NoticesByUser,
    /// Notice counts per day.
    NoticesPerDay,
}

impl ReportType {
    /// Every accepted spelling, in schema order.
    pub const ALL: [&'static str; 4] = [
        "notices_by_class",
        "notices_by_location",
        "notices_by_user",
        "notices_per_day",
    ];

    /// Wire spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoticesByClass => "notices_by_class",
            Self::NoticesByLocation => "notices_by_location",
            Self::NoticesByUser => "notices_by_user",
            Self::NoticesPerDay => "notices_per_day",
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "notices_by_class" => Ok(Self::NoticesByClass),
            "notices_by_location" => Ok(Self::NoticesByLocation),
            "notices_by_user" => Ok(Self::NoticesByUser),
            "notices_per_day" => Ok(Self::NoticesPerDay),
            other => Err(format!("unknown report type '{other}'")),
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for occurrence-count requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceOptions {
    /// Bucket size.
    pub period: Option<Period>,
    /// Restrict to one environment.
    pub environment: Option<String>,
}

impl OccurrenceOptions {
    fn query(&self) -> Query {
        Query::new()
            .text("period", self.period.map(Period::as_str))
            .text("environment", self.environment.as_deref())
    }
}

/// Filters for project reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// RFC 3339 lower bound.
    pub start: Option<String>,
    /// RFC 3339 upper bound.
    pub stop: Option<String>,
    /// Restrict to one environment.
    pub environment: Option<String>,
}

impl ReportOptions {
    fn query(&self) -> Query {
        Query::new()
            .text("start", self.start.as_deref())
            .text("stop", self.stop.as_deref())
            .text("environment", self.environment.as_deref())
    }
}

/// `[epoch_seconds, count]` pair.
pub type OccurrencePoint = (i64, i64);

/// Occurrence series keyed by project id.
pub type OccurrencesByProject = BTreeMap<String, Vec<OccurrencePoint>>;

/// Heterogeneous `[label, number]` report row.
pub type ReportRow = Vec<Value>;

/// Project endpoints.
#[derive(Debug, Clone)]
pub struct ProjectsService {
    transport: Arc<HttpTransport>,
}

impl ProjectsService {
    pub(crate) fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List every project visible to the token.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list_all(
        &self,
        ct: &CancellationToken,
    ) -> Result<ListResponse<Project>, RequestError> {
        self.transport.get(ct, "/projects", &Query::new()).await
    }

    /// List the projects of one account.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list_by_account(
        &self,
        ct: &CancellationToken,
        account_id: &str,
    ) -> Result<ListResponse<Project>, RequestError> {
        let query = Query::new().text("account_id", Some(account_id));
        self.transport.get(ct, "/projects", &query).await
    }

    /// Fetch a single project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn get(&self, ct: &CancellationToken, id: i64) -> Result<Project, RequestError> {
        self.transport
            .get(ct, &format!("/projects/{id}"), &Query::new())
            .await
    }

    /// Create a project under an account.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn create(
        &self,
        ct: &CancellationToken,
        account_id: &str,
        request: &ProjectRequest,
    ) -> Result<Project, RequestError> {
        let query = Query::new().text("account_id", Some(account_id));
        self.transport
            .post(ct, "/projects", &query, &ProjectBody { project: request })
            .await
    }

    /// Update a project. The Service answers with an empty body.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn update(
        &self,
        ct: &CancellationToken,
        id: i64,
        request: &ProjectRequest,
    ) -> Result<Acknowledgement, RequestError> {
        self.transport
            .put_discarding(
                ct,
                &format!("/projects/{id}"),
                &ProjectBody { project: request },
            )
            .await?;
        Ok(Acknowledgement::updated("Project", id))
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn delete(
        &self,
        ct: &CancellationToken,
        id: i64,
    ) -> Result<Acknowledgement, RequestError> {
        self.transport
            .delete(ct, &format!("/projects/{id}"))
            .await?;
        Ok(Acknowledgement::deleted("Project", id))
    }

    /// Occurrence series for one project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn occurrence_counts(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        options: &OccurrenceOptions,
    ) -> Result<Vec<OccurrencePoint>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/occurrences"),
                &options.query(),
            )
            .await
    }

    /// Occurrence series for every project, keyed by project id.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn all_occurrence_counts(
        &self,
        ct: &CancellationToken,
        options: &OccurrenceOptions,
    ) -> Result<OccurrencesByProject, RequestError> {
        self.transport
            .get(ct, "/projects/occurrences", &options.query())
            .await
    }

    /// Integrations (notification channels) configured on a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn integrations(
        &self,
        ct: &CancellationToken,
        project_id: i64,
    ) -> Result<Vec<Value>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/integrations"),
                &Query::new(),
            )
            .await
    }

    /// Aggregated report rows.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn report(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        report: ReportType,
        options: &ReportOptions,
    ) -> Result<Vec<ReportRow>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("/projects/{project_id}/reports/{report}"),
                &options.query(),
            )
            .await
    }
}
