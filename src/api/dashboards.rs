//! Insights dashboards.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::transport::{segment, HttpTransport, Query};
use super::types::{string_or_number, Acknowledgement, Extra, Listing, UpdateOutcome};

/// An Insights dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Dashboard id; numeric ids are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Opaque widget definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Value>,
    /// Whether this is the project default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// Whether the dashboard is shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not modelled above, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Create/update payload. Unset fields are omitted from the wire body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Widget array, passed through as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Value>,
}

/// `{"dashboard": …}` request wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardBody<'a> {
    /// Wrapped payload.
    pub dashboard: &'a DashboardRequest,
}

/// Dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardsService {
    transport: Arc<HttpTransport>,
}

impl DashboardsService {
    pub(crate) fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    fn path(project_id: i64) -> String {
        format!("/projects/{project_id}/dashboards")
    }

    /// Path of one dashboard; the id is encoded as a single segment.
    fn item_path(project_id: i64, dashboard_id: &str) -> Result<String, RequestError> {
        Ok(format!("{}/{}", Self::path(project_id), segment(dashboard_id)?))
    }

    /// List dashboards of a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list(
        &self,
        ct: &CancellationToken,
        project_id: i64,
    ) -> Result<Listing<Dashboard>, RequestError> {
        self.transport
            .get(ct, &Self::path(project_id), &Query::new())
            .await
    }

    /// Fetch one dashboard.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn get(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        dashboard_id: &str,
    ) -> Result<Dashboard, RequestError> {
        self.transport
            .get(
                ct,
                &Self::item_path(project_id, dashboard_id)?,
                &Query::new(),
            )
            .await
    }

    /// Create a dashboard.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn create(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        request: &DashboardRequest,
    ) -> Result<Dashboard, RequestError> {
        self.transport
            .post(
                ct,
                &Self::path(project_id),
                &Query::new(),
                &DashboardBody { dashboard: request },
            )
            .await
    }

    /// Update a dashboard, echoing it back when the Service does.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn update(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        dashboard_id: &str,
        request: &DashboardRequest,
    ) -> Result<UpdateOutcome<Dashboard>, RequestError> {
        let updated = self
            .transport
            .put(
                ct,
                &Self::item_path(project_id, dashboard_id)?,
                &DashboardBody { dashboard: request },
            )
            .await?;
        Ok(updated.map_or_else(
            || UpdateOutcome::Acknowledged(Acknowledgement::updated("Dashboard", dashboard_id)),
            UpdateOutcome::Updated,
        ))
    }

    /// Delete a dashboard.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn delete(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        dashboard_id: &str,
    ) -> Result<Acknowledgement, RequestError> {
        self.transport
            .delete(ct, &Self::item_path(project_id, dashboard_id)?)
            .await?;
        Ok(Acknowledgement::deleted("Dashboard", dashboard_id))
    }
}
