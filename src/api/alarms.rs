//! Insights alarms and their trigger history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::transport::{segment, HttpTransport, Query};
use super::types::{string_or_number, Acknowledgement, Extra, Listing, UpdateOutcome};

/// An Insights alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm id; numeric ids are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current evaluation state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `BadgerQL` query evaluated on each period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Streams the query runs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_ids: Option<Value>,
    /// Evaluation window such as `5m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_period: Option<String>,
    /// Opaque trigger definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_config: Option<Value>,
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
pub struct AlarmRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `BadgerQL` query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Evaluation window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_period: Option<String>,
    /// Opaque trigger definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_config: Option<Value>,
    /// Streams the query runs against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_ids: Option<Value>,
}

/// `{"alarm": …}` request wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmBody<'a> {
    /// Wrapped payload.
    pub alarm: &'a AlarmRequest,
}

/// Alarm endpoints.
#[derive(Debug, Clone)]
pub struct AlarmsService {
    transport: Arc<HttpTransport>,
}

impl AlarmsService {
    pub(crate) fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    fn path(project_id: i64) -> String {
        format!("/projects/{project_id}/alarms")
    }

    /// Path of one alarm; the id is encoded as a single segment.
    fn item_path(project_id: i64, alarm_id: &str) -> Result<String, RequestError> {
        Ok(format!("{}/{}", Self::path(project_id), segment(alarm_id)?))
    }

    /// List alarms of a project.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn list(
        &self,
        ct: &CancellationToken,
        project_id: i64,
    ) -> Result<Listing<Alarm>, RequestError> {
        self.transport
            .get(ct, &Self::path(project_id), &Query::new())
            .await
    }

    /// Fetch one alarm.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn get(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        alarm_id: &str,
    ) -> Result<Alarm, RequestError> {
        self.transport
            .get(
                ct,
                &Self::item_path(project_id, alarm_id)?,
                &Query::new(),
            )
            .await
    }

    /// Create an alarm.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn create(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        request: &AlarmRequest,
    ) -> Result<Alarm, RequestError> {
        self.transport
            .post(
                ct,
                &Self::path(project_id),
                &Query::new(),
                &AlarmBody { alarm: request },
            )
            .await
    }

    /// Update an alarm, echoing it back when the Service does.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn update(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        alarm_id: &str,
        request: &AlarmRequest,
    ) -> Result<UpdateOutcome<Alarm>, RequestError> {
        let updated = self
            .transport
            .put(
                ct,
                &Self::item_path(project_id, alarm_id)?,
                &AlarmBody { alarm: request },
            )
            .await?;
        Ok(updated.map_or_else(
            || UpdateOutcome::Acknowledged(Acknowledgement::updated("Alarm", alarm_id)),
            UpdateOutcome::Updated,
        ))
    }

    /// Delete an alarm.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn delete(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        alarm_id: &str,
    ) -> Result<Acknowledgement, RequestError> {
        self.transport
            .delete(ct, &Self::item_path(project_id, alarm_id)?)
            .await?;
        Ok(Acknowledgement::deleted("Alarm", alarm_id))
    }

    /// Trigger history of an alarm.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request fails.
    pub async fn history(
        &self,
        ct: &CancellationToken,
        project_id: i64,
        alarm_id: &str,
        page: Option<i64>,
    ) -> Result<Listing<Value>, RequestError> {
        self.transport
            .get(
                ct,
                &format!("{}/history", Self::item_path(project_id, alarm_id)?),
                &Query::new().number("page", page),
            )
            .await
    }
}
