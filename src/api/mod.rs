//! Honeybadger REST API client.
//!
//! [`ApiClient`] is created once at startup and shared by every tool
//! handler. It holds no per-request mutable state.

pub mod alarms;
pub mod dashboards;
pub mod error;
pub mod faults;
pub mod insights;
pub mod projects;
pub mod transport;
pub mod types;

use std::sync::Arc;

pub use error::{RequestError, RequestErrorKind};
pub use transport::HttpTransport;

use crate::config::GlobalConfig;
use crate::Result;

/// Process-wide handles to every resource service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Projects, occurrence counts, integrations, reports.
    pub projects: projects::ProjectsService,
    /// Faults, notices, affected users, counts.
    pub faults: faults::FaultsService,
    /// `BadgerQL` queries.
    pub insights: insights::InsightsService,
    /// Insights dashboards.
    pub dashboards: dashboards::DashboardsService,
    /// Insights alarms.
    pub alarms: alarms::AlarmsService,
}

impl ApiClient {
    /// Build the client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the HTTP client cannot be constructed.
    pub fn new(config: &GlobalConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.api_url,
            &config.auth_token,
            config.request_timeout(),
        )?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Build the client around an existing transport.
    #[must_use]
    pub fn with_transport(transport: Arc<HttpTransport>) -> Self {
        Self {
            projects: projects::ProjectsService::new(Arc::clone(&transport)),
            faults: faults::FaultsService::new(Arc::clone(&transport)),
            insights: insights::InsightsService::new(Arc::clone(&transport)),
            dashboards: dashboards::DashboardsService::new(Arc::clone(&transport)),
            alarms: alarms::AlarmsService::new(transport),
        }
    }
}
