//! Security Event Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Severity;

/// Triage status of a security event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Investigating,
    Monitoring,
    Resolved,
}

string_enum!(EventStatus {
    Investigating => "investigating",
    Monitoring => "monitoring",
    Resolved => "resolved",
});

/// A detection raised by a sensor or created by an analyst.
///
/// Serialized form is the external representation used by both the REST
/// API and real-time notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// `EVT-NNN`
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub description: String,
    pub status: EventStatus,
    #[serde(default)]
    pub affected_assets: Vec<String>,
    #[serde(default)]
    pub iocs: Vec<String>,
    #[serde(default)]
    pub mitre: Vec<String>,
}

impl SecurityEvent {
    /// New events always start under investigation.
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        source: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            severity,
            event_type: event_type.into(),
            source: source.into(),
            description: description.into(),
            status: EventStatus::Investigating,
            affected_assets: Vec::new(),
            iocs: Vec::new(),
            mitre: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_affected_assets(mut self, assets: Vec<String>) -> Self {
        self.affected_assets = assets;
        self
    }

    pub fn with_iocs(mut self, iocs: Vec<String>) -> Self {
        self.iocs = iocs;
        self
    }

    pub fn with_mitre(mut self, mitre: Vec<String>) -> Self {
        self.mitre = mitre;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.status == EventStatus::Resolved
    }

    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        [&self.event_type, &self.source, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
