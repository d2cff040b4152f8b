//! Incident Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    InProgress,
    Monitoring,
    Resolved,
}

string_enum!(IncidentStatus {
    InProgress => "in_progress",
    Monitoring => "monitoring",
    Resolved => "resolved",
});

/// One line of an incident's activity history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntry {
    /// Wall-clock time as `HH:MM`
    pub time: String,
    pub action: String,
    pub user: String,
}

impl TimelineEntry {
    pub fn now(action: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            time: Utc::now().format("%H:%M").to_string(),
            action: action.into(),
            user: user.into(),
        }
    }
}

/// A tracked investigation grouping related security events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// `INC-YYYY-NNN`
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignee: String,
    pub description: String,
    pub affected_systems: i64,
    #[serde(default)]
    pub related_events: Vec<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Incident {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        assignee: impl Into<String>,
        description: impl Into<String>,
        affected_systems: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            severity,
            status: IncidentStatus::InProgress,
            created_at: now,
            updated_at: now,
            assignee: assignee.into(),
            description: description.into(),
            affected_systems,
            related_events: Vec::new(),
            timeline: vec![TimelineEntry::now("Incident created", "System")],
        }
    }

    pub fn with_related_events(mut self, events: Vec<String>) -> Self {
        self.related_events = events;
        self
    }

    pub fn with_timeline(mut self, timeline: Vec<TimelineEntry>) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    /// Changes status and records who did it.
    pub fn set_status(&mut self, status: IncidentStatus, actor: &str) {
        self.status = status;
        self.timeline
            .push(TimelineEntry::now(format!("Status changed to {}", status), actor));
        self.touch();
    }

    pub fn assign(&mut self, assignee: impl Into<String>, actor: &str) {
        let assignee = assignee.into();
        self.timeline
            .push(TimelineEntry::now(format!("Assigned to {}", assignee), actor));
        self.assignee = assignee;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident() -> Incident {
        Incident::new("INC-2026-001", "Ransomware", Severity::Critical, "John Smith", "desc", 5)
    }

    #[test]
    fn test_new_incident_has_creation_entry() {
        let incident = incident();
        assert_eq!(incident.status, IncidentStatus::InProgress);
        assert!(incident.is_active());
        assert_eq!(incident.timeline.len(), 1);
        assert_eq!(incident.timeline[0].action, "Incident created");
        assert_eq!(incident.timeline[0].user, "System");
    }

    #[test]
    fn test_status_change_is_recorded() {
        let mut incident = incident();
        incident.set_status(IncidentStatus::Resolved, "analyst");

        assert_eq!(incident.status, IncidentStatus::Resolved);
        let last = incident.timeline.last().unwrap();
        assert_eq!(last.action, "Status changed to resolved");
        assert_eq!(last.user, "analyst");
    }

    #[test]
    fn test_assignment_is_recorded() {
        let mut incident = incident();
        incident.assign("Jane Doe", "admin");

        assert_eq!(incident.assignee, "Jane Doe");
        assert_eq!(incident.timeline.last().unwrap().action, "Assigned to Jane Doe");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&IncidentStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!("in_progress".parse::<IncidentStatus>().unwrap(), IncidentStatus::InProgress);
    }
}
