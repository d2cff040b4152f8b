//! Dashboard Statistics
//!
//! Aggregates computed from current store contents on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Asset, EventStatus, Incident, IncidentStatus, SecurityEvent, Severity};
use crate::error::Result;
use crate::repository::{AssetRepository, EventFilter, EventRepository, IncidentRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_events: usize,
    pub critical_events: usize,
    pub active_incidents: usize,
    pub resolved_today: usize,
    pub assets_monitored: usize,
    pub compromised_assets: usize,
    /// e.g. `"12 mins"`, or `"N/A"` when nothing is resolved
    pub average_response_time: String,
    pub threat_level: ThreatLevel,
}

impl DashboardStats {
    pub fn compute(
        events: &[SecurityEvent],
        incidents: &[Incident],
        assets: &[Asset],
        now: DateTime<Utc>,
    ) -> Self {
        let resolved: Vec<&Incident> = incidents
            .iter()
            .filter(|i| i.status == IncidentStatus::Resolved)
            .collect();

        let compromised_assets = assets.iter().filter(|a| a.is_compromised()).count();

        Self {
            total_events: events.len(),
            critical_events: events.iter().filter(|e| e.severity == Severity::Critical).count(),
            active_incidents: incidents.iter().filter(|i| i.is_active()).count(),
            resolved_today: resolved
                .iter()
                .filter(|i| i.updated_at.date_naive() == now.date_naive())
                .count(),
            assets_monitored: assets.len(),
            compromised_assets,
            average_response_time: average_response_time(&resolved),
            threat_level: threat_level(events, compromised_assets),
        }
    }
}

fn average_response_time(resolved: &[&Incident]) -> String {
    if resolved.is_empty() {
        return "N/A".to_string();
    }
    let total_minutes: i64 = resolved
        .iter()
        .map(|i| (i.updated_at - i.created_at).num_minutes().max(0))
        .sum();
    format!("{} mins", total_minutes / resolved.len() as i64)
}

fn threat_level(events: &[SecurityEvent], compromised_assets: usize) -> ThreatLevel {
    let open_with = |severity: Severity| {
        events
            .iter()
            .any(|e| e.severity == severity && e.status != EventStatus::Resolved)
    };

    if open_with(Severity::Critical) && compromised_assets > 0 {
        ThreatLevel::Critical
    } else if open_with(Severity::Critical) {
        ThreatLevel::High
    } else if open_with(Severity::High) {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

#[derive(Clone)]
pub struct DashboardService {
    events: EventRepository,
    incidents: IncidentRepository,
    assets: AssetRepository,
}

impl DashboardService {
    pub fn new(events: EventRepository, incidents: IncidentRepository, assets: AssetRepository) -> Self {
        Self { events, incidents, assets }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let events = self.events.find_all(&EventFilter::default()).await?;
        let incidents = self.incidents.find_all(None).await?;
        let assets = self.assets.find_all(None).await?;
        Ok(DashboardStats::compute(&events, &incidents, &assets, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetStatus;
    use chrono::Duration;

    fn event(severity: Severity, status: EventStatus) -> SecurityEvent {
        SecurityEvent::new("EVT-001", "t", "s", "d", severity).with_status(status)
    }

    fn asset(status: AssetStatus) -> Asset {
        Asset {
            id: "AST-001".to_string(),
            name: "HOST".to_string(),
            asset_type: "Server".to_string(),
            os: "Linux".to_string(),
            ip: "10.0.0.1".to_string(),
            status,
            last_seen: Utc::now(),
            owner: "IT".to_string(),
            department: "IT".to_string(),
            risk_score: 50,
        }
    }

    #[test]
    fn test_threat_level_ladder() {
        let critical_open = [event(Severity::Critical, EventStatus::Investigating)];
        let high_open = [event(Severity::High, EventStatus::Monitoring)];
        let critical_resolved = [event(Severity::Critical, EventStatus::Resolved)];

        assert_eq!(threat_level(&critical_open, 1), ThreatLevel::Critical);
        assert_eq!(threat_level(&critical_open, 0), ThreatLevel::High);
        assert_eq!(threat_level(&high_open, 3), ThreatLevel::Medium);
        assert_eq!(threat_level(&critical_resolved, 3), ThreatLevel::Low);
        assert_eq!(threat_level(&[], 0), ThreatLevel::Low);
    }

    #[test]
    fn test_average_response_time() {
        let now = Utc::now();
        let mut a = Incident::new("INC-2026-001", "a", Severity::High, "x", "d", 1);
        a.created_at = now - Duration::minutes(10);
        a.updated_at = now;
        let mut b = a.clone();
        b.created_at = now - Duration::minutes(20);

        assert_eq!(average_response_time(&[&a, &b]), "15 mins");
        assert_eq!(average_response_time(&[]), "N/A");
    }

    #[test]
    fn test_compute_counts() {
        let now = Utc::now();
        let events = vec![
            event(Severity::Critical, EventStatus::Investigating),
            event(Severity::Critical, EventStatus::Resolved),
            event(Severity::Low, EventStatus::Monitoring),
        ];

        let active = Incident::new("INC-2026-001", "a", Severity::High, "x", "d", 1);
        let mut resolved = Incident::new("INC-2026-002", "b", Severity::Low, "x", "d", 1)
            .with_status(IncidentStatus::Resolved);
        resolved.created_at = now - Duration::minutes(30);
        resolved.updated_at = now;
        let mut resolved_earlier = resolved.clone();
        resolved_earlier.updated_at = now - Duration::days(2);
        resolved_earlier.created_at = now - Duration::days(2) - Duration::minutes(30);

        let assets = vec![asset(AssetStatus::Compromised), asset(AssetStatus::Healthy)];

        let stats = DashboardStats::compute(&events, &[active, resolved, resolved_earlier], &assets, now);
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.critical_events, 2);
        assert_eq!(stats.active_incidents, 1);
        assert_eq!(stats.resolved_today, 1);
        assert_eq!(stats.assets_monitored, 2);
        assert_eq!(stats.compromised_assets, 1);
        assert_eq!(stats.average_response_time, "30 mins");
        assert_eq!(stats.threat_level, ThreatLevel::Critical);
    }

    #[test]
    fn test_wire_names() {
        let stats = DashboardStats::compute(&[], &[], &[], Utc::now());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalEvents"], 0);
        assert_eq!(json["averageResponseTime"], "N/A");
        assert_eq!(json["threatLevel"], "low");
    }
}
