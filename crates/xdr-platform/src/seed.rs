//! Demo Data Seeder
//!
//! Populates an empty database with demo users, events, incidents, assets
//! and alert rules. Records that already exist are left untouched, so
//! seeding on every start is safe.

use chrono::{Duration, Utc};
use tracing::info;

use crate::domain::{
    AlertRule, Asset, AssetStatus, EventStatus, Incident, IncidentStatus, Role, SecurityEvent,
    Severity, TimelineEntry, User,
};
use crate::error::Result;
use crate::repository::{
    AlertRuleRepository, AssetRepository, EventRepository, IncidentRepository, UserRepository,
};
use crate::service::PasswordService;

pub struct DemoDataSeeder {
    users: UserRepository,
    events: EventRepository,
    incidents: IncidentRepository,
    assets: AssetRepository,
    rules: AlertRuleRepository,
    passwords: PasswordService,
}

impl DemoDataSeeder {
    pub fn new(
        users: UserRepository,
        events: EventRepository,
        incidents: IncidentRepository,
        assets: AssetRepository,
        rules: AlertRuleRepository,
        passwords: PasswordService,
    ) -> Self {
        Self {
            users,
            events,
            incidents,
            assets,
            rules,
            passwords,
        }
    }

    pub async fn seed(&self) -> Result<()> {
        let users = self.seed_users().await?;
        let events = self.seed_events().await?;
        let incidents = self.seed_incidents().await?;
        let assets = self.seed_assets().await?;
        let rules = self.seed_rules().await?;

        info!(users, events, incidents, assets, rules, "Demo data seeded");
        Ok(())
    }

    async fn seed_users(&self) -> Result<usize> {
        let accounts = [
            ("USR-001", "admin", "admin@xdr.local", "System Administrator", Role::Admin, "admin123"),
            ("USR-002", "analyst", "analyst@xdr.local", "Security Analyst", Role::Analyst, "analyst123"),
            ("USR-003", "viewer", "viewer@xdr.local", "Security Viewer", Role::Viewer, "viewer123"),
        ];

        let mut inserted = 0;
        for (id, username, email, full_name, role, password) in accounts {
            if self.users.find_by_username(username).await?.is_some() {
                continue;
            }
            let hash = self.passwords.hash_password(password)?;
            self.users
                .insert(&User::new(id, username, email, full_name, role, hash))
                .await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn seed_events(&self) -> Result<usize> {
        let mut inserted = 0;
        for event in demo_events() {
            if self.events.insert_if_absent(&event).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn seed_incidents(&self) -> Result<usize> {
        let mut inserted = 0;
        for incident in demo_incidents() {
            if self.incidents.insert_if_absent(&incident).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn seed_assets(&self) -> Result<usize> {
        let mut inserted = 0;
        for asset in demo_assets() {
            if self.assets.insert_if_absent(&asset).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn seed_rules(&self) -> Result<usize> {
        let mut inserted = 0;
        for rule in demo_rules() {
            if self.rules.insert_if_absent(&rule).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn demo_events() -> Vec<SecurityEvent> {
    let now = Utc::now();
    let rows = [
        (
            "EVT-001", Severity::Critical, "Malware Detection", "WORKSTATION-101",
            "Ransomware variant detected on workstation. Immediate containment required.",
            EventStatus::Investigating,
            &["WORKSTATION-101", "SERVER-FILE-01"][..],
            &["malware.exe", "192.168.1.100", "evil-domain.com"][..],
            &["T1486", "T1566"][..],
        ),
        (
            "EVT-002", Severity::High, "Suspicious Login", "SERVER-AD-01",
            "Multiple failed login attempts followed by successful authentication from unusual location.",
            EventStatus::Monitoring,
            &["SERVER-AD-01"][..],
            &["185.220.101.45"][..],
            &["T1110", "T1078"][..],
        ),
        (
            "EVT-003", Severity::Medium, "Port Scan", "FIREWALL-01",
            "External port scanning activity detected targeting multiple internal hosts.",
            EventStatus::Resolved,
            &["FIREWALL-01"][..],
            &["45.33.32.156"][..],
            &["T1046"][..],
        ),
        (
            "EVT-004", Severity::Critical, "Data Exfiltration", "SERVER-DB-01",
            "Large data transfer detected to unknown external IP address.",
            EventStatus::Investigating,
            &["SERVER-DB-01"][..],
            &["192.168.1.50", "suspicious-upload.net"][..],
            &["T1041", "T1567"][..],
        ),
        (
            "EVT-005", Severity::High, "Privilege Escalation", "SERVER-WEB-01",
            "Unexpected privilege escalation detected on web server.",
            EventStatus::Investigating,
            &["SERVER-WEB-01"][..],
            &["exploit.sh"][..],
            &["T1068", "T1548"][..],
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (id, severity, event_type, source, description, status, assets, iocs, mitre))| {
            SecurityEvent::new(id, event_type, source, description, severity)
                .with_timestamp(now - Duration::hours(i as i64 * 2))
                .with_status(status)
                .with_affected_assets(strings(assets))
                .with_iocs(strings(iocs))
                .with_mitre(strings(mitre))
        })
        .collect()
}

fn timeline(entries: &[(&str, &str, &str)]) -> Vec<TimelineEntry> {
    entries
        .iter()
        .map(|(time, action, user)| TimelineEntry {
            time: time.to_string(),
            action: action.to_string(),
            user: user.to_string(),
        })
        .collect()
}

fn demo_incidents() -> Vec<Incident> {
    vec![
        Incident::new(
            "INC-2026-001",
            "Ransomware Attack - Critical Systems",
            Severity::Critical,
            "John Smith",
            "Active ransomware incident affecting multiple critical systems.",
            5,
        )
        .with_related_events(strings(&["EVT-001"]))
        .with_timeline(timeline(&[
            ("09:15", "Initial detection", "System"),
            ("09:20", "Incident created", "SOC Analyst"),
            ("09:30", "Containment initiated", "John Smith"),
        ])),
        Incident::new(
            "INC-2026-002",
            "Unauthorized Access Attempt",
            Severity::High,
            "Jane Doe",
            "Suspicious authentication activity detected from foreign IP.",
            2,
        )
        .with_status(IncidentStatus::Monitoring)
        .with_related_events(strings(&["EVT-002"]))
        .with_timeline(timeline(&[
            ("14:00", "Alert triggered", "System"),
            ("14:15", "Investigation started", "Jane Doe"),
        ])),
        Incident::new(
            "INC-2026-003",
            "Data Breach Investigation",
            Severity::Critical,
            "Mike Johnson",
            "Potential data exfiltration from database server.",
            3,
        )
        .with_related_events(strings(&["EVT-004"]))
        .with_timeline(timeline(&[
            ("11:00", "Anomaly detected", "System"),
            ("11:30", "Forensic analysis initiated", "Mike Johnson"),
        ])),
    ]
}

fn demo_assets() -> Vec<Asset> {
    let now = Utc::now();
    let rows = [
        ("AST-001", "WORKSTATION-101", "Workstation", "Windows 11", "192.168.1.101", AssetStatus::Compromised, "John Doe", "Engineering", 95),
        ("AST-002", "SERVER-WEB-01", "Server", "Ubuntu 22.04", "192.168.1.10", AssetStatus::Investigating, "IT Team", "IT", 75),
        ("AST-003", "SERVER-DB-01", "Server", "CentOS 8", "192.168.1.20", AssetStatus::Compromised, "DBA Team", "IT", 90),
        ("AST-004", "SERVER-AD-01", "Server", "Windows Server 2022", "192.168.1.5", AssetStatus::Healthy, "IT Team", "IT", 30),
        ("AST-005", "FIREWALL-01", "Network", "FortiOS", "192.168.1.1", AssetStatus::Healthy, "Network Team", "IT", 15),
        ("AST-006", "LAPTOP-HR-05", "Laptop", "Windows 11", "192.168.1.150", AssetStatus::Healthy, "HR Manager", "HR", 25),
    ];

    rows.into_iter()
        .map(|(id, name, asset_type, os, ip, status, owner, department, risk_score)| Asset {
            id: id.to_string(),
            name: name.to_string(),
            asset_type: asset_type.to_string(),
            os: os.to_string(),
            ip: ip.to_string(),
            status,
            last_seen: now,
            owner: owner.to_string(),
            department: department.to_string(),
            risk_score,
        })
        .collect()
}

fn demo_rules() -> Vec<AlertRule> {
    let rows = [
        ("RULE-001", "Critical Malware Detection", Severity::Critical, true,
         "malware_detected AND severity=critical", &["notify_soc", "isolate_host", "create_incident"][..]),
        ("RULE-002", "Brute Force Attack", Severity::High, true,
         "failed_logins > 5 AND time_window < 5min", &["notify_soc", "block_ip"][..]),
        ("RULE-003", "Data Exfiltration Alert", Severity::Critical, true,
         "data_transfer > 1GB AND destination=external", &["notify_soc", "block_transfer", "create_incident"][..]),
        ("RULE-004", "Suspicious Port Scan", Severity::Medium, true,
         "port_scan_detected AND source=external", &["log_event", "notify_soc"][..]),
        ("RULE-005", "Privilege Escalation", Severity::High, false,
         "privilege_change AND user!=admin", &["notify_soc", "create_alert"][..]),
    ];

    rows.into_iter()
        .map(|(id, name, severity, enabled, conditions, actions)| AlertRule {
            id: id.to_string(),
            name: name.to_string(),
            severity,
            enabled,
            conditions: conditions.to_string(),
            actions: strings(actions),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{test_pool, EventFilter};
    use crate::service::Argon2Config;

    async fn seeder() -> DemoDataSeeder {
        let pool = test_pool().await;
        DemoDataSeeder::new(
            UserRepository::new(pool.clone()),
            EventRepository::new(pool.clone()),
            IncidentRepository::new(pool.clone()),
            AssetRepository::new(pool.clone()),
            AlertRuleRepository::new(pool),
            PasswordService::new(Argon2Config {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_seed_populates_every_table() {
        let seeder = seeder().await;
        seeder.seed().await.unwrap();

        assert_eq!(seeder.users.find_all().await.unwrap().len(), 3);
        assert_eq!(seeder.events.find_all(&EventFilter::default()).await.unwrap().len(), 5);
        assert_eq!(seeder.incidents.find_all(None).await.unwrap().len(), 3);
        assert_eq!(seeder.assets.find_all(None).await.unwrap().len(), 6);

        let rules = seeder.rules.find_all().await.unwrap();
        assert_eq!(rules.len(), 5);
        assert!(!rules.iter().find(|r| r.id == "RULE-005").unwrap().enabled);

        let admin = seeder.users.find_by_username("admin").await.unwrap().unwrap();
        assert!(seeder.passwords.verify_password("admin123", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let seeder = seeder().await;
        seeder.seed().await.unwrap();
        seeder.seed().await.unwrap();

        assert_eq!(seeder.users.find_all().await.unwrap().len(), 3);
        assert_eq!(seeder.events.find_all(&EventFilter::default()).await.unwrap().len(), 5);
    }
}
