//! Synthetic Event Generator
//!
//! Background task that periodically fabricates a security event, stores it
//! and broadcasts it, so connected dashboards have live traffic.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{Broadcaster, Notification};
use crate::domain::{SecurityEvent, Severity};
use crate::error::Result;
use crate::repository::EventRepository;

const EVENT_TYPES: &[&str] = &[
    "Malware Detection",
    "Suspicious Login",
    "Port Scan",
    "Data Exfiltration",
    "Brute Force Attack",
];

const SOURCES: &[&str] = &[
    "WORKSTATION-101",
    "WORKSTATION-102",
    "SERVER-WEB-01",
    "SERVER-DB-01",
    "LAPTOP-HR-05",
];

#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    pub min_interval: Duration,
    pub max_interval: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(30),
        }
    }
}

struct Draft {
    event_type: &'static str,
    source: &'static str,
    severity: Severity,
}

pub struct EventGenerator {
    events: EventRepository,
    broadcaster: Broadcaster,
    config: GeneratorConfig,
}

impl EventGenerator {
    pub fn new(events: EventRepository, broadcaster: Broadcaster, config: GeneratorConfig) -> Self {
        Self {
            events,
            broadcaster,
            config,
        }
    }

    /// Run until the returned handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        info!(
            min_secs = self.config.min_interval.as_secs(),
            max_secs = self.config.max_interval.as_secs(),
            "Event generator started"
        );
        loop {
            tokio::time::sleep(self.next_delay()).await;
            if let Err(e) = self.tick().await {
                error!(error = %e, "Event generator failed to create event");
            }
        }
    }

    fn next_delay(&self) -> Duration {
        let min = self.config.min_interval.as_millis() as u64;
        let max = (self.config.max_interval.as_millis() as u64).max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    fn draft() -> Draft {
        let mut rng = rand::thread_rng();
        Draft {
            event_type: EVENT_TYPES.choose(&mut rng).copied().unwrap_or("Port Scan"),
            source: SOURCES.choose(&mut rng).copied().unwrap_or("SERVER-WEB-01"),
            severity: Severity::ALL.choose(&mut rng).copied().unwrap_or(Severity::Low),
        }
    }

    /// Create and broadcast one event.
    pub async fn tick(&self) -> Result<SecurityEvent> {
        let draft = Self::draft();
        let event = self
            .events
            .create(|id| {
                SecurityEvent::new(
                    id,
                    draft.event_type,
                    draft.source,
                    format!("Real-time {} detected on {}", draft.event_type, draft.source),
                    draft.severity,
                )
                .with_affected_assets(vec![draft.source.to_string()])
            })
            .await?;

        let report = self
            .broadcaster
            .broadcast(&Notification::NewEvent(event.clone()))
            .await;
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            delivered = report.delivered,
            "Generated event"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ConnectionRegistry;
    use crate::repository::{test_pool, EventFilter};

    #[tokio::test]
    async fn test_tick_creates_event_from_catalogue() {
        let events = EventRepository::new(test_pool().await);
        let generator = EventGenerator::new(
            events.clone(),
            Broadcaster::new(ConnectionRegistry::new()),
            GeneratorConfig::default(),
        );

        let event = generator.tick().await.unwrap();

        assert_eq!(event.id, "EVT-001");
        assert!(EVENT_TYPES.contains(&event.event_type.as_str()));
        assert!(SOURCES.contains(&event.source.as_str()));
        assert_eq!(event.affected_assets, vec![event.source.clone()]);
        assert_eq!(
            event.description,
            format!("Real-time {} detected on {}", event.event_type, event.source)
        );
        assert_eq!(events.find_all(&EventFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delay_within_bounds() {
        let generator = EventGenerator {
            events: EventRepository::new(test_pool().await),
            broadcaster: Broadcaster::new(ConnectionRegistry::new()),
            config: GeneratorConfig {
                min_interval: Duration::from_secs(10),
                max_interval: Duration::from_secs(30),
            },
        };
        for _ in 0..100 {
            let delay = generator.next_delay();
            assert!(delay >= Duration::from_secs(10) && delay <= Duration::from_secs(30));
        }
    }
}
