//! Broadcast Fan-out
//!
//! Pushes a notification to every connection in the registry. A failed
//! delivery removes that connection and never stops delivery to the rest.
//! A send that does not complete within the send timeout counts as failed.

use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ConnectionRegistry, DeliveryError, Notification};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one broadcast. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Broadcaster {
    registry: ConnectionRegistry,
    send_timeout: Duration,
}

impl Broadcaster {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub async fn broadcast(&self, notification: &Notification) -> BroadcastReport {
        let connections = self.registry.snapshot();
        let attempted = connections.len();

        let send_timeout = self.send_timeout;
        let results = join_all(connections.iter().map(|connection| async move {
            let result = match timeout(send_timeout, connection.send(notification)).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(send_timeout)),
            };
            (connection.id(), result)
        }))
        .await;

        let mut failed = Vec::new();
        for (id, result) in results {
            if let Err(e) = result {
                warn!(connection_id = %id, kind = notification.kind(), error = %e, "Delivery failed, dropping connection");
                failed.push(id);
            }
        }

        for id in &failed {
            self.registry.unregister(*id);
        }

        let report = BroadcastReport {
            attempted,
            delivered: attempted - failed.len(),
            failed: failed.len(),
        };
        debug!(kind = notification.kind(), ?report, "Broadcast complete");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SecurityEvent, Severity};
    use crate::realtime::{Connection, ConnectionId, DeliveryError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FakeConnection {
        id: ConnectionId,
        fail: bool,
        received: Mutex<Vec<Notification>>,
    }

    /// Never completes a send, like a peer with a full TCP window.
    struct StalledConnection {
        id: ConnectionId,
    }

    #[async_trait]
    impl Connection for StalledConnection {
        fn id(&self) -> ConnectionId {
            self.id
        }

        async fn send(&self, _notification: &Notification) -> Result<(), DeliveryError> {
            std::future::pending().await
        }
    }

    impl FakeConnection {
        fn healthy() -> Arc<Self> {
            Self::build(false)
        }

        fn broken() -> Arc<Self> {
            Self::build(true)
        }

        fn build(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                id: ConnectionId::new(),
                fail,
                received: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.received.lock().len()
        }
    }

    #[async_trait]
    impl Connection for FakeConnection {
        fn id(&self) -> ConnectionId {
            self.id
        }

        async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Transport("broken pipe".to_string()));
            }
            self.received.lock().push(notification.clone());
            Ok(())
        }
    }

    fn event() -> Notification {
        SecurityEvent::new("EVT-100", "Port Scan", "FIREWALL-01", "scan", Severity::Low).into()
    }

    #[tokio::test]
    async fn test_every_connection_receives_one_copy() {
        let registry = ConnectionRegistry::new();
        let conns: Vec<_> = (0..5).map(|_| FakeConnection::healthy()).collect();
        for conn in &conns {
            registry.register(conn.clone());
        }

        let report = Broadcaster::new(registry.clone()).broadcast(&event()).await;

        assert_eq!(report, BroadcastReport { attempted: 5, delivered: 5, failed: 0 });
        assert!(conns.iter().all(|c| c.count() == 1));
        assert_eq!(registry.len(), 5);
    }

    #[tokio::test]
    async fn test_failed_connection_is_removed_and_others_still_receive() {
        let registry = ConnectionRegistry::new();
        let healthy: Vec<_> = (0..3).map(|_| FakeConnection::healthy()).collect();
        let broken = FakeConnection::broken();

        registry.register(healthy[0].clone());
        registry.register(broken.clone());
        registry.register(healthy[1].clone());
        registry.register(healthy[2].clone());

        let report = Broadcaster::new(registry.clone()).broadcast(&event()).await;

        assert_eq!(report, BroadcastReport { attempted: 4, delivered: 3, failed: 1 });
        assert!(healthy.iter().all(|c| c.count() == 1));
        assert!(!registry.contains(broken.id));
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_stalled_connection_times_out_and_is_removed() {
        let registry = ConnectionRegistry::new();
        let healthy = FakeConnection::healthy();
        let stalled = Arc::new(StalledConnection { id: ConnectionId::new() });
        registry.register(stalled.clone());
        registry.register(healthy.clone());

        let broadcaster = Broadcaster::new(registry.clone()).with_send_timeout(Duration::from_millis(50));
        let report = tokio::time::timeout(Duration::from_secs(5), broadcaster.broadcast(&event()))
            .await
            .expect("broadcast must not hang on a stalled connection");

        assert_eq!(report, BroadcastReport { attempted: 2, delivered: 1, failed: 1 });
        assert_eq!(healthy.count(), 1);
        assert!(!registry.contains(stalled.id));
        assert!(registry.contains(healthy.id));
    }

    #[tokio::test]
    async fn test_broadcast_with_no_connections() {
        let report = Broadcaster::new(ConnectionRegistry::new()).broadcast(&event()).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_payload_is_the_notification() {
        let registry = ConnectionRegistry::new();
        let conn = FakeConnection::healthy();
        registry.register(conn.clone());

        Broadcaster::new(registry).broadcast(&event()).await;

        let received = conn.received.lock();
        match &received[0] {
            Notification::NewEvent(e) => assert_eq!(e.id, "EVT-100"),
            other => panic!("unexpected notification: {:?}", other),
        }
    }
}
