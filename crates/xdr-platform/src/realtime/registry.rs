//! Connection Registry
//!
//! The set of currently open real-time connections. Cloning the registry
//! clones the handle; all clones share one set.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use super::{Connection, ConnectionId};

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<IndexMap<ConnectionId, Arc<dyn Connection>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns false if its id is already registered.
    pub fn register(&self, connection: Arc<dyn Connection>) -> bool {
        let id = connection.id();
        let total = {
            let mut connections = self.connections.write();
            if connections.contains_key(&id) {
                return false;
            }
            connections.insert(id, connection.clone());
            connections.len()
        };

        connection.on_open();
        debug!(connection_id = %id, total, "Connection registered");
        true
    }

    /// Remove a connection. Absent ids are ignored.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.connections.write();
            let removed = connections.shift_remove(&id);
            (removed, connections.len())
        };

        match removed {
            Some(connection) => {
                connection.on_close();
                debug!(connection_id = %id, total, "Connection unregistered");
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of the open set.
    pub fn snapshot(&self) -> Vec<Arc<dyn Connection>> {
        self.connections.read().values().cloned().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }
}
