//! Real-time client connections
//!
//! A [`Connection`] is one live push channel to a client. The registry owns
//! connections and drives their lifecycle:
//!
//! ```text
//! Pending --register--> Open --unregister / send failure--> Closed
//! ```
//!
//! `Closed` is terminal.

use std::fmt;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Pending,
    Open,
    Closed,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection is closed")]
    Closed,

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Deliver one notification. An error means the channel is unusable.
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// Called by the registry once the connection is visible to broadcasts.
    fn on_open(&self) {}

    /// Called by the registry when the connection is removed.
    fn on_close(&self) {}
}

/// Tracks lifecycle transitions for a connection implementation.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<ConnectionState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Pending),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// `Pending -> Open`. Returns false if the connection was not pending.
    pub fn open(&self) -> bool {
        let mut state = self.state.lock();
        if *state == ConnectionState::Pending {
            *state = ConnectionState::Open;
            true
        } else {
            false
        }
    }

    pub fn close(&self) {
        *self.state.lock() = ConnectionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Server side of an accepted WebSocket. Only the write half lives here;
/// the handler keeps reading from the other half.
pub struct WsConnection {
    id: ConnectionId,
    sink: tokio::sync::Mutex<SplitSink<WebSocket, Message>>,
    lifecycle: Lifecycle,
}

impl WsConnection {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            id: ConnectionId::new(),
            sink: tokio::sync::Mutex::new(sink),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }
}

#[async_trait]
impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if !self.lifecycle.is_open() {
            return Err(DeliveryError::Closed);
        }

        let text = notification.to_json()?;
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Text(text)).await {
            self.lifecycle.close();
            return Err(DeliveryError::Transport(e.to_string()));
        }
        Ok(())
    }

    fn on_open(&self) {
        self.lifecycle.open();
    }

    fn on_close(&self) {
        self.lifecycle.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), ConnectionState::Pending);

        assert!(lifecycle.open());
        assert!(lifecycle.is_open());
        assert!(!lifecycle.open());

        lifecycle.close();
        assert_eq!(lifecycle.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_closed_is_terminal() {
        let lifecycle = Lifecycle::new();
        lifecycle.close();
        assert!(!lifecycle.open());
        assert_eq!(lifecycle.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
